//! Editing session: current record plus the snapshot/undo affordance.

use kpical_core::{kpi_hint, Hint, Record};
use tracing::debug;

use crate::{FieldOf, Formula};

/// The full record as it was right before a back-solve, together with the
/// field that solve targeted.
///
/// The snapshot is an explicit value the caller can inspect; restoring it
/// is the whole of the undo affordance.
#[derive(Debug, Clone)]
pub struct Checkpoint<R: Record> {
    /// Record state before the solve.
    pub metrics: R,
    /// The solved field.
    pub field: R::Field,
}

/// One editing session over a formula version.
///
/// Holds the record the user is editing, recomputes the ratio on demand,
/// and keeps a single pre-solve snapshot. Solving replaces the snapshot;
/// undoing consumes it. There is no deeper history.
#[derive(Debug, Clone)]
pub struct Session<F: Formula> {
    formula: F,
    current: F::Metrics,
    undo: Option<Checkpoint<F::Metrics>>,
}

impl<F: Formula> Session<F> {
    /// Start a session from an initial record.
    pub fn new(formula: F, metrics: F::Metrics) -> Self {
        Self {
            formula,
            current: metrics,
            undo: None,
        }
    }

    /// The formula version this session runs.
    pub fn formula(&self) -> &F {
        &self.formula
    }

    /// The record as currently edited.
    pub fn metrics(&self) -> &F::Metrics {
        &self.current
    }

    /// Current ratio.
    pub fn kpi(&self) -> f64 {
        self.formula.kpi(&self.current)
    }

    /// Display hint for the current ratio.
    pub fn kpi_hint(&self) -> Hint {
        kpi_hint(self.kpi(), self.formula.threshold())
    }

    /// Edit one field in place. Editing does not touch the undo snapshot.
    pub fn set(&mut self, field: FieldOf<F>, value: f64) {
        self.current.set(field, value);
    }

    /// Back-solve one field, snapshotting the record first.
    ///
    /// Returns the updated record, or `None` when the field is not a
    /// solve target (the record is then left untouched, snapshot included).
    pub fn solve(&mut self, field: FieldOf<F>) -> Option<&F::Metrics> {
        let next = self.formula.solve(&self.current, field)?;
        self.undo = Some(Checkpoint {
            metrics: self.current.clone(),
            field,
        });
        self.current = next;
        Some(&self.current)
    }

    /// Restore the pre-solve snapshot.
    ///
    /// Returns the field the undone solve had targeted, or `None` when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Option<FieldOf<F>> {
        let checkpoint = self.undo.take()?;
        debug!(field = %checkpoint.field, "restored pre-solve record");
        self.current = checkpoint.metrics;
        Some(checkpoint.field)
    }

    /// The field of the last un-undone solve, if any.
    pub fn last_solved(&self) -> Option<FieldOf<F>> {
        self.undo.as_ref().map(|checkpoint| checkpoint.field)
    }

    /// The pending pre-solve snapshot, if any.
    pub fn undo_point(&self) -> Option<&Checkpoint<F::Metrics>> {
        self.undo.as_ref()
    }
}
