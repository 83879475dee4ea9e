//! The product-form ratio as re-shipped in version 4.

use kpical_core::{Field, Metrics, Record, KPI_THRESHOLD};
use tracing::debug;

use crate::Formula;

/// Version 4 of the product form.
///
/// The forward ratio is identical to [`ClassicFormula`](crate::ClassicFormula).
/// The expense back-solve is not: it divides by the worker count where the
/// forward ratio multiplies by it, so recomputing the ratio after that solve
/// lands on `threshold / workers²` rather than the threshold. Downstream
/// sheets were calibrated against this output, so the solve is kept
/// verbatim as its own contract.
#[derive(Debug, Clone)]
pub struct RevisedFormula {
    threshold: f64,
}

impl RevisedFormula {
    /// Version 4 against [`KPI_THRESHOLD`].
    pub fn new() -> Self {
        Self {
            threshold: KPI_THRESHOLD,
        }
    }

    /// Set the acceptance bar.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Default for RevisedFormula {
    fn default() -> Self {
        Self::new()
    }
}

impl Formula for RevisedFormula {
    type Metrics = Metrics;

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn kpi(&self, metrics: &Metrics) -> f64 {
        let divider = f64::from(metrics.workers) * metrics.avg_views * metrics.avg_duration;
        if divider.is_nan() || divider == 0.0 {
            return 0.0;
        }
        (metrics.cost + metrics.expenses) / divider
    }

    fn targets(&self) -> &'static [Field] {
        &[
            Field::Expenses,
            Field::Workers,
            Field::AvgViews,
            Field::AvgDuration,
        ]
    }

    fn solve(&self, metrics: &Metrics, field: Field) -> Option<Metrics> {
        let t = self.threshold;
        let workers = f64::from(metrics.workers);
        let mut next = metrics.clone();
        match field {
            Field::Expenses => {
                // As shipped: the worker factor divides instead of multiplying.
                next.expenses =
                    t * metrics.avg_views * metrics.avg_duration / workers - metrics.cost;
            }
            Field::Workers => {
                let raw =
                    (metrics.expenses + metrics.cost) / (t * metrics.avg_views * metrics.avg_duration);
                next.workers = (raw.ceil() as u32).saturating_add(1);
            }
            Field::AvgViews => {
                next.avg_views =
                    (metrics.expenses + metrics.cost) / (t * workers * metrics.avg_duration);
            }
            Field::AvgDuration => {
                next.avg_duration =
                    (metrics.expenses + metrics.cost) / (t * workers * metrics.avg_views);
            }
            Field::Cost => return None,
        }
        debug!(%field, value = next.get(field), "version-4 back-solve");
        Some(next)
    }
}
