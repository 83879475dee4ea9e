//! KPI Calc engine.
//!
//! The forward ratio and the closed-form back-solves for the four shipped
//! formula versions, plus the editing [`Session`] with its snapshot/undo
//! affordance. Everything here is pure and synchronous: no errors are
//! propagated, degenerate arithmetic collapses into the `0.0` ratio
//! sentinel and is surfaced to callers as a display hint.

mod classic;
mod revised;
mod session;
mod split;

pub use classic::{ClassicFormula, Rounding};
pub use revised::RevisedFormula;
pub use session::{Checkpoint, Session};
pub use split::SplitFormula;

use kpical_core::Record;

/// Field selector of a formula's record type.
pub type FieldOf<F> = <<F as Formula>::Metrics as Record>::Field;

/// A formula version: the forward ratio plus its closed-form back-solves.
///
/// Each shipped version is its own contract. A later version is never a
/// correction of an earlier one; callers pick the version their numbers
/// were calibrated against.
pub trait Formula {
    /// The record shape this version edits.
    type Metrics: Record;

    /// The acceptance bar the back-solves aim for.
    fn threshold(&self) -> f64;

    /// Compute the forward ratio.
    ///
    /// Returns the `0.0` sentinel when the denominator is zero or NaN;
    /// never an error.
    fn kpi(&self, metrics: &Self::Metrics) -> f64;

    /// The fields a back-solve can target.
    fn targets(&self) -> &'static [FieldOf<Self>];

    /// Recompute one field so the ratio lands on the threshold, holding
    /// every other field fixed.
    ///
    /// Returns `None` for a field that is not a target. Division by a zero
    /// co-factor stores the plain IEEE result; the next [`Formula::kpi`]
    /// call absorbs it into the sentinel.
    fn solve(&self, metrics: &Self::Metrics, field: FieldOf<Self>) -> Option<Self::Metrics>;
}
