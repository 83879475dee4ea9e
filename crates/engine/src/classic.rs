//! The product-form ratio, formula versions 1 and 2.

use kpical_core::{Field, Metrics, Record, KPI_THRESHOLD};
use tracing::debug;

use crate::Formula;

/// Rounding policy for continuous back-solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rounding {
    /// Keep solved values exact (version 1).
    #[default]
    Exact,
    /// Round solved values up to the next whole number (version 2).
    Up,
}

/// The product form: `(cost + expenses) / (workers × avg_views × avg_duration)`.
///
/// Version 1 solves continuous fields exactly; version 2 is the same
/// formula with [`Rounding::Up`] applied to continuous solves. The worker
/// solve always rounds up and adds one so the ratio stays strictly under
/// the bar.
#[derive(Debug, Clone)]
pub struct ClassicFormula {
    threshold: f64,
    rounding: Rounding,
}

impl ClassicFormula {
    /// Version 1: exact continuous solves against [`KPI_THRESHOLD`].
    pub fn new() -> Self {
        Self {
            threshold: KPI_THRESHOLD,
            rounding: Rounding::Exact,
        }
    }

    /// Set the acceptance bar.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the rounding policy for continuous solves.
    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    fn round(&self, value: f64) -> f64 {
        match self.rounding {
            Rounding::Exact => value,
            Rounding::Up => value.ceil(),
        }
    }
}

impl Default for ClassicFormula {
    fn default() -> Self {
        Self::new()
    }
}

impl Formula for ClassicFormula {
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
                next.expenses =
                    self.round(t * workers * metrics.avg_views * metrics.avg_duration - metrics.cost);
            }
            Field::Workers => {
                let raw =
                    (metrics.expenses + metrics.cost) / (t * metrics.avg_views * metrics.avg_duration);
                next.workers = (raw.ceil() as u32).saturating_add(1);
            }
            Field::AvgViews => {
                next.avg_views =
                    self.round((metrics.expenses + metrics.cost) / (t * workers * metrics.avg_duration));
            }
            Field::AvgDuration => {
                next.avg_duration =
                    self.round((metrics.expenses + metrics.cost) / (t * workers * metrics.avg_views));
            }
            // Cost is the anchor input; it is never recomputed.
            Field::Cost => return None,
        }
        debug!(%field, value = next.get(field), "product-form back-solve");
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Metrics {
        Metrics {
            cost: 1_100_500.0,
            expenses: 0.0,
            workers: 10,
            avg_views: 10_000.0,
            avg_duration: 22.5,
        }
    }

    #[test]
    fn test_kpi_matches_hand_computation() {
        let formula = ClassicFormula::new();
        // 1_100_500 / (10 * 10_000 * 22.5) = 1_100_500 / 2_250_000
        let kpi = formula.kpi(&sample());
        assert!((kpi - 1_100_500.0 / 2_250_000.0).abs() < 1e-12);
        assert!((kpi - 0.489111).abs() < 1e-6);
    }

    #[test]
    fn test_kpi_zero_denominator_sentinel() {
        let formula = ClassicFormula::new();
        let mut metrics = sample();
        metrics.workers = 0;
        assert_eq!(formula.kpi(&metrics), 0.0);

        let mut metrics = sample();
        metrics.avg_views = 0.0;
        assert_eq!(formula.kpi(&metrics), 0.0);
    }

    #[test]
    fn test_kpi_nan_denominator_sentinel() {
        let formula = ClassicFormula::new();
        let mut metrics = sample();
        metrics.avg_duration = f64::NAN;
        assert_eq!(formula.kpi(&metrics), 0.0);
    }

    #[test]
    fn test_solve_expenses_lands_on_threshold() {
        let formula = ClassicFormula::new();
        let solved = formula.solve(&sample(), Field::Expenses).unwrap();
        assert!((formula.kpi(&solved) - formula.threshold()).abs() < 1e-9);
        // Only the target field moved.
        assert_eq!(solved.cost, 1_100_500.0);
        assert_eq!(solved.workers, 10);
    }

    #[test]
    fn test_solve_continuous_fields_land_on_threshold() {
        let formula = ClassicFormula::new();
        for field in [Field::AvgViews, Field::AvgDuration] {
            let solved = formula.solve(&sample(), field).unwrap();
            assert!(
                (formula.kpi(&solved) - formula.threshold()).abs() < 1e-9,
                "field {}",
                field
            );
        }
    }

    #[test]
    fn test_solve_workers_stays_under_threshold() {
        let formula = ClassicFormula::new();
        let solved = formula.solve(&sample(), Field::Workers).unwrap();
        // 1 + ceil biases the count up, so the ratio lands strictly under.
        assert!(formula.kpi(&solved) < formula.threshold());
        // raw = 1_100_500 / (T * 10_000 * 22.5) ≈ 6.27, ceil + 1 = 8
        assert_eq!(solved.workers, 8);
    }

    #[test]
    fn test_solve_cost_is_not_a_target() {
        let formula = ClassicFormula::new();
        assert!(formula.solve(&sample(), Field::Cost).is_none());
        assert!(!formula.targets().contains(&Field::Cost));
    }

    #[test]
    fn test_solve_is_idempotent() {
        let formula = ClassicFormula::new();
        let once = formula.solve(&sample(), Field::AvgViews).unwrap();
        let twice = formula.solve(&sample(), Field::AvgViews).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rounded_solves_stay_whole() {
        let formula = ClassicFormula::new().with_rounding(Rounding::Up);
        let solved = formula.solve(&sample(), Field::Expenses).unwrap();
        assert_eq!(solved.expenses, solved.expenses.trunc());
        // Whole-ruble rounding moves the ratio only marginally off the bar.
        assert!((formula.kpi(&solved) - formula.threshold()).abs() < 1e-5);
    }

    #[test]
    fn test_solve_against_zero_cofactor_degenerates() {
        let formula = ClassicFormula::new();
        let mut metrics = sample();
        metrics.workers = 0;
        let solved = formula.solve(&metrics, Field::AvgViews).unwrap();
        assert!(solved.avg_views.is_infinite());
        // The degenerate value collapses into the sentinel on recompute.
        assert_eq!(formula.kpi(&solved), 0.0);
    }

    #[test]
    fn test_custom_threshold() {
        let formula = ClassicFormula::new().with_threshold(0.5);
        let solved = formula.solve(&sample(), Field::Expenses).unwrap();
        assert!((formula.kpi(&solved) - 0.5).abs() < 1e-9);
    }
}
