//! The percent-scaled split ratio, formula version 3.

use kpical_core::{Record, SplitField, SplitMetrics, KPI_THRESHOLD};
use tracing::debug;

use crate::Formula;

/// Version 3: separate numerator and denominator.
///
/// `numerator = workers × (cost + expenses)`,
/// `denominator = workers × (avg_duration_pct / 100) × avg_views × duration`.
///
/// The worker factor cancels algebraically, but the split is kept
/// unsimplified so a zero worker count still hits the zero-denominator
/// sentinel. Because it cancels, workers cannot be a back-solve target.
#[derive(Debug, Clone)]
pub struct SplitFormula {
    threshold: f64,
}

impl SplitFormula {
    /// Version 3 against [`KPI_THRESHOLD`].
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

    fn watched_share(metrics: &SplitMetrics) -> f64 {
        metrics.avg_duration_pct / 100.0
    }
}

impl Default for SplitFormula {
    fn default() -> Self {
        Self::new()
    }
}

impl Formula for SplitFormula {
    type Metrics = SplitMetrics;

    fn threshold(&self) -> f64 {
        self.threshold
    }

    fn kpi(&self, metrics: &SplitMetrics) -> f64 {
        let workers = f64::from(metrics.workers);
        let numerator = workers * (metrics.cost + metrics.expenses);
        let denominator =
            workers * Self::watched_share(metrics) * metrics.avg_views * metrics.duration;
        if denominator.is_nan() || denominator == 0.0 {
            return 0.0;
        }
        numerator / denominator
    }

    fn targets(&self) -> &'static [SplitField] {
        &[
            SplitField::Expenses,
            SplitField::Duration,
            SplitField::AvgViews,
            SplitField::AvgDurationPct,
        ]
    }

    fn solve(&self, metrics: &SplitMetrics, field: SplitField) -> Option<SplitMetrics> {
        let t = self.threshold;
        let share = Self::watched_share(metrics);
        let spend = metrics.cost + metrics.expenses;
        let mut next = metrics.clone();
        match field {
            SplitField::Expenses => {
                next.expenses = t * metrics.duration * metrics.avg_views * share - metrics.cost;
            }
            SplitField::Duration => {
                next.duration = spend / (t * metrics.avg_views * share);
            }
            SplitField::AvgViews => {
                next.avg_views = spend / (t * metrics.duration * share);
            }
            SplitField::AvgDurationPct => {
                next.avg_duration_pct = 100.0 * spend / (t * metrics.duration * metrics.avg_views);
            }
            // Cost anchors the ratio; workers cancels out of it entirely.
            SplitField::Cost | SplitField::Workers => return None,
        }
        debug!(%field, value = next.get(field), "split-form back-solve");
        Some(next)
    }
}
