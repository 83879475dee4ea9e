//! Acceptance threshold and display hints.
//!
//! Out-of-range values are never rejected anywhere in the engine; they only
//! flip the hint the presentation layer maps to a warning color.

use serde::{Deserialize, Serialize};

/// Maximum acceptable KPI ratio. Ratios at or below the bar are favorable.
pub const KPI_THRESHOLD: f64 = 0.78000001;

/// Display-coloring hint for a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hint {
    /// Value is in its normal range.
    Ok,
    /// Value warrants the warning color.
    Alert,
}

impl Hint {
    /// True for [`Hint::Alert`].
    pub fn is_alert(&self) -> bool {
        matches!(self, Hint::Alert)
    }
}

/// Hint for a computed ratio: alert when NaN or above the threshold.
pub fn kpi_hint(kpi: f64, threshold: f64) -> Hint {
    if kpi.is_nan() || kpi > threshold {
        Hint::Alert
    } else {
        Hint::Ok
    }
}

/// Hint for a raw input value.
///
/// Spend fields allow zero (nothing spent yet is fine); every other input
/// alerts at zero because a zero factor makes the ratio degenerate.
pub fn input_hint(value: f64, allow_zero: bool) -> Hint {
    let low = if allow_zero { value < 0.0 } else { value <= 0.0 };
    if value.is_nan() || low {
        Hint::Alert
    } else {
        Hint::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kpi_hint_flips_above_threshold() {
        assert_eq!(kpi_hint(0.4891, KPI_THRESHOLD), Hint::Ok);
        assert_eq!(kpi_hint(KPI_THRESHOLD, KPI_THRESHOLD), Hint::Ok);
        assert_eq!(kpi_hint(0.7800001, 0.78), Hint::Alert);
    }

    #[test]
    fn test_kpi_hint_nan_alerts() {
        assert_eq!(kpi_hint(f64::NAN, KPI_THRESHOLD), Hint::Alert);
    }

    #[test]
    fn test_zero_ratio_is_ok() {
        // The zero sentinel for a degenerate denominator still reads as
        // favorable; the per-input hints carry the warning instead.
        assert_eq!(kpi_hint(0.0, KPI_THRESHOLD), Hint::Ok);
    }

    #[test]
    fn test_input_hint_sign_rules() {
        assert_eq!(input_hint(0.0, false), Hint::Alert);
        assert_eq!(input_hint(0.0, true), Hint::Ok);
        assert_eq!(input_hint(-1.0, true), Hint::Alert);
        assert_eq!(input_hint(12.5, false), Hint::Ok);
        assert!(input_hint(f64::NAN, true).is_alert());
    }
}
