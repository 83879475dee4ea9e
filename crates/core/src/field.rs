//! Field selectors for the metric records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error for a field name that matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field: {0}")]
pub struct ParseFieldError(pub String);

/// A field of [`Metrics`](crate::Metrics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// Production cost
    Cost,
    /// Amount already spent
    Expenses,
    /// Number of workers on the job
    Workers,
    /// Average number of views
    AvgViews,
    /// Average viewing duration
    AvgDuration,
}

impl Field {
    /// Kebab-case name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Cost => "cost",
            Field::Expenses => "expenses",
            Field::Workers => "workers",
            Field::AvgViews => "avg-views",
            Field::AvgDuration => "avg-duration",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").as_str() {
            "cost" => Ok(Field::Cost),
            "expenses" => Ok(Field::Expenses),
            "workers" => Ok(Field::Workers),
            "avg-views" => Ok(Field::AvgViews),
            "avg-duration" => Ok(Field::AvgDuration),
            _ => Err(ParseFieldError(s.to_string())),
        }
    }
}

/// A field of [`SplitMetrics`](crate::SplitMetrics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SplitField {
    /// Production cost
    Cost,
    /// Amount already spent
    Expenses,
    /// Number of workers on the job
    Workers,
    /// Viewing window, minutes
    Duration,
    /// Average number of views
    AvgViews,
    /// Watched share of the window, percent
    AvgDurationPct,
}

impl SplitField {
    /// Kebab-case name, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitField::Cost => "cost",
            SplitField::Expenses => "expenses",
            SplitField::Workers => "workers",
            SplitField::Duration => "duration",
            SplitField::AvgViews => "avg-views",
            SplitField::AvgDurationPct => "avg-duration-pct",
        }
    }
}

impl fmt::Display for SplitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitField {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").as_str() {
            "cost" => Ok(SplitField::Cost),
            "expenses" => Ok(SplitField::Expenses),
            "workers" => Ok(SplitField::Workers),
            "duration" => Ok(SplitField::Duration),
            "avg-views" => Ok(SplitField::AvgViews),
            "avg-duration-pct" => Ok(SplitField::AvgDurationPct),
            _ => Err(ParseFieldError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_round_trip() {
        for field in [
            Field::Cost,
            Field::Expenses,
            Field::Workers,
            Field::AvgViews,
            Field::AvgDuration,
        ] {
            assert_eq!(field.as_str().parse::<Field>(), Ok(field));
        }
    }

    #[test]
    fn test_field_accepts_snake_case() {
        assert_eq!("avg_views".parse::<Field>(), Ok(Field::AvgViews));
        assert_eq!("avg_duration".parse::<Field>(), Ok(Field::AvgDuration));
        assert_eq!(
            "avg_duration_pct".parse::<SplitField>(),
            Ok(SplitField::AvgDurationPct)
        );
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let err = "views".parse::<Field>().unwrap_err();
        assert_eq!(err, ParseFieldError("views".to_string()));
        assert_eq!(err.to_string(), "unknown field: views");
    }

    #[test]
    fn test_split_field_round_trip() {
        for field in [
            SplitField::Cost,
            SplitField::Expenses,
            SplitField::Workers,
            SplitField::Duration,
            SplitField::AvgViews,
            SplitField::AvgDurationPct,
        ] {
            assert_eq!(field.as_str().parse::<SplitField>(), Ok(field));
        }
    }
}
