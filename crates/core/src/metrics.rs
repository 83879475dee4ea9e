//! Metric records edited by the calculator.
//!
//! Two record shapes exist across the shipped formula versions: the product
//! form ([`Metrics`]) and the percent-scaled split form ([`SplitMetrics`]).
//! Records are transient session state; they are recreated per session and
//! mutated field by field on user edits or by a back-solve.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::field::{Field, ParseFieldError, SplitField};
use crate::hint::{input_hint, Hint};

/// Field-addressable access shared by the metric records.
///
/// This trait lets the engine and the interactive shell stay generic over
/// which record shape a formula version edits.
pub trait Record: Clone + fmt::Debug {
    /// Field selector for this record.
    type Field: Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = ParseFieldError> + 'static;

    /// Fields in declaration order.
    const FIELDS: &'static [Self::Field];

    /// Read a field as a float.
    fn get(&self, field: Self::Field) -> f64;

    /// Write a field from a float. Worker counts go through a saturating
    /// cast (NaN stores zero).
    fn set(&mut self, field: Self::Field, value: f64);

    /// Display hint for a field's current value.
    fn hint(&self, field: Self::Field) -> Hint;
}

/// Inputs of the product-form ratio (formula versions 1, 2 and 4).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// Production cost
    pub cost: f64,
    /// Amount already spent
    pub expenses: f64,
    /// Number of workers on the job
    pub workers: u32,
    /// Average number of views
    pub avg_views: f64,
    /// Average viewing duration, minutes
    pub avg_duration: f64,
}

impl Metrics {
    /// Add one worker.
    pub fn increment_workers(&mut self) {
        self.workers += 1;
    }

    /// Remove one worker. The stepper never drops below one.
    pub fn decrement_workers(&mut self) {
        if self.workers > 1 {
            self.workers -= 1;
        }
    }
}

impl Record for Metrics {
    type Field = Field;

    const FIELDS: &'static [Field] = &[
        Field::Cost,
        Field::Expenses,
        Field::Workers,
        Field::AvgViews,
        Field::AvgDuration,
    ];

    fn get(&self, field: Field) -> f64 {
        match field {
            Field::Cost => self.cost,
            Field::Expenses => self.expenses,
            Field::Workers => f64::from(self.workers),
            Field::AvgViews => self.avg_views,
            Field::AvgDuration => self.avg_duration,
        }
    }

    fn set(&mut self, field: Field, value: f64) {
        match field {
            Field::Cost => self.cost = value,
            Field::Expenses => self.expenses = value,
            Field::Workers => self.workers = value as u32,
            Field::AvgViews => self.avg_views = value,
            Field::AvgDuration => self.avg_duration = value,
        }
    }

    fn hint(&self, field: Field) -> Hint {
        match field {
            Field::Cost => input_hint(self.cost, false),
            // Zero spend is fine; only negatives alert.
            Field::Expenses => input_hint(self.expenses, true),
            Field::Workers => input_hint(f64::from(self.workers), false),
            Field::AvgViews => input_hint(self.avg_views, false),
            Field::AvgDuration => input_hint(self.avg_duration, false),
        }
    }
}

/// Inputs of the split-form ratio (formula version 3).
///
/// The viewing window is a separate field and the watched share is a
/// percentage of that window; `avg_duration_pct` is the only field that
/// carries percent scaling.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SplitMetrics {
    /// Production cost
    pub cost: f64,
    /// Amount already spent
    pub expenses: f64,
    /// Number of workers on the job
    pub workers: u32,
    /// Viewing window, minutes
    pub duration: f64,
    /// Average number of views
    pub avg_views: f64,
    /// Watched share of the window, percent
    pub avg_duration_pct: f64,
}

impl SplitMetrics {
    /// Add one worker.
    pub fn increment_workers(&mut self) {
        self.workers += 1;
    }

    /// Remove one worker. The stepper never drops below one.
    pub fn decrement_workers(&mut self) {
        if self.workers > 1 {
            self.workers -= 1;
        }
    }
}

impl Record for SplitMetrics {
    type Field = SplitField;

    const FIELDS: &'static [SplitField] = &[
        SplitField::Cost,
        SplitField::Expenses,
        SplitField::Workers,
        SplitField::Duration,
        SplitField::AvgViews,
        SplitField::AvgDurationPct,
    ];

    fn get(&self, field: SplitField) -> f64 {
        match field {
            SplitField::Cost => self.cost,
            SplitField::Expenses => self.expenses,
            SplitField::Workers => f64::from(self.workers),
            SplitField::Duration => self.duration,
            SplitField::AvgViews => self.avg_views,
            SplitField::AvgDurationPct => self.avg_duration_pct,
        }
    }

    fn set(&mut self, field: SplitField, value: f64) {
        match field {
            SplitField::Cost => self.cost = value,
            SplitField::Expenses => self.expenses = value,
            SplitField::Workers => self.workers = value as u32,
            SplitField::Duration => self.duration = value,
            SplitField::AvgViews => self.avg_views = value,
            SplitField::AvgDurationPct => self.avg_duration_pct = value,
        }
    }

    fn hint(&self, field: SplitField) -> Hint {
        match field {
            SplitField::Cost => input_hint(self.cost, false),
            SplitField::Expenses => input_hint(self.expenses, true),
            SplitField::Workers => input_hint(f64::from(self.workers), false),
            SplitField::Duration => input_hint(self.duration, false),
            SplitField::AvgViews => input_hint(self.avg_views, false),
            SplitField::AvgDurationPct => input_hint(self.avg_duration_pct, false),
        }
    }
}
