// Materialized rollup of one exercise's training history.
//
// Invariants (checked by `check_invariants`)
// - total_volume equals the sum of the series' volumes, total_reps the sum of its reps.
//   Both are re-derived from the series in series order after every change, so
//   the same history always yields bit-identical totals.
// - max_weight equals the largest entry max_weight, 0 for an empty series.
// - A stored aggregate never has an empty series; callers delete it instead.
//
// Contributions are kept one per workout, ordered by (date, workout_id), and
// identified by (workout_id, date). Same-day workouts are never merged.

use crate::modules::exercise_progress::core::exercise_key::AggregateKey;
use crate::modules::exercise_progress::core::stats::{ExerciseStats, MaxWeightMode, compute_stats};
use crate::modules::exercise_progress::core::workout::{
    ExercisePerformance, ExerciseType, WorkoutRecord,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionEntry {
    pub workout_id: String,
    pub date: i64,
    pub volume: f64,
    pub sets_count: u32,
    pub reps: u32,
    pub max_weight: f64,
    pub unit: Option<String>,
}

impl ContributionEntry {
    pub fn new(
        workout_id: impl Into<String>,
        date: i64,
        performance: &ExercisePerformance,
        stats: ExerciseStats,
    ) -> Self {
        Self {
            workout_id: workout_id.into(),
            date,
            volume: stats.total_volume,
            sets_count: u32::try_from(performance.sets.len()).unwrap_or(u32::MAX),
            reps: stats.total_reps,
            max_weight: stats.max_weight,
            unit: performance.unit.clone(),
        }
    }

    /// The contribution `performance` makes when logged in `workout`.
    pub fn measure(
        workout: &WorkoutRecord,
        performance: &ExercisePerformance,
        baseline: f64,
        mode: MaxWeightMode,
    ) -> Self {
        let stats = compute_stats(&performance.sets, baseline, mode);
        Self::new(workout.id.clone(), workout.created_at, performance, stats)
    }

    pub fn stats(&self) -> ExerciseStats {
        ExerciseStats {
            total_volume: self.volume,
            total_reps: self.reps,
            max_weight: self.max_weight,
        }
    }

    pub fn is_from(&self, workout_id: &str, date: i64) -> bool {
        self.workout_id == workout_id && self.date == date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAggregate {
    pub key: AggregateKey,
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub unit: Option<String>,
    pub total_volume: f64,
    pub total_reps: u32,
    pub max_weight: f64,
    pub time_series: Vec<ContributionEntry>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvariantViolation {
    #[error("total volume {recorded} does not match series sum {expected}")]
    Volume { recorded: f64, expected: f64 },

    #[error("total reps {recorded} does not match series sum {expected}")]
    Reps { recorded: u32, expected: u32 },

    #[error("max weight {recorded} does not match series max {expected}")]
    MaxWeight { recorded: f64, expected: f64 },

    #[error("aggregate {0} has an empty time series")]
    Empty(String),
}

/// Folds one contribution into the aggregate for `key`, seeding it if absent.
pub fn accumulate(
    current: Option<ExerciseAggregate>,
    key: AggregateKey,
    performance: &ExercisePerformance,
    entry: ContributionEntry,
) -> ExerciseAggregate {
    match current {
        Some(mut aggregate) => {
            aggregate.record(performance, entry);
            aggregate
        }
        None => ExerciseAggregate::seed(key, performance, entry),
    }
}

impl ExerciseAggregate {
    /// First sighting of a key: totals equal the single contribution.
    pub fn seed(
        key: AggregateKey,
        performance: &ExercisePerformance,
        entry: ContributionEntry,
    ) -> Self {
        let mut aggregate = Self {
            key,
            name: performance.name.clone(),
            exercise_type: performance.exercise_type,
            unit: performance.unit.clone(),
            total_volume: 0.0,
            total_reps: 0,
            max_weight: 0.0,
            time_series: vec![entry],
        };
        aggregate.refresh_totals();
        aggregate
    }

    pub fn record(&mut self, performance: &ExercisePerformance, entry: ContributionEntry) {
        // chronological insert; a plain append when workouts arrive in order
        let position = self.time_series.partition_point(|existing| {
            (existing.date, existing.workout_id.as_str()) <= (entry.date, entry.workout_id.as_str())
        });
        self.time_series.insert(position, entry);
        if position + 1 == self.time_series.len() {
            self.name = performance.name.clone();
            self.exercise_type = performance.exercise_type;
            self.unit = performance.unit.clone();
        }
        self.refresh_totals();
    }

    /// Removes the contribution of one workout. Returns `None` when no entry
    /// carries that identity, leaving the aggregate untouched.
    pub fn withdraw(&mut self, workout_id: &str, date: i64) -> Option<ContributionEntry> {
        let position = self
            .time_series
            .iter()
            .position(|entry| entry.is_from(workout_id, date))?;
        let removed = self.time_series.remove(position);
        self.refresh_totals();
        Some(removed)
    }

    /// Drops every contribution of `workout_id`, whatever its date. Returns
    /// how many entries were removed.
    pub fn discard_workout(&mut self, workout_id: &str) -> usize {
        let before = self.time_series.len();
        self.time_series.retain(|entry| entry.workout_id != workout_id);
        let removed = before - self.time_series.len();
        if removed > 0 {
            self.refresh_totals();
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.time_series.is_empty() && self.total_volume == 0.0 && self.total_reps == 0
    }

    pub fn progress_key(&self) -> String {
        format!("{}-{}", self.name, self.exercise_type)
    }

    fn refresh_totals(&mut self) {
        self.total_volume = self.series_volume();
        self.total_reps = self.series_reps();
        self.max_weight = self.series_max_weight();
    }

    fn series_volume(&self) -> f64 {
        self.time_series
            .iter()
            .fold(0.0, |sum, entry| sum + entry.volume)
            .max(0.0)
    }

    fn series_reps(&self) -> u32 {
        self.time_series
            .iter()
            .fold(0_u32, |sum, entry| sum.saturating_add(entry.reps))
    }

    fn series_max_weight(&self) -> f64 {
        self.time_series
            .iter()
            .map(|entry| entry.max_weight)
            .fold(None, |max: Option<f64>, weight| {
                Some(max.map_or(weight, |max| max.max(weight)))
            })
            .unwrap_or(0.0)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.time_series.is_empty() {
            return Err(InvariantViolation::Empty(self.key.to_string()));
        }
        let volume = self.series_volume();
        if volume != self.total_volume {
            return Err(InvariantViolation::Volume {
                recorded: self.total_volume,
                expected: volume,
            });
        }
        let reps = self.series_reps();
        if reps != self.total_reps {
            return Err(InvariantViolation::Reps {
                recorded: self.total_reps,
                expected: reps,
            });
        }
        let max_weight = self.series_max_weight();
        if max_weight != self.max_weight {
            return Err(InvariantViolation::MaxWeight {
                recorded: self.max_weight,
                expected: max_weight,
            });
        }
        Ok(())
    }
}
