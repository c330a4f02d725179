// Source-of-truth workout shapes as handed over by the workout CRUD layer.
//
// Timestamps
// - All i64 values are epoch milliseconds.

use crate::modules::exercise_progress::core::exercise_key::{ScopeKey, normalize_exercise_name};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const MAX_REPS_PER_SET: u32 = 10_000;
pub const MAX_SETS_PER_EXERCISE: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Weight,
    Time,
    Distance,
    Reps,
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            ExerciseType::Weight => "weight",
            ExerciseType::Time => "time",
            ExerciseType::Distance => "distance",
            ExerciseType::Reps => "reps",
        };
        f.write_str(tag)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub order: u32,
    pub reps: u32,
    pub value: f64,
    #[serde(default)]
    pub rest_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePerformance {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    #[serde(default)]
    pub unit: Option<String>,
    pub sets: Vec<SetRecord>,
}

impl ExercisePerformance {
    pub fn normalized_name(&self) -> String {
        normalize_exercise_name(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub created_at: i64,
    pub exercises: Vec<ExercisePerformance>,
}

#[derive(Debug, Error, PartialEq)]
pub enum InvalidWorkout {
    #[error("exercise name must not be blank")]
    BlankExerciseName,

    #[error("{exercise} has more than {max} sets", max = MAX_SETS_PER_EXERCISE)]
    TooManySets { exercise: String },

    #[error("set {order} of {exercise} must have at least one rep")]
    NoReps { exercise: String, order: u32 },

    #[error("set {order} of {exercise} exceeds {max} reps", max = MAX_REPS_PER_SET)]
    TooManyReps { exercise: String, order: u32 },

    #[error("set {order} of {exercise} has a non-finite value")]
    NonFiniteValue { exercise: String, order: u32 },
}

impl WorkoutRecord {
    pub fn scope(&self) -> ScopeKey {
        ScopeKey::new(self.user_id.clone(), self.category_id.clone())
    }

    pub fn validate(&self) -> Result<(), InvalidWorkout> {
        for performance in &self.exercises {
            if performance.name.trim().is_empty() {
                return Err(InvalidWorkout::BlankExerciseName);
            }
            if performance.sets.len() > MAX_SETS_PER_EXERCISE {
                return Err(InvalidWorkout::TooManySets {
                    exercise: performance.name.clone(),
                });
            }
            for set in &performance.sets {
                if set.reps < 1 {
                    return Err(InvalidWorkout::NoReps {
                        exercise: performance.name.clone(),
                        order: set.order,
                    });
                }
                if set.reps > MAX_REPS_PER_SET {
                    return Err(InvalidWorkout::TooManyReps {
                        exercise: performance.name.clone(),
                        order: set.order,
                    });
                }
                if !set.value.is_finite() {
                    return Err(InvalidWorkout::NonFiniteValue {
                        exercise: performance.name.clone(),
                        order: set.order,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Inclusive bounds on `created_at`. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl DateRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, at: i64) -> bool {
        self.from.is_none_or(|from| at >= from) && self.to.is_none_or(|to| at <= to)
    }
}
