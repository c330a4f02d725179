// Shared test fixture for workout records.
// The canonical workout is read from json/workout.json; tests override
// single fields through the builder.

use crate::modules::exercise_progress::core::workout::{
    ExercisePerformance, ExerciseType, SetRecord, WorkoutRecord,
};
use serde::Deserialize;
use std::fs;

// JSON -> DTO (transport shape)
#[derive(Debug, Clone, Deserialize)]
pub struct WorkoutDto {
    pub id: String,
    pub user_id: String,
    pub category_id: String,
    pub exercises: Vec<ExercisePerformance>,
}

pub struct WorkoutBuilder {
    inner: WorkoutRecord,
}

impl WorkoutBuilder {
    pub fn new() -> Self {
        let json_str =
            fs::read_to_string("./src/tests/fixtures/workouts/json/workout.json").unwrap();
        let dto: WorkoutDto = serde_json::from_str(&json_str).unwrap();

        Self {
            inner: WorkoutRecord {
                id: dto.id,
                user_id: dto.user_id,
                category_id: dto.category_id,
                created_at: 1700000000000,
                exercises: dto.exercises,
            },
        }
    }

    pub fn id(mut self, v: impl Into<String>) -> Self {
        self.inner.id = v.into();
        self
    }

    pub fn user_id(mut self, v: impl Into<String>) -> Self {
        self.inner.user_id = v.into();
        self
    }

    pub fn category_id(mut self, v: impl Into<String>) -> Self {
        self.inner.category_id = v.into();
        self
    }

    pub fn created_at(mut self, v: i64) -> Self {
        self.inner.created_at = v;
        self
    }

    pub fn exercises(mut self, v: Vec<ExercisePerformance>) -> Self {
        self.inner.exercises = v;
        self
    }

    pub fn build(self) -> WorkoutRecord {
        self.inner
    }
}

impl Default for WorkoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A weight exercise in kg; set orders are renumbered from 1.
pub fn exercise(name: &str, sets: Vec<SetRecord>) -> ExercisePerformance {
    ExercisePerformance {
        name: name.to_string(),
        exercise_type: ExerciseType::Weight,
        unit: Some("kg".into()),
        sets: sets
            .into_iter()
            .enumerate()
            .map(|(index, set)| SetRecord {
                order: index as u32 + 1,
                ..set
            })
            .collect(),
    }
}

pub fn set(reps: u32, value: f64) -> SetRecord {
    SetRecord {
        order: 1,
        reps,
        value,
        rest_minutes: 2.0,
    }
}
