use crate::modules::exercise_progress::core::aggregate::ContributionEntry;
use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::workout::{DateRange, ExerciseType, WorkoutRecord};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ListWorkoutProgressQuery {
    pub scope: ScopeKey,
    pub range: DateRange,
    pub include_progress: bool,
    pub offset: usize,
    pub limit: usize,
}

impl ListWorkoutProgressQuery {
    pub fn new(scope: ScopeKey) -> Self {
        Self {
            scope,
            range: DateRange::all(),
            include_progress: false,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseProgressView {
    pub name: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub progress: Vec<ContributionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutHistoryView {
    /// Newest first.
    pub workouts: Vec<WorkoutRecord>,
    /// Matching workouts before pagination.
    pub total: usize,
    /// Keyed by `"<name>-<type>"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<BTreeMap<String, ExerciseProgressView>>,
}
