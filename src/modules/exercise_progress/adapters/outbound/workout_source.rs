// Ports onto the workout CRUD store, the source of truth for training history.
//
// Purpose
// - WorkoutSource: the read side the reconciliation worker and the read path rely on.
// - WorkoutLog: the write side used by the stand-in workout endpoints.

use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::workout::{DateRange, WorkoutRecord};
use async_trait::async_trait;

#[async_trait]
pub trait WorkoutSource: Send + Sync {
    /// Workouts of one scope within `range`, ascending by `created_at`.
    async fn list_for_scope(
        &self,
        scope: &ScopeKey,
        range: DateRange,
    ) -> anyhow::Result<Vec<WorkoutRecord>>;

    async fn get(&self, workout_id: &str) -> anyhow::Result<Option<WorkoutRecord>>;
}

#[async_trait]
pub trait WorkoutLog: Send + Sync {
    async fn save(&self, workout: WorkoutRecord) -> anyhow::Result<()>;
    async fn remove(&self, workout_id: &str) -> anyhow::Result<Option<WorkoutRecord>>;
}
