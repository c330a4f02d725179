// In memory workout store, standing in for the workout CRUD service.

use crate::modules::exercise_progress::adapters::outbound::workout_source::{
    WorkoutLog, WorkoutSource,
};
use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::workout::{DateRange, WorkoutRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryWorkoutLog {
    workouts: RwLock<HashMap<String, WorkoutRecord>>,
    is_offline: bool,
}

impl InMemoryWorkoutLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    fn ensure_online(&self) -> anyhow::Result<()> {
        if self.is_offline {
            return Err(anyhow::anyhow!("Workout store offline"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl WorkoutSource for InMemoryWorkoutLog {
    async fn list_for_scope(
        &self,
        scope: &ScopeKey,
        range: DateRange,
    ) -> anyhow::Result<Vec<WorkoutRecord>> {
        self.ensure_online()?;
        let guard = self.workouts.read().await;
        let mut items: Vec<WorkoutRecord> = guard
            .values()
            .filter(|w| w.user_id == scope.user_id && w.category_id == scope.category_id)
            .filter(|w| range.contains(w.created_at))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn get(&self, workout_id: &str) -> anyhow::Result<Option<WorkoutRecord>> {
        self.ensure_online()?;
        Ok(self.workouts.read().await.get(workout_id).cloned())
    }
}

#[async_trait::async_trait]
impl WorkoutLog for InMemoryWorkoutLog {
    async fn save(&self, workout: WorkoutRecord) -> anyhow::Result<()> {
        self.ensure_online()?;
        self.workouts
            .write()
            .await
            .insert(workout.id.clone(), workout);
        Ok(())
    }

    async fn remove(&self, workout_id: &str) -> anyhow::Result<Option<WorkoutRecord>> {
        self.ensure_online()?;
        Ok(self.workouts.write().await.remove(workout_id))
    }
}
