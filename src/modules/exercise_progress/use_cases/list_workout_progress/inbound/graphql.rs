use async_graphql::{Context, Object, Result as GqlResult};

use crate::modules::exercise_progress::core::aggregate::{ContributionEntry, ExerciseAggregate};
use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::workout::DateRange;
use crate::shell::state::AppState;

#[derive(async_graphql::SimpleObject, Clone)]
pub struct GqlContribution {
    pub workout_id: String,
    pub date: i64,
    pub volume: f64,
    pub sets_count: u32,
    pub reps: u32,
    pub max_weight: f64,
    pub unit: Option<String>,
}

impl From<ContributionEntry> for GqlContribution {
    fn from(v: ContributionEntry) -> Self {
        Self {
            workout_id: v.workout_id,
            date: v.date,
            volume: v.volume,
            sets_count: v.sets_count,
            reps: v.reps,
            max_weight: v.max_weight,
            unit: v.unit,
        }
    }
}

#[derive(async_graphql::SimpleObject, Clone)]
pub struct GqlExerciseProgress {
    pub key: String,
    pub name: String,
    pub exercise_type: String,
    pub unit: Option<String>,
    pub total_volume: f64,
    pub total_reps: u32,
    pub max_weight: f64,
    pub progress: Vec<GqlContribution>,
}

impl From<ExerciseAggregate> for GqlExerciseProgress {
    fn from(v: ExerciseAggregate) -> Self {
        Self {
            key: v.progress_key(),
            name: v.name,
            exercise_type: v.exercise_type.to_string(),
            unit: v.unit,
            total_volume: v.total_volume,
            total_reps: v.total_reps,
            max_weight: v.max_weight,
            progress: v.time_series.into_iter().map(Into::into).collect(),
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn exercise_progress(
        &self,
        context: &Context<'_>,
        user_id: String,
        category_id: String,
        from: Option<i64>,
        to: Option<i64>,
    ) -> GqlResult<Vec<GqlExerciseProgress>> {
        let state = context.data_unchecked::<AppState>();
        let list = state
            .list_handler
            .progress_for_scope(&ScopeKey::new(user_id, category_id), DateRange { from, to })
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}
