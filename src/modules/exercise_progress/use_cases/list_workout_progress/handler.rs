use crate::modules::exercise_progress::adapters::outbound::aggregate_store::AggregateStore;
use crate::modules::exercise_progress::adapters::outbound::workout_source::WorkoutSource;
use crate::modules::exercise_progress::core::aggregate::ExerciseAggregate;
use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::workout::DateRange;
use crate::modules::exercise_progress::use_cases::list_workout_progress::query::{
    ExerciseProgressView, ListWorkoutProgressQuery, WorkoutHistoryView,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Read path serving workout history and exercise progress to the workout
/// screens. Never writes.
pub struct ListWorkoutProgressHandler<TSource, TStore>
where
    TSource: WorkoutSource + 'static,
    TStore: AggregateStore + 'static,
{
    source: Arc<TSource>,
    store: Arc<TStore>,
}

impl<TSource, TStore> ListWorkoutProgressHandler<TSource, TStore>
where
    TSource: WorkoutSource + 'static,
    TStore: AggregateStore + 'static,
{
    pub fn new(source: Arc<TSource>, store: Arc<TStore>) -> Self {
        Self { source, store }
    }

    pub async fn handle(
        &self,
        query: ListWorkoutProgressQuery,
    ) -> anyhow::Result<WorkoutHistoryView> {
        let mut workouts = self.source.list_for_scope(&query.scope, query.range).await?;
        workouts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        let total = workouts.len();
        let workouts = workouts
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();

        let progress = if query.include_progress {
            let map = self
                .progress_for_scope(&query.scope, query.range)
                .await?
                .into_iter()
                .map(|aggregate| (aggregate.progress_key(), progress_view(aggregate)))
                .collect::<BTreeMap<_, _>>();
            Some(map)
        } else {
            None
        };

        Ok(WorkoutHistoryView {
            workouts,
            total,
            progress,
        })
    }

    /// Aggregates of one scope sorted by display name, each series narrowed
    /// to `range`. Totals stay those of the full history.
    pub async fn progress_for_scope(
        &self,
        scope: &ScopeKey,
        range: DateRange,
    ) -> anyhow::Result<Vec<ExerciseAggregate>> {
        let rows = self.store.list_by_scope(scope).await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let mut aggregate = row.aggregate;
                aggregate
                    .time_series
                    .retain(|entry| range.contains(entry.date));
                aggregate
            })
            .collect())
    }
}

fn progress_view(aggregate: ExerciseAggregate) -> ExerciseProgressView {
    ExerciseProgressView {
        name: aggregate.name,
        exercise_type: aggregate.exercise_type,
        progress: aggregate.time_series,
    }
}
