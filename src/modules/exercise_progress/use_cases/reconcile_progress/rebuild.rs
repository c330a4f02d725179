// From-scratch rebuild of one scope's aggregates.
//
// Workouts are folded in (created_at, id) order with the same accumulation the
// incremental create path uses, so both paths agree on identical history.

use crate::modules::exercise_progress::core::aggregate::{
    ContributionEntry, ExerciseAggregate, accumulate,
};
use crate::modules::exercise_progress::core::exercise_key::{AggregateKey, ScopeKey};
use crate::modules::exercise_progress::core::stats::MaxWeightMode;
use crate::modules::exercise_progress::core::workout::WorkoutRecord;
use std::collections::BTreeMap;

pub fn rebuild_scope(
    scope: &ScopeKey,
    workouts: &[WorkoutRecord],
    baseline: f64,
    mode: MaxWeightMode,
) -> Vec<ExerciseAggregate> {
    let mut ordered: Vec<&WorkoutRecord> = workouts
        .iter()
        .filter(|workout| workout.scope() == *scope)
        .collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut by_key: BTreeMap<AggregateKey, ExerciseAggregate> = BTreeMap::new();
    for workout in ordered {
        for performance in &workout.exercises {
            let key = AggregateKey::new(scope, &performance.name);
            let entry = ContributionEntry::measure(workout, performance, baseline, mode);
            let current = by_key.remove(&key);
            by_key.insert(key.clone(), accumulate(current, key, performance, entry));
        }
    }
    by_key.into_values().collect()
}
