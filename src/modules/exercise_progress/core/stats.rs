// Per-submission statistics for one exercise.
//
// Volume folds the user's baseline (bodyweight) into the load and floors it
// at 1, so unloaded bodyweight work still counts. Max weight tracks the raw
// external load unless `MaxWeightMode::EffectiveLoad` is selected.

use crate::modules::exercise_progress::core::workout::SetRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxWeightMode {
    /// Max of `set.value`, baseline excluded.
    #[default]
    RawLoad,
    /// Max of `baseline + set.value`.
    EffectiveLoad,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExerciseStats {
    pub total_volume: f64,
    pub total_reps: u32,
    pub max_weight: f64,
}

pub fn compute_stats(sets: &[SetRecord], baseline: f64, mode: MaxWeightMode) -> ExerciseStats {
    sets.iter().fold(ExerciseStats::default(), |acc, set| {
        let effective_weight = (baseline + set.value).max(1.0);
        let tracked_weight = match mode {
            MaxWeightMode::RawLoad => set.value,
            MaxWeightMode::EffectiveLoad => baseline + set.value,
        };
        ExerciseStats {
            total_volume: acc.total_volume + f64::from(set.reps) * effective_weight,
            total_reps: acc.total_reps.saturating_add(set.reps),
            max_weight: acc.max_weight.max(tracked_weight),
        }
    })
}
