// Incremental progress updater, run inline with every workout mutation.
//
// Responsibilities
// - Resolve the user's baseline before touching any aggregate.
// - Withdraw the old contributions, then record the new ones, in memory.
// - Recording is idempotent per workout: existing entries of the workout are
//   replaced, never duplicated.
// - Commit every touched aggregate of the workout in one batch.
//
// Concurrency
// - Writers of the same (user, category) scope are serialized in process.
// - Across processes the store rejects stale versions; the whole
//   read-compute-commit cycle is retried a bounded number of times.

use crate::modules::exercise_progress::adapters::outbound::aggregate_store::{
    AggregateStore, AggregateStoreError, AggregateWrite,
};
use crate::modules::exercise_progress::adapters::outbound::user_directory::UserDirectory;
use crate::modules::exercise_progress::core::aggregate::{
    ContributionEntry, ExerciseAggregate, accumulate,
};
use crate::modules::exercise_progress::core::exercise_key::{AggregateKey, ScopeKey};
use crate::modules::exercise_progress::core::stats::MaxWeightMode;
use crate::modules::exercise_progress::core::workout::{ExercisePerformance, WorkoutRecord};
use crate::modules::exercise_progress::use_cases::track_workout_progress::command::WorkoutChange;
use crate::shared::infrastructure::keyed_locks::KeyedLocks;
use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_CONFLICT_RETRIES: u32 = 3;

#[derive(Debug, Error, PartialEq)]
pub enum ProgressError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("workout {workout_id} cannot move from user {previous} to user {current}")]
    OwnerChanged {
        workout_id: String,
        previous: String,
        current: String,
    },

    #[error("user directory unavailable: {0}")]
    Directory(String),

    #[error(transparent)]
    Store(#[from] AggregateStoreError),
}

/// Aggregate keys written by one workout change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressChange {
    pub upserted: Vec<AggregateKey>,
    pub deleted: Vec<AggregateKey>,
}

struct Slot {
    loaded_version: Option<u64>,
    aggregate: Option<ExerciseAggregate>,
    dirty: bool,
}

#[derive(Default)]
struct Staging {
    slots: BTreeMap<AggregateKey, Slot>,
}

impl Staging {
    fn into_writes(self) -> (Vec<AggregateWrite>, ProgressChange) {
        let mut writes = Vec::new();
        let mut change = ProgressChange::default();
        for (key, slot) in self.slots {
            if !slot.dirty {
                continue;
            }
            match (slot.aggregate, slot.loaded_version) {
                (Some(aggregate), expected_version) => {
                    change.upserted.push(key);
                    writes.push(AggregateWrite::Upsert {
                        aggregate,
                        expected_version,
                    });
                }
                (None, Some(expected_version)) => {
                    change.deleted.push(key.clone());
                    writes.push(AggregateWrite::Delete {
                        key,
                        expected_version,
                    });
                }
                (None, None) => {}
            }
        }
        (writes, change)
    }
}

pub struct TrackWorkoutProgressHandler<TStore, TUsers>
where
    TStore: AggregateStore + 'static,
    TUsers: UserDirectory + 'static,
{
    store: Arc<TStore>,
    users: Arc<TUsers>,
    locks: Arc<KeyedLocks<ScopeKey>>,
    max_weight_mode: MaxWeightMode,
    conflict_retries: u32,
}

impl<TStore, TUsers> TrackWorkoutProgressHandler<TStore, TUsers>
where
    TStore: AggregateStore + 'static,
    TUsers: UserDirectory + 'static,
{
    pub fn new(store: Arc<TStore>, users: Arc<TUsers>, locks: Arc<KeyedLocks<ScopeKey>>) -> Self {
        Self {
            store,
            users,
            locks,
            max_weight_mode: MaxWeightMode::default(),
            conflict_retries: DEFAULT_CONFLICT_RETRIES,
        }
    }

    pub fn with_max_weight_mode(mut self, mode: MaxWeightMode) -> Self {
        self.max_weight_mode = mode;
        self
    }

    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    pub async fn on_workout_created(
        &self,
        workout: &WorkoutRecord,
    ) -> Result<ProgressChange, ProgressError> {
        self.handle(WorkoutChange::Created(workout)).await
    }

    pub async fn on_workout_deleted(
        &self,
        workout: &WorkoutRecord,
    ) -> Result<ProgressChange, ProgressError> {
        self.handle(WorkoutChange::Deleted(workout)).await
    }

    pub async fn on_workout_updated(
        &self,
        previous: &WorkoutRecord,
        current: &WorkoutRecord,
    ) -> Result<ProgressChange, ProgressError> {
        self.handle(WorkoutChange::Updated { previous, current })
            .await
    }

    pub async fn handle(&self, change: WorkoutChange<'_>) -> Result<ProgressChange, ProgressError> {
        if let WorkoutChange::Updated { previous, current } = change {
            if previous.user_id != current.user_id {
                return Err(ProgressError::OwnerChanged {
                    workout_id: current.id.clone(),
                    previous: previous.user_id.clone(),
                    current: current.user_id.clone(),
                });
            }
        }

        let user_id = change.user_id();
        let baseline = self
            .users
            .baseline_for(user_id)
            .await
            .map_err(|e| ProgressError::Directory(e.to_string()))?
            .ok_or_else(|| ProgressError::UserNotFound(user_id.to_string()))?;

        let _guards = self.locks.lock_all(change.scopes()).await;

        let mut conflicts = 0;
        loop {
            let staging = self.stage(change, baseline).await?;
            let (writes, summary) = staging.into_writes();
            if writes.is_empty() {
                return Ok(summary);
            }
            match self.store.commit(writes).await {
                Ok(()) => {
                    debug!(
                        workout_id = change.workout_id(),
                        upserted = summary.upserted.len(),
                        deleted = summary.deleted.len(),
                        "progress aggregates committed"
                    );
                    return Ok(summary);
                }
                Err(AggregateStoreError::VersionMismatch { key, .. })
                    if conflicts < self.conflict_retries =>
                {
                    conflicts += 1;
                    warn!(
                        workout_id = change.workout_id(),
                        %key,
                        conflicts,
                        "concurrent aggregate write, retrying"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn stage(
        &self,
        change: WorkoutChange<'_>,
        baseline: f64,
    ) -> Result<Staging, ProgressError> {
        let mut staging = Staging::default();

        if let Some(workout) = change.withdrawn() {
            let scope = workout.scope();
            for performance in &workout.exercises {
                let key = AggregateKey::new(&scope, &performance.name);
                let supplied = self.measure(workout, performance, baseline);
                let slot = self.slot(&mut staging, &key).await?;
                let Some(aggregate) = slot.aggregate.as_mut() else {
                    continue;
                };
                match aggregate.withdraw(&workout.id, workout.created_at) {
                    Some(removed) => {
                        if removed.stats() != supplied.stats() {
                            warn!(
                                %key,
                                workout_id = %workout.id,
                                "withdrawn contribution differs from the supplied sets"
                            );
                        }
                        slot.dirty = true;
                        if aggregate.is_empty() {
                            slot.aggregate = None;
                        }
                    }
                    None => warn!(
                        %key,
                        workout_id = %workout.id,
                        "no contribution recorded for workout"
                    ),
                }
            }
        }

        if let Some(workout) = change.recorded() {
            let scope = workout.scope();
            let mut cleared = BTreeSet::new();
            for performance in &workout.exercises {
                let key = AggregateKey::new(&scope, &performance.name);
                let entry = self.measure(workout, performance, baseline);
                let slot = self.slot(&mut staging, &key).await?;
                // a rebuild may already have folded this workout in
                if cleared.insert(key.clone()) {
                    if let Some(aggregate) = slot.aggregate.as_mut() {
                        let replaced = aggregate.discard_workout(&workout.id);
                        if replaced > 0 {
                            warn!(
                                %key,
                                workout_id = %workout.id,
                                replaced,
                                "workout already recorded, replacing its contribution"
                            );
                        }
                    }
                }
                slot.aggregate = Some(accumulate(slot.aggregate.take(), key, performance, entry));
                slot.dirty = true;
            }
        }

        Ok(staging)
    }

    fn measure(
        &self,
        workout: &WorkoutRecord,
        performance: &ExercisePerformance,
        baseline: f64,
    ) -> ContributionEntry {
        ContributionEntry::measure(workout, performance, baseline, self.max_weight_mode)
    }

    async fn slot<'s>(
        &self,
        staging: &'s mut Staging,
        key: &AggregateKey,
    ) -> Result<&'s mut Slot, ProgressError> {
        match staging.slots.entry(key.clone()) {
            Entry::Occupied(occupied) => Ok(occupied.into_mut()),
            Entry::Vacant(vacant) => {
                let stored = self.store.get(key).await?;
                Ok(vacant.insert(Slot {
                    loaded_version: stored.as_ref().map(|row| row.version),
                    aggregate: stored.map(|row| row.aggregate),
                    dirty: false,
                }))
            }
        }
    }
}
