// Reconciliation of one (user, category) scope.
//
// Responsibilities
// - Resolve the baseline; an unknown user fails the run before any write.
// - Rebuild every aggregate of the scope from the full workout history.
// - Swap the scope's rows in one replace, so a failed run leaves them untouched.

use crate::modules::exercise_progress::adapters::outbound::aggregate_store::{
    AggregateStore, AggregateStoreError,
};
use crate::modules::exercise_progress::adapters::outbound::user_directory::UserDirectory;
use crate::modules::exercise_progress::adapters::outbound::workout_source::WorkoutSource;
use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::stats::MaxWeightMode;
use crate::modules::exercise_progress::core::workout::DateRange;
use crate::modules::exercise_progress::use_cases::reconcile_progress::job::ProgressCalculationJob;
use crate::modules::exercise_progress::use_cases::reconcile_progress::rebuild::rebuild_scope;
use crate::shared::infrastructure::keyed_locks::KeyedLocks;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("user directory unavailable: {0}")]
    Directory(String),

    #[error("workout source unavailable: {0}")]
    Source(String),

    #[error(transparent)]
    Store(#[from] AggregateStoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub scope: ScopeKey,
    pub workouts: usize,
    pub aggregates: usize,
}

pub struct ReconcileProgressHandler<TStore, TSource, TUsers>
where
    TStore: AggregateStore + 'static,
    TSource: WorkoutSource + 'static,
    TUsers: UserDirectory + 'static,
{
    store: Arc<TStore>,
    source: Arc<TSource>,
    users: Arc<TUsers>,
    locks: Arc<KeyedLocks<ScopeKey>>,
    max_weight_mode: MaxWeightMode,
}

impl<TStore, TSource, TUsers> ReconcileProgressHandler<TStore, TSource, TUsers>
where
    TStore: AggregateStore + 'static,
    TSource: WorkoutSource + 'static,
    TUsers: UserDirectory + 'static,
{
    pub fn new(
        store: Arc<TStore>,
        source: Arc<TSource>,
        users: Arc<TUsers>,
        locks: Arc<KeyedLocks<ScopeKey>>,
    ) -> Self {
        Self {
            store,
            source,
            users,
            locks,
            max_weight_mode: MaxWeightMode::default(),
        }
    }

    pub fn with_max_weight_mode(mut self, mode: MaxWeightMode) -> Self {
        self.max_weight_mode = mode;
        self
    }

    pub async fn handle(
        &self,
        job: &ProgressCalculationJob,
    ) -> Result<ReconcileSummary, ReconcileError> {
        let baseline = self
            .users
            .baseline_for(&job.user_id)
            .await
            .map_err(|e| ReconcileError::Directory(e.to_string()))?
            .ok_or_else(|| ReconcileError::UserNotFound(job.user_id.clone()))?;

        let scope = job.scope();
        // held across read and replace so incremental writers cannot interleave
        let _guard = self.locks.lock(&scope).await;

        let workouts = self
            .source
            .list_for_scope(&scope, DateRange::all())
            .await
            .map_err(|e| ReconcileError::Source(e.to_string()))?;
        let aggregates = rebuild_scope(&scope, &workouts, baseline, self.max_weight_mode);
        let summary = ReconcileSummary {
            scope: scope.clone(),
            workouts: workouts.len(),
            aggregates: aggregates.len(),
        };

        if aggregates.is_empty() {
            self.store.delete_scope(&scope).await?;
        } else {
            self.store.replace_scope(&scope, aggregates).await?;
        }

        info!(
            %scope,
            workouts = summary.workouts,
            aggregates = summary.aggregates,
            "progress reconciled"
        );
        Ok(summary)
    }
}
