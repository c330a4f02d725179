// Persistence port for the exercise progress materialized view.
//
// Every stored row carries a store-assigned version. Versions come from one
// store-wide counter, so a deleted and re-created row never reuses a version a
// concurrent writer may still hold.

use crate::modules::exercise_progress::core::aggregate::ExerciseAggregate;
use crate::modules::exercise_progress::core::exercise_key::{AggregateKey, ScopeKey};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAggregate {
    pub aggregate: ExerciseAggregate,
    pub version: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateWrite {
    /// `expected_version: None` asserts the row does not exist yet.
    Upsert {
        aggregate: ExerciseAggregate,
        expected_version: Option<u64>,
    },
    Delete {
        key: AggregateKey,
        expected_version: u64,
    },
}

impl AggregateWrite {
    pub fn key(&self) -> &AggregateKey {
        match self {
            AggregateWrite::Upsert { aggregate, .. } => &aggregate.key,
            AggregateWrite::Delete { key, .. } => key,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AggregateStoreError {
    #[error("version mismatch on {key}: expected {expected:?}, actual {actual:?}")]
    VersionMismatch {
        key: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AggregateStore: Send + Sync {
    async fn get(&self, key: &AggregateKey)
        -> Result<Option<StoredAggregate>, AggregateStoreError>;

    /// Rows of one scope sorted by display name.
    async fn list_by_scope(
        &self,
        scope: &ScopeKey,
    ) -> Result<Vec<StoredAggregate>, AggregateStoreError>;

    /// Applies every write or none of them.
    async fn commit(&self, writes: Vec<AggregateWrite>) -> Result<(), AggregateStoreError>;

    /// Deletes every row of the scope and inserts `aggregates` in one step.
    async fn replace_scope(
        &self,
        scope: &ScopeKey,
        aggregates: Vec<ExerciseAggregate>,
    ) -> Result<(), AggregateStoreError>;

    async fn delete_scope(&self, scope: &ScopeKey) -> Result<(), AggregateStoreError> {
        self.replace_scope(scope, Vec::new()).await
    }
}
