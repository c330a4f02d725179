// In memory implementation of the AggregateStore port.
//
// Purpose
// - Exercise the incremental updater and the reconciliation worker without a database.
//
// Responsibilities
// - Keep one row per aggregate key.
// - Enforce optimistic concurrency on batch commits, all or nothing.

use crate::modules::exercise_progress::adapters::outbound::aggregate_store::{
    AggregateStore, AggregateStoreError, AggregateWrite, StoredAggregate,
};
use crate::modules::exercise_progress::core::aggregate::ExerciseAggregate;
use crate::modules::exercise_progress::core::exercise_key::{AggregateKey, ScopeKey};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Default)]
struct Rows {
    by_key: BTreeMap<AggregateKey, StoredAggregate>,
    revision: u64,
}

impl Rows {
    fn next_version(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

#[derive(Default)]
pub struct InMemoryAggregateStore {
    rows: RwLock<Rows>,
    is_offline: bool,
    commit_delay_ms: u64,
}

impl InMemoryAggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn set_commit_delay_ms(&mut self, ms: u64) {
        self.commit_delay_ms = ms;
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.by_key.len()
    }

    fn ensure_online(&self) -> Result<(), AggregateStoreError> {
        if self.is_offline {
            return Err(AggregateStoreError::Backend(
                "Aggregate store offline".into(),
            ));
        }
        Ok(())
    }
}

fn sorted_by_name(mut rows: Vec<StoredAggregate>) -> Vec<StoredAggregate> {
    rows.sort_by(|a, b| {
        a.aggregate
            .name
            .cmp(&b.aggregate.name)
            .then_with(|| a.aggregate.key.cmp(&b.aggregate.key))
    });
    rows
}

#[async_trait::async_trait]
impl AggregateStore for InMemoryAggregateStore {
    async fn get(
        &self,
        key: &AggregateKey,
    ) -> Result<Option<StoredAggregate>, AggregateStoreError> {
        self.ensure_online()?;
        Ok(self.rows.read().await.by_key.get(key).cloned())
    }

    async fn list_by_scope(
        &self,
        scope: &ScopeKey,
    ) -> Result<Vec<StoredAggregate>, AggregateStoreError> {
        self.ensure_online()?;
        let guard = self.rows.read().await;
        let rows = guard
            .by_key
            .iter()
            .filter(|(key, _)| key.user_id == scope.user_id && key.category_id == scope.category_id)
            .map(|(_, row)| row.clone())
            .collect();
        Ok(sorted_by_name(rows))
    }

    async fn commit(&self, writes: Vec<AggregateWrite>) -> Result<(), AggregateStoreError> {
        self.ensure_online()?;
        if self.commit_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.commit_delay_ms)).await;
        }

        let mut guard = self.rows.write().await;
        for write in &writes {
            let actual = guard.by_key.get(write.key()).map(|row| row.version);
            let expected = match write {
                AggregateWrite::Upsert {
                    expected_version, ..
                } => *expected_version,
                AggregateWrite::Delete {
                    expected_version, ..
                } => Some(*expected_version),
            };
            if actual != expected {
                return Err(AggregateStoreError::VersionMismatch {
                    key: write.key().to_string(),
                    expected,
                    actual,
                });
            }
        }

        for write in writes {
            match write {
                AggregateWrite::Upsert { aggregate, .. } => {
                    let version = guard.next_version();
                    guard
                        .by_key
                        .insert(aggregate.key.clone(), StoredAggregate { aggregate, version });
                }
                AggregateWrite::Delete { key, .. } => {
                    guard.by_key.remove(&key);
                }
            }
        }
        Ok(())
    }

    async fn replace_scope(
        &self,
        scope: &ScopeKey,
        aggregates: Vec<ExerciseAggregate>,
    ) -> Result<(), AggregateStoreError> {
        self.ensure_online()?;
        let mut guard = self.rows.write().await;
        guard
            .by_key
            .retain(|key, _| key.user_id != scope.user_id || key.category_id != scope.category_id);
        for aggregate in aggregates {
            let version = guard.next_version();
            guard
                .by_key
                .insert(aggregate.key.clone(), StoredAggregate { aggregate, version });
        }
        Ok(())
    }
}
