// Async lock registry giving one writer at a time per key.
//
// Locks for several keys are always taken in key order, so two callers
// needing overlapping key sets cannot deadlock.

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

const CLEANUP_THRESHOLD: usize = 1024;

pub struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K> KeyedLocks<K>
where
    K: Clone + Eq + Hash + Ord,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &K) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().await;
            if locks.len() > CLEANUP_THRESHOLD {
                locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            }
            locks.entry(key.clone()).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub async fn lock_all(&self, keys: impl IntoIterator<Item = K>) -> Vec<OwnedMutexGuard<()>> {
        let ordered: BTreeSet<K> = keys.into_iter().collect();
        let mut guards = Vec::with_capacity(ordered.len());
        for key in &ordered {
            guards.push(self.lock(key).await);
        }
        guards
    }

    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
