use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Resolves the per-user baseline (bodyweight) added to external load.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `None` when the user cannot be resolved. A known user without a
    /// recorded weight resolves to 0.
    async fn baseline_for(&self, user_id: &str) -> anyhow::Result<Option<f64>>;
}

#[derive(Default)]
pub struct InMemoryUserDirectory {
    weights: RwLock<HashMap<String, Option<f64>>>,
    is_offline: bool,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn register(&self, user_id: impl Into<String>, weight: Option<f64>) {
        self.weights.write().await.insert(user_id.into(), weight);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn baseline_for(&self, user_id: &str) -> anyhow::Result<Option<f64>> {
        if self.is_offline {
            return Err(anyhow::anyhow!("User directory offline"));
        }
        Ok(self
            .weights
            .read()
            .await
            .get(user_id)
            .map(|weight| weight.unwrap_or(0.0)))
    }
}
