use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use serde::{Deserialize, Serialize};

pub const PROGRESS_CALCULATION_QUEUE: &str = "progress-calculation";

/// Payload of one reconciliation run, one scope per job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressCalculationJob {
    pub user_id: String,
    pub category_id: String,
}

impl ProgressCalculationJob {
    pub fn new(user_id: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            category_id: category_id.into(),
        }
    }

    pub fn scope(&self) -> ScopeKey {
        ScopeKey::new(self.user_id.clone(), self.category_id.clone())
    }
}
