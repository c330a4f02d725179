use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub type JobId = String;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOptions {
    /// Total runs including the first one.
    pub attempts: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub backoff: Duration,
    pub keep_completed: usize,
    pub keep_failed: usize,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_secs(2),
            keep_completed: 100,
            keep_failed: 500,
        }
    }
}

impl JobOptions {
    /// Delay before running again after `failed_attempt` (1-based) failed.
    pub fn backoff_after(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.backoff.saturating_mul(1 << exponent)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReservedJob<J> {
    pub id: JobId,
    pub payload: J,
    /// 1-based attempt number of this run.
    pub attempt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureOutcome {
    Retrying { attempt: u32, delay: Duration },
    Exhausted { attempts: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinishedJob<J> {
    pub id: JobId,
    pub payload: J,
    pub attempts: u32,
    pub reason: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobQueueError {
    #[error("job {0} is not reserved")]
    NotReserved(JobId),

    #[error("backend error: {0}")]
    Backend(String),
}

/// At-least-once work queue with bounded retries and exponential backoff.
#[async_trait]
pub trait JobQueue<J>: Send + Sync
where
    J: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str;

    async fn enqueue(&self, payload: J, options: JobOptions) -> Result<JobId, JobQueueError>;

    /// Takes the oldest job that is due, if any.
    async fn reserve(&self) -> Result<Option<ReservedJob<J>>, JobQueueError>;

    async fn complete(&self, id: &str) -> Result<(), JobQueueError>;

    /// Schedules a retry or, once attempts are used up, moves the job to the failed set.
    async fn fail(&self, id: &str, reason: &str) -> Result<FailureOutcome, JobQueueError>;

    /// Resolves once a job may be due.
    async fn wait_for_work(&self);
}

pub mod in_memory;
