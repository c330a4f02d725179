// In memory implementation of the JobQueue port.
//
// Purpose
// - Drive the background workers in tests and local development without a broker.
//
// Responsibilities
// - Hand out due jobs in enqueue order.
// - Reschedule failed jobs with exponential backoff until attempts run out.
// - Retain a bounded history of completed and failed jobs for inspection.

use crate::shared::infrastructure::job_queue::{
    FailureOutcome, FinishedJob, JobId, JobOptions, JobQueue, JobQueueError, ReservedJob,
};
use std::collections::{HashMap, VecDeque};
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use uuid::Uuid;

struct QueuedJob<J> {
    id: JobId,
    payload: J,
    options: JobOptions,
    attempt: u32,
    run_at: Instant,
}

struct Jobs<J> {
    waiting: VecDeque<QueuedJob<J>>,
    active: HashMap<JobId, QueuedJob<J>>,
    completed: VecDeque<FinishedJob<J>>,
    failed: VecDeque<FinishedJob<J>>,
}

impl<J> Default for Jobs<J> {
    fn default() -> Self {
        Self {
            waiting: VecDeque::new(),
            active: HashMap::new(),
            completed: VecDeque::new(),
            failed: VecDeque::new(),
        }
    }
}

fn retain_last<T>(items: &mut VecDeque<T>, keep: usize) {
    while items.len() > keep {
        items.pop_front();
    }
}

pub struct InMemoryJobQueue<J> {
    name: String,
    jobs: Mutex<Jobs<J>>,
    notify: Notify,
    is_offline: bool,
}

impl<J> InMemoryJobQueue<J>
where
    J: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            jobs: Mutex::new(Jobs::default()),
            notify: Notify::new(),
            is_offline: false,
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub async fn waiting_len(&self) -> usize {
        self.jobs.lock().await.waiting.len()
    }

    pub async fn active_len(&self) -> usize {
        self.jobs.lock().await.active.len()
    }

    pub async fn completed(&self) -> Vec<FinishedJob<J>> {
        self.jobs.lock().await.completed.iter().cloned().collect()
    }

    pub async fn failed(&self) -> Vec<FinishedJob<J>> {
        self.jobs.lock().await.failed.iter().cloned().collect()
    }

    fn ensure_online(&self) -> Result<(), JobQueueError> {
        if self.is_offline {
            return Err(JobQueueError::Backend("Job queue offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<J> JobQueue<J> for InMemoryJobQueue<J>
where
    J: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn enqueue(&self, payload: J, options: JobOptions) -> Result<JobId, JobQueueError> {
        self.ensure_online()?;
        let id = Uuid::now_v7().to_string();
        self.jobs.lock().await.waiting.push_back(QueuedJob {
            id: id.clone(),
            payload,
            options,
            attempt: 0,
            run_at: Instant::now(),
        });
        self.notify.notify_one();
        Ok(id)
    }

    async fn reserve(&self) -> Result<Option<ReservedJob<J>>, JobQueueError> {
        self.ensure_online()?;
        let mut jobs = self.jobs.lock().await;
        let now = Instant::now();
        let Some(position) = jobs.waiting.iter().position(|job| job.run_at <= now) else {
            return Ok(None);
        };
        let Some(mut job) = jobs.waiting.remove(position) else {
            return Ok(None);
        };
        job.attempt += 1;
        let reserved = ReservedJob {
            id: job.id.clone(),
            payload: job.payload.clone(),
            attempt: job.attempt,
        };
        jobs.active.insert(job.id.clone(), job);
        Ok(Some(reserved))
    }

    async fn complete(&self, id: &str) -> Result<(), JobQueueError> {
        self.ensure_online()?;
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .active
            .remove(id)
            .ok_or_else(|| JobQueueError::NotReserved(id.to_string()))?;
        let keep = job.options.keep_completed;
        jobs.completed.push_back(FinishedJob {
            id: job.id,
            payload: job.payload,
            attempts: job.attempt,
            reason: None,
        });
        retain_last(&mut jobs.completed, keep);
        Ok(())
    }

    async fn fail(&self, id: &str, reason: &str) -> Result<FailureOutcome, JobQueueError> {
        self.ensure_online()?;
        let mut jobs = self.jobs.lock().await;
        let mut job = jobs
            .active
            .remove(id)
            .ok_or_else(|| JobQueueError::NotReserved(id.to_string()))?;

        if job.attempt >= job.options.attempts {
            let attempts = job.attempt;
            let keep = job.options.keep_failed;
            jobs.failed.push_back(FinishedJob {
                id: job.id,
                payload: job.payload,
                attempts,
                reason: Some(reason.to_string()),
            });
            retain_last(&mut jobs.failed, keep);
            return Ok(FailureOutcome::Exhausted { attempts });
        }

        let delay = job.options.backoff_after(job.attempt);
        let attempt = job.attempt + 1;
        job.run_at = Instant::now() + delay;
        jobs.waiting.push_back(job);
        drop(jobs);
        self.notify.notify_one();
        Ok(FailureOutcome::Retrying { attempt, delay })
    }

    async fn wait_for_work(&self) {
        let next_due = self
            .jobs
            .lock()
            .await
            .waiting
            .iter()
            .map(|job| job.run_at)
            .min();
        match next_due {
            Some(at) if at <= Instant::now() => {}
            Some(at) => {
                tokio::select! {
                    _ = self.notify.notified() => {}
                    _ = tokio::time::sleep_until(at) => {}
                }
            }
            None => self.notify.notified().await,
        }
    }
}
