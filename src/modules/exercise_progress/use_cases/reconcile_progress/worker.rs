// Background consumer of the "progress-calculation" queue.
//
// Responsibilities
// - Keep at most `concurrency` reconciliations in flight.
// - Start at most `rate_limit_max` jobs per `rate_limit_window`.
// - Settle every job: complete it, or fail it so the queue schedules the retry.
// - Stop taking work once shutdown is signalled and drain what is in flight.

use crate::modules::exercise_progress::adapters::outbound::aggregate_store::AggregateStore;
use crate::modules::exercise_progress::adapters::outbound::user_directory::UserDirectory;
use crate::modules::exercise_progress::adapters::outbound::workout_source::WorkoutSource;
use crate::modules::exercise_progress::use_cases::reconcile_progress::handler::ReconcileProgressHandler;
use crate::modules::exercise_progress::use_cases::reconcile_progress::job::ProgressCalculationJob;
use crate::shared::infrastructure::job_queue::{FailureOutcome, JobQueue, ReservedJob};
use crate::shared::infrastructure::rate_limiter::WindowRateLimiter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const QUEUE_ERROR_PAUSE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerSettings {
    pub concurrency: usize,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            concurrency: 4,
            rate_limit_max: 10,
            rate_limit_window: Duration::from_secs(1),
        }
    }
}

pub struct ReconciliationWorker<TQueue, TStore, TSource, TUsers>
where
    TQueue: JobQueue<ProgressCalculationJob> + 'static,
    TStore: AggregateStore + 'static,
    TSource: WorkoutSource + 'static,
    TUsers: UserDirectory + 'static,
{
    queue: Arc<TQueue>,
    handler: Arc<ReconcileProgressHandler<TStore, TSource, TUsers>>,
    settings: WorkerSettings,
}

impl<TQueue, TStore, TSource, TUsers> ReconciliationWorker<TQueue, TStore, TSource, TUsers>
where
    TQueue: JobQueue<ProgressCalculationJob> + 'static,
    TStore: AggregateStore + 'static,
    TSource: WorkoutSource + 'static,
    TUsers: UserDirectory + 'static,
{
    pub fn new(
        queue: Arc<TQueue>,
        handler: Arc<ReconcileProgressHandler<TStore, TSource, TUsers>>,
        settings: WorkerSettings,
    ) -> Self {
        Self {
            queue,
            handler,
            settings,
        }
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let concurrency = self.settings.concurrency.max(1);
        let mut limiter = WindowRateLimiter::new(
            self.settings.rate_limit_max,
            self.settings.rate_limit_window,
        );
        let mut in_flight: JoinSet<()> = JoinSet::new();
        info!(queue = self.queue.name(), concurrency, "reconciliation worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            while let Some(joined) = in_flight.try_join_next() {
                log_join(joined);
            }

            if in_flight.len() >= concurrency {
                tokio::select! {
                    Some(joined) = in_flight.join_next() => log_join(joined),
                    changed = shutdown.changed() => if changed.is_err() { break },
                }
                continue;
            }

            match self.queue.reserve().await {
                Ok(Some(job)) => {
                    limiter.acquire().await;
                    in_flight.spawn(settle(self.queue.clone(), self.handler.clone(), job));
                }
                Ok(None) => {
                    tokio::select! {
                        _ = self.queue.wait_for_work() => {}
                        Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                            log_join(joined)
                        }
                        changed = shutdown.changed() => if changed.is_err() { break },
                    }
                }
                Err(e) => {
                    warn!(queue = self.queue.name(), error = %e, "failed to reserve a job");
                    tokio::select! {
                        _ = tokio::time::sleep(QUEUE_ERROR_PAUSE) => {}
                        changed = shutdown.changed() => if changed.is_err() { break },
                    }
                }
            }
        }

        info!(
            queue = self.queue.name(),
            in_flight = in_flight.len(),
            "reconciliation worker draining"
        );
        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
        info!(queue = self.queue.name(), "reconciliation worker stopped");
    }
}

fn log_join(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "reconciliation task aborted");
    }
}

async fn settle<TQueue, TStore, TSource, TUsers>(
    queue: Arc<TQueue>,
    handler: Arc<ReconcileProgressHandler<TStore, TSource, TUsers>>,
    job: ReservedJob<ProgressCalculationJob>,
) where
    TQueue: JobQueue<ProgressCalculationJob> + 'static,
    TStore: AggregateStore + 'static,
    TSource: WorkoutSource + 'static,
    TUsers: UserDirectory + 'static,
{
    let payload = job.payload.clone();
    // a panicking run surfaces as a JoinError and fails the job like any error
    let outcome = tokio::spawn(async move { handler.handle(&payload).await })
        .await
        .map_err(|e| format!("reconciliation panicked: {e}"))
        .and_then(|result| result.map_err(|e| e.to_string()));

    let scope = job.payload.scope();
    match outcome {
        Ok(summary) => {
            debug!(
                job_id = %job.id,
                %scope,
                attempt = job.attempt,
                aggregates = summary.aggregates,
                "job completed"
            );
            if let Err(e) = queue.complete(&job.id).await {
                warn!(job_id = %job.id, error = %e, "failed to complete job");
            }
        }
        Err(reason) => match queue.fail(&job.id, &reason).await {
            Ok(FailureOutcome::Retrying { attempt, delay }) => warn!(
                job_id = %job.id,
                %scope,
                next_attempt = attempt,
                delay_ms = delay.as_millis() as u64,
                %reason,
                "reconciliation failed, retry scheduled"
            ),
            Ok(FailureOutcome::Exhausted { attempts }) => error!(
                job_id = %job.id,
                %scope,
                attempts,
                %reason,
                "reconciliation failed permanently"
            ),
            Err(e) => error!(job_id = %job.id, error = %e, %reason, "failed to record job failure"),
        },
    }
}
