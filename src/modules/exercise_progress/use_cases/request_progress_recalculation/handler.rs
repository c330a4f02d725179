use crate::modules::exercise_progress::use_cases::reconcile_progress::job::ProgressCalculationJob;
use crate::shared::infrastructure::job_queue::{JobId, JobOptions, JobQueue, JobQueueError};
use std::sync::Arc;
use tracing::debug;

/// Schedules a reconciliation of one scope on the background worker.
pub struct RequestProgressRecalculationHandler<TQueue>
where
    TQueue: JobQueue<ProgressCalculationJob> + 'static,
{
    queue: Arc<TQueue>,
    options: JobOptions,
}

impl<TQueue> RequestProgressRecalculationHandler<TQueue>
where
    TQueue: JobQueue<ProgressCalculationJob> + 'static,
{
    pub fn new(queue: Arc<TQueue>, options: JobOptions) -> Self {
        Self { queue, options }
    }

    pub async fn handle(&self, job: ProgressCalculationJob) -> Result<JobId, JobQueueError> {
        let scope = job.scope();
        let id = self.queue.enqueue(job, self.options.clone()).await?;
        debug!(job_id = %id, %scope, queue = self.queue.name(), "recalculation requested");
        Ok(id)
    }
}
