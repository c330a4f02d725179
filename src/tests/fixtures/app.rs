// In-memory wiring of the whole service for inbound adapter and e2e tests.
// "user-fixed-0001" is registered with a 70 kg baseline.

use crate::modules::exercise_progress::adapters::outbound::aggregate_store_in_memory::InMemoryAggregateStore;
use crate::modules::exercise_progress::adapters::outbound::user_directory::InMemoryUserDirectory;
use crate::modules::exercise_progress::adapters::outbound::workout_source_in_memory::InMemoryWorkoutLog;
use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::use_cases::list_workout_progress::handler::ListWorkoutProgressHandler;
use crate::modules::exercise_progress::use_cases::reconcile_progress::handler::ReconcileProgressHandler;
use crate::modules::exercise_progress::use_cases::reconcile_progress::job::PROGRESS_CALCULATION_QUEUE;
use crate::modules::exercise_progress::use_cases::request_progress_recalculation::handler::RequestProgressRecalculationHandler;
use crate::modules::exercise_progress::use_cases::track_workout_progress::handler::TrackWorkoutProgressHandler;
use crate::shared::infrastructure::job_queue::JobOptions;
use crate::shared::infrastructure::keyed_locks::KeyedLocks;
use crate::shell::state::{AppState, ProgressQueue};
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub state: AppState,
    pub workouts: Arc<InMemoryWorkoutLog>,
    pub store: Arc<InMemoryAggregateStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub queue: Arc<ProgressQueue>,
    pub locks: Arc<KeyedLocks<ScopeKey>>,
}

impl TestApp {
    pub async fn new() -> Self {
        let workouts = Arc::new(InMemoryWorkoutLog::new());
        let store = Arc::new(InMemoryAggregateStore::new());
        let users = Arc::new(InMemoryUserDirectory::new());
        users.register("user-fixed-0001", Some(70.0)).await;
        let queue = Arc::new(ProgressQueue::new(PROGRESS_CALCULATION_QUEUE));
        let locks = Arc::new(KeyedLocks::new());

        let options = JobOptions {
            backoff: Duration::from_millis(10),
            ..JobOptions::default()
        };
        let state = AppState {
            workouts: workouts.clone(),
            users: users.clone(),
            track_handler: Arc::new(TrackWorkoutProgressHandler::new(
                store.clone(),
                users.clone(),
                locks.clone(),
            )),
            list_handler: Arc::new(ListWorkoutProgressHandler::new(
                workouts.clone(),
                store.clone(),
            )),
            recalculation_handler: Arc::new(RequestProgressRecalculationHandler::new(
                queue.clone(),
                options,
            )),
        };

        Self {
            state,
            workouts,
            store,
            users,
            queue,
            locks,
        }
    }

    pub fn reconciler(
        &self,
    ) -> ReconcileProgressHandler<InMemoryAggregateStore, InMemoryWorkoutLog, InMemoryUserDirectory>
    {
        ReconcileProgressHandler::new(
            self.store.clone(),
            self.workouts.clone(),
            self.users.clone(),
            self.locks.clone(),
        )
    }
}
