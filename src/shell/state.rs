use crate::modules::exercise_progress::adapters::outbound::aggregate_store_in_memory::InMemoryAggregateStore;
use crate::modules::exercise_progress::adapters::outbound::user_directory::InMemoryUserDirectory;
use crate::modules::exercise_progress::adapters::outbound::workout_source_in_memory::InMemoryWorkoutLog;
use crate::modules::exercise_progress::use_cases::list_workout_progress::handler::ListWorkoutProgressHandler;
use crate::modules::exercise_progress::use_cases::reconcile_progress::job::ProgressCalculationJob;
use crate::modules::exercise_progress::use_cases::request_progress_recalculation::handler::RequestProgressRecalculationHandler;
use crate::modules::exercise_progress::use_cases::track_workout_progress::handler::TrackWorkoutProgressHandler;
use crate::shared::infrastructure::job_queue::in_memory::InMemoryJobQueue;
use std::sync::Arc;

pub type ProgressQueue = InMemoryJobQueue<ProgressCalculationJob>;

#[derive(Clone)]
pub struct AppState {
    pub workouts: Arc<InMemoryWorkoutLog>,
    pub users: Arc<InMemoryUserDirectory>,
    pub track_handler:
        Arc<TrackWorkoutProgressHandler<InMemoryAggregateStore, InMemoryUserDirectory>>,
    pub list_handler: Arc<ListWorkoutProgressHandler<InMemoryWorkoutLog, InMemoryAggregateStore>>,
    pub recalculation_handler: Arc<RequestProgressRecalculationHandler<ProgressQueue>>,
}
