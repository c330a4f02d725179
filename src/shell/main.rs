use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, fmt};

use exercise_progress::modules::exercise_progress::adapters::outbound::aggregate_store_in_memory::InMemoryAggregateStore;
use exercise_progress::modules::exercise_progress::adapters::outbound::user_directory::InMemoryUserDirectory;
use exercise_progress::modules::exercise_progress::adapters::outbound::workout_source_in_memory::InMemoryWorkoutLog;
use exercise_progress::modules::exercise_progress::use_cases::list_workout_progress::handler::ListWorkoutProgressHandler;
use exercise_progress::modules::exercise_progress::use_cases::reconcile_progress::handler::ReconcileProgressHandler;
use exercise_progress::modules::exercise_progress::use_cases::reconcile_progress::job::PROGRESS_CALCULATION_QUEUE;
use exercise_progress::modules::exercise_progress::use_cases::reconcile_progress::worker::ReconciliationWorker;
use exercise_progress::modules::exercise_progress::use_cases::request_progress_recalculation::handler::RequestProgressRecalculationHandler;
use exercise_progress::modules::exercise_progress::use_cases::track_workout_progress::handler::TrackWorkoutProgressHandler;
use exercise_progress::shared::infrastructure::keyed_locks::KeyedLocks;
use exercise_progress::shell::config::AppConfig;
use exercise_progress::shell::state::{AppState, ProgressQueue};
use exercise_progress::shell::{graphql, http};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let config = AppConfig::from_env()?;

    // In-memory deps for now
    let workouts = Arc::new(InMemoryWorkoutLog::new());
    let store = Arc::new(InMemoryAggregateStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let queue = Arc::new(ProgressQueue::new(PROGRESS_CALCULATION_QUEUE));
    let locks = Arc::new(KeyedLocks::new());

    let track_handler = Arc::new(
        TrackWorkoutProgressHandler::new(store.clone(), users.clone(), locks.clone())
            .with_max_weight_mode(config.max_weight_mode)
            .with_conflict_retries(config.conflict_retries),
    );
    let reconcile_handler = Arc::new(
        ReconcileProgressHandler::new(store.clone(), workouts.clone(), users.clone(), locks)
            .with_max_weight_mode(config.max_weight_mode),
    );

    let state = AppState {
        workouts: workouts.clone(),
        users,
        track_handler,
        list_handler: Arc::new(ListWorkoutProgressHandler::new(workouts, store)),
        recalculation_handler: Arc::new(RequestProgressRecalculationHandler::new(
            queue.clone(),
            config.job_options.clone(),
        )),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker = ReconciliationWorker::new(queue, reconcile_handler, config.worker.clone());
    let worker = tokio::spawn(worker.run(shutdown_rx));

    let app = http::router(state.clone())
        .merge(graphql::router(graphql::schema(state)))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("HTTP endpoint: http://{}", config.http_addr);
    tracing::info!("GraphQL endpoint: http://{}/gql", config.http_addr);
    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {e}");
            }
        })
        .await?;

    tracing::info!("shutting down reconciliation worker");
    shutdown_tx.send(true)?;
    worker.await?;
    Ok(())
}
