use axum::{
    Router,
    routing::{get, post, put},
};

use crate::modules::exercise_progress::use_cases::list_workout_progress::inbound::http as list_http;
use crate::modules::exercise_progress::use_cases::request_progress_recalculation::inbound::http as recalculate_http;
use crate::modules::exercise_progress::use_cases::track_workout_progress::inbound::http as track_http;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/workouts", post(track_http::create).get(list_http::handle))
        .route(
            "/workouts/{id}",
            put(track_http::update).delete(track_http::delete),
        )
        .route("/users/{id}/weight", put(track_http::register_user))
        .route("/progress/recalculate", post(recalculate_http::handle))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}
