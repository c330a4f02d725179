// Stand-in workout CRUD endpoints.
//
// Every mutation persists to the workout log first and then runs the progress
// updater inline. If the updater fails the log change is rolled back, so the
// log and the aggregates never disagree about which workouts exist.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use crate::modules::exercise_progress::adapters::outbound::aggregate_store::AggregateStoreError;
use crate::modules::exercise_progress::adapters::outbound::workout_source::{
    WorkoutLog, WorkoutSource,
};
use crate::modules::exercise_progress::core::workout::{ExercisePerformance, WorkoutRecord};
use crate::modules::exercise_progress::use_cases::track_workout_progress::handler::ProgressError;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct WorkoutBody {
    pub user_id: String,
    pub category_id: String,
    pub created_at: Option<i64>,
    pub exercises: Vec<ExercisePerformance>,
}

#[derive(Deserialize)]
pub struct UserWeightBody {
    pub weight: Option<f64>,
}

fn progress_failure(e: ProgressError) -> Response {
    match e {
        ProgressError::UserNotFound(_) => StatusCode::NOT_FOUND.into_response(),
        ProgressError::OwnerChanged { .. } => StatusCode::UNPROCESSABLE_ENTITY.into_response(),
        ProgressError::Store(AggregateStoreError::VersionMismatch { .. }) => {
            StatusCode::CONFLICT.into_response()
        }
        e => {
            error!(error = %e, "progress update failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn log_failure(e: anyhow::Error) -> Response {
    error!(error = %e, "workout log unavailable");
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn roll_back<F>(restore: F, workout_id: &str)
where
    F: Future<Output = anyhow::Result<()>>,
{
    if let Err(e) = restore.await {
        warn!(workout_id, error = %e, "failed to roll back workout log");
    }
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<WorkoutBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let workout = WorkoutRecord {
        id: Uuid::now_v7().to_string(),
        user_id: body.user_id,
        category_id: body.category_id,
        created_at: body
            .created_at
            .unwrap_or_else(|| Utc::now().timestamp_millis()),
        exercises: body.exercises,
    };
    if workout.validate().is_err() {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }

    if let Err(e) = state.workouts.save(workout.clone()).await {
        return log_failure(e);
    }
    match state.track_handler.on_workout_created(&workout).await {
        Ok(_) => (StatusCode::CREATED, Json(workout)).into_response(),
        Err(e) => {
            roll_back(async { state.workouts.remove(&workout.id).await.map(|_| ()) }, &workout.id)
                .await;
            progress_failure(e)
        }
    }
}

pub async fn update(
    State(state): State<AppState>,
    Path(workout_id): Path<String>,
    body: Result<Json<WorkoutBody>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let previous = match state.workouts.get(&workout_id).await {
        Ok(Some(previous)) => previous,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => return log_failure(e),
    };
    let current = WorkoutRecord {
        id: previous.id.clone(),
        user_id: body.user_id,
        category_id: body.category_id,
        created_at: body.created_at.unwrap_or(previous.created_at),
        exercises: body.exercises,
    };
    if current.validate().is_err() {
        return StatusCode::UNPROCESSABLE_ENTITY.into_response();
    }

    if let Err(e) = state.workouts.save(current.clone()).await {
        return log_failure(e);
    }
    match state
        .track_handler
        .on_workout_updated(&previous, &current)
        .await
    {
        Ok(_) => Json(current).into_response(),
        Err(e) => {
            roll_back(state.workouts.save(previous.clone()), &previous.id).await;
            progress_failure(e)
        }
    }
}

pub async fn delete(State(state): State<AppState>, Path(workout_id): Path<String>) -> Response {
    let removed = match state.workouts.remove(&workout_id).await {
        Ok(Some(removed)) => removed,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => return log_failure(e),
    };
    match state.track_handler.on_workout_deleted(&removed).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            roll_back(state.workouts.save(removed.clone()), &removed.id).await;
            progress_failure(e)
        }
    }
}

pub async fn register_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    body: Result<Json<UserWeightBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY,
    };
    if body.weight.is_some_and(|weight| !weight.is_finite()) {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }
    state.users.register(user_id, body.weight).await;
    StatusCode::NO_CONTENT
}
