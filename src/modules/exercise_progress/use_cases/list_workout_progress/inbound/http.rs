use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::error;

use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::core::workout::DateRange;
use crate::modules::exercise_progress::use_cases::list_workout_progress::query::{
    DEFAULT_LIMIT, ListWorkoutProgressQuery,
};
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct ListWorkoutsParams {
    pub user_id: String,
    pub category_id: String,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub include_progress: Option<bool>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

pub async fn handle(
    State(state): State<AppState>,
    Query(params): Query<ListWorkoutsParams>,
) -> impl IntoResponse {
    let query = ListWorkoutProgressQuery {
        scope: ScopeKey::new(params.user_id, params.category_id),
        range: DateRange {
            from: params.from,
            to: params.to,
        },
        include_progress: params.include_progress.unwrap_or(false),
        offset: params.offset.unwrap_or(0),
        limit: params.limit.unwrap_or(DEFAULT_LIMIT),
    };

    match state.list_handler.handle(query).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => {
            error!(error = %e, "failed to list workouts");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
