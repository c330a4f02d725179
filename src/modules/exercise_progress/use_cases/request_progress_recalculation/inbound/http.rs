use axum::{
    Json, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::modules::exercise_progress::use_cases::reconcile_progress::job::ProgressCalculationJob;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct RecalculateProgressBody {
    pub user_id: String,
    pub category_id: String,
}

#[derive(Serialize)]
pub struct RecalculateProgressResponse {
    pub job_id: String,
}

pub async fn handle(
    State(state): State<AppState>,
    body: Result<Json<RecalculateProgressBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let job = ProgressCalculationJob::new(body.user_id, body.category_id);
    match state.recalculation_handler.handle(job).await {
        Ok(job_id) => (
            StatusCode::ACCEPTED,
            Json(RecalculateProgressResponse { job_id }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to enqueue progress recalculation");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod request_progress_recalculation_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header},
        routing::post,
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use crate::shell::state::AppState;
    use crate::tests::fixtures::app::TestApp;

    use super::handle;

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/progress/recalculate", post(handle))
            .with_state(state)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post("/progress/recalculate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn it_should_return_202_with_the_job_id() {
        let test_app = TestApp::new().await;
        let queue = test_app.queue.clone();
        let response = app(test_app.state)
            .oneshot(post_json(
                r#"{"user_id":"user-fixed-0001","category_id":"category-fixed-0001"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["job_id"].as_str().is_some_and(|id| !id.is_empty()));
        assert_eq!(queue.waiting_len().await, 1);
    }

    #[tokio::test]
    async fn it_should_return_422_when_the_body_is_invalid() {
        let test_app = TestApp::new().await;
        let response = app(test_app.state)
            .oneshot(post_json(r#"{"user_id":"user-fixed-0001"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
