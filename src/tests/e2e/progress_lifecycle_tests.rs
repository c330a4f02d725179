use crate::modules::exercise_progress::adapters::outbound::aggregate_store::AggregateStore;
use crate::modules::exercise_progress::adapters::outbound::workout_source::WorkoutLog;
use crate::modules::exercise_progress::core::aggregate::ExerciseAggregate;
use crate::modules::exercise_progress::core::exercise_key::ScopeKey;
use crate::modules::exercise_progress::use_cases::reconcile_progress::job::ProgressCalculationJob;
use crate::shell::{graphql, http};
use crate::tests::fixtures::app::TestApp;
use crate::tests::fixtures::workouts::WorkoutBuilder;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn scope() -> ScopeKey {
    ScopeKey::new("user-fixed-0001", "category-fixed-0001")
}

fn workout_body(created_at: i64, exercises: Value) -> String {
    json!({
        "user_id": "user-fixed-0001",
        "category_id": "category-fixed-0001",
        "created_at": created_at,
        "exercises": exercises,
    })
    .to_string()
}

fn squats(sets: &[(u32, f64)]) -> Value {
    let sets: Vec<Value> = sets
        .iter()
        .enumerate()
        .map(|(index, (reps, value))| {
            json!({ "order": index + 1, "reps": reps, "value": value, "rest_minutes": 2 })
        })
        .collect();
    json!([{ "name": "Squats", "type": "weight", "unit": "kg", "sets": sets }])
}

async fn send(app: &TestApp, method: &str, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();
    let response = http::router(app.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn aggregates(app: &TestApp) -> Vec<ExerciseAggregate> {
    app.store
        .list_by_scope(&scope())
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.aggregate)
        .collect()
}

async fn assert_invariants(app: &TestApp) {
    for aggregate in aggregates(app).await {
        assert_eq!(aggregate.check_invariants(), Ok(()), "{}", aggregate.key);
    }
}

#[tokio::test]
async fn keeps_incremental_progress_consistent_with_reconciliation() {
    let app = TestApp::new().await;
    let day = 1_700_000_000_000_i64;

    let (status, first) = send(
        &app,
        "POST",
        "/workouts",
        Some(workout_body(day, squats(&[(10, 10.0)]))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_invariants(&app).await;

    let (status, second) = send(
        &app,
        "POST",
        "/workouts",
        Some(workout_body(day + 3_600_000, squats(&[(5, 10.0)]))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_invariants(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/workouts",
        Some(workout_body(day + 86_400_000, squats(&[(5, 40.0), (5, 50.0)]))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let second_id = second["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/workouts/{second_id}"),
        Some(workout_body(day + 3_600_000, squats(&[(8, 20.0)]))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_invariants(&app).await;

    let first_id = first["id"].as_str().unwrap();
    let (status, _) = send(&app, "DELETE", &format!("/workouts/{first_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_invariants(&app).await;

    let incremental = aggregates(&app).await;
    assert_eq!(incremental.len(), 1);
    assert_eq!(incremental[0].time_series.len(), 2);
    assert_eq!(incremental[0].max_weight, 50.0);
    assert_eq!(incremental[0].total_reps, 18);

    app.reconciler()
        .handle(&ProgressCalculationJob::new("user-fixed-0001", "category-fixed-0001"))
        .await
        .unwrap();
    assert_eq!(aggregates(&app).await, incremental);
}

#[tokio::test]
async fn serves_history_and_progress_to_the_read_path() {
    let app = TestApp::new().await;
    for (offset, value) in [(0_i64, 20.0), (1, 30.0), (2, 25.0)] {
        let (status, _) = send(
            &app,
            "POST",
            "/workouts",
            Some(workout_body(1_000 + offset * 1_000, squats(&[(5, value)]))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = send(
        &app,
        "GET",
        "/workouts?user_id=user-fixed-0001&category_id=category-fixed-0001\
         &include_progress=true&limit=2&from=2000",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["workouts"][0]["created_at"], 3_000);
    let progress = page["progress"]["Squats-weight"]["progress"].as_array().unwrap();
    assert_eq!(progress.len(), 2);

    let schema = graphql::schema(app.state.clone());
    let response = schema
        .execute(
            r#"{ exerciseProgress(userId: "user-fixed-0001", categoryId: "category-fixed-0001") {
                key totalReps maxWeight progress { date }
            } }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    let data = response.data.into_json().unwrap();
    assert_eq!(data["exerciseProgress"][0]["key"], "Squats-weight");
    assert_eq!(data["exerciseProgress"][0]["totalReps"], 15);
    assert_eq!(data["exerciseProgress"][0]["maxWeight"], 30.0);
    assert_eq!(
        data["exerciseProgress"][0]["progress"]
            .as_array()
            .unwrap()
            .len(),
        3
    );
}

#[tokio::test]
async fn counts_a_workout_once_when_reconciliation_runs_before_the_inline_update() {
    let app = TestApp::new().await;
    let workout = WorkoutBuilder::new().build();
    app.workouts.save(workout.clone()).await.unwrap();

    app.reconciler()
        .handle(&ProgressCalculationJob::new("user-fixed-0001", "category-fixed-0001"))
        .await
        .unwrap();
    app.state
        .track_handler
        .on_workout_created(&workout)
        .await
        .unwrap();

    let rows = aggregates(&app).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].time_series.len(), 1);
    assert_eq!(rows[0].total_volume, 650.0);

    app.workouts.remove(&workout.id).await.unwrap();
    app.state
        .track_handler
        .on_workout_deleted(&workout)
        .await
        .unwrap();
    assert!(aggregates(&app).await.is_empty());
}
