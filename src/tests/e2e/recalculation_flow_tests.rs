use crate::modules::exercise_progress::adapters::outbound::aggregate_store::{
    AggregateStore, AggregateWrite,
};
use crate::modules::exercise_progress::adapters::outbound::workout_source::WorkoutLog;
use crate::modules::exercise_progress::core::exercise_key::{AggregateKey, ScopeKey};
use crate::modules::exercise_progress::use_cases::reconcile_progress::worker::{
    ReconciliationWorker, WorkerSettings,
};
use crate::shell::{graphql, http};
use crate::tests::fixtures::app::TestApp;
use crate::tests::fixtures::workouts::WorkoutBuilder;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tower::ServiceExt;

fn start_worker(app: &TestApp) -> (watch::Sender<bool>, JoinHandle<()>) {
    let worker = ReconciliationWorker::new(
        app.queue.clone(),
        Arc::new(app.reconciler()),
        WorkerSettings::default(),
    );
    let (tx, rx) = watch::channel(false);
    (tx, tokio::spawn(worker.run(rx)))
}

async fn wait_for_completed(app: &TestApp, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while app.queue.completed().await.len() < count {
        assert!(Instant::now() < deadline, "recalculation did not complete in time");
        sleep(Duration::from_millis(5)).await;
    }
}

fn deadlifts() -> AggregateKey {
    AggregateKey::new(
        &ScopeKey::new("user-fixed-0001", "category-fixed-0001"),
        "deadlifts",
    )
}

#[tokio::test]
async fn repairs_drifted_progress_on_request() {
    let app = TestApp::new().await;
    let workout = WorkoutBuilder::new().build();
    app.workouts.save(workout.clone()).await.unwrap();
    app.state
        .track_handler
        .on_workout_created(&workout)
        .await
        .unwrap();

    // simulate drift left behind by an earlier lost update
    let row = app.store.get(&deadlifts()).await.unwrap().unwrap();
    let mut drifted = row.aggregate.clone();
    drifted.total_volume += 100.0;
    app.store
        .commit(vec![AggregateWrite::Upsert {
            aggregate: drifted,
            expected_version: Some(row.version),
        }])
        .await
        .unwrap();

    let (shutdown, worker) = start_worker(&app);
    let response = http::router(app.state.clone())
        .oneshot(
            Request::post("/progress/recalculate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"user_id":"user-fixed-0001","category_id":"category-fixed-0001"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    wait_for_completed(&app, 1).await;
    let repaired = app.store.get(&deadlifts()).await.unwrap().unwrap();
    assert_eq!(repaired.aggregate, row.aggregate);

    shutdown.send(true).unwrap();
    worker.await.unwrap();
}

#[tokio::test]
async fn schedules_recalculation_through_graphql() {
    let app = TestApp::new().await;
    app.workouts.save(WorkoutBuilder::new().build()).await.unwrap();
    let (shutdown, worker) = start_worker(&app);

    let schema = graphql::schema(app.state.clone());
    let response = schema
        .execute(
            r#"mutation { requestProgressRecalculation(
                userId: "user-fixed-0001", categoryId: "category-fixed-0001"
            ) }"#,
        )
        .await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);

    wait_for_completed(&app, 1).await;
    let row = app.store.get(&deadlifts()).await.unwrap().unwrap();
    assert_eq!(row.aggregate.total_volume, 650.0);
    assert_eq!(row.aggregate.check_invariants(), Ok(()));

    shutdown.send(true).unwrap();
    worker.await.unwrap();
}
