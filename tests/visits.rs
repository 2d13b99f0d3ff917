mod common;

use axum::http::StatusCode;
use common::{body_json, body_string, TestApp};
use visitcount::routes::visits::MESSAGE;

#[tokio::test]
async fn first_visit_on_empty_table() {
    let app = TestApp::new().await;
    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["message"], MESSAGE);
    assert_eq!(json["total_visits"], 1);
    assert_eq!(json["last_visit"]["id"], 1);
    assert!(json["last_visit"]["visited_at"].is_string());
}

#[tokio::test]
async fn second_visit_increments_count_and_id() {
    let app = TestApp::new().await;
    app.get("/").await;

    let json = body_json(app.get("/").await).await;
    assert_eq!(json["total_visits"], 2);
    assert_eq!(json["last_visit"]["id"], 2);
}

#[tokio::test]
async fn nth_visit_reports_n_with_increasing_ids() {
    let app = TestApp::new().await;
    let mut last_id = 0;

    for n in 1..=10 {
        let json = body_json(app.get("/").await).await;
        assert_eq!(json["total_visits"].as_i64(), Some(n));

        let id = json["last_visit"]["id"].as_i64().unwrap();
        assert!(id > last_id, "id {id} not greater than {last_id}");
        last_id = id;
    }
}

#[tokio::test]
async fn each_request_persists_one_row() {
    let app = TestApp::new().await;
    for _ in 0..3 {
        app.get("/").await;
    }

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
        .fetch_one(app.db.pool())
        .await
        .unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn query_failure_returns_server_error() {
    let app = TestApp::new().await;
    sqlx::query("DROP TABLE visits")
        .execute(app.db.pool())
        .await
        .unwrap();

    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_string(resp).await;
    assert!(!body.contains("total_visits"));
    assert!(!body.contains("last_visit"));
    assert!(body.contains("internal server error"));
}

#[tokio::test]
async fn missing_schema_returns_server_error() {
    let app = TestApp::with_db(common::memory_db());
    let resp = app.get("/").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
