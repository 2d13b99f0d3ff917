use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Liveness only; never touches the database.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
