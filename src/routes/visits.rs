use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::models::Visit;
use crate::AppState;

pub const MESSAGE: &str = "Visit counter running on axum + SQLite";

#[derive(Serialize)]
struct HomeResponse {
    message: &'static str,
    last_visit: Visit,
    total_visits: i64,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(home))
}

// Insert and count run on separate connections, so the count may already
// include visits committed by concurrent requests.
async fn home(State(state): State<AppState>) -> Result<Json<HomeResponse>, AppError> {
    let visit = state.db.insert_visit().await?;
    let total = state.db.count_visits().await?;

    Ok(Json(HomeResponse {
        message: MESSAGE,
        last_visit: visit,
        total_visits: total,
    }))
}
