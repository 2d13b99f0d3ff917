pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod startup;

use axum::Router;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::db::Database;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the full Axum application router.
///
/// Caller is responsible for running the startup sequence on `db` beforehand;
/// `/` fails with a 500 until the `visits` table exists.
pub fn build_app(db: Database) -> Router {
    let state = AppState { db };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::visits::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
