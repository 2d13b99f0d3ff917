use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,

    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database endpoint not set")]
    EndpointNotSet,

    #[error("invalid database endpoint: {0}")]
    InvalidEndpoint(#[source] sqlx::Error),

    #[error("database connection failed: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("schema initialization failed: {0}")]
    Schema(#[source] sqlx::Error),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database setup failed: {0}")]
    Database(#[source] DbError),

    #[error("database never became ready after {attempts} attempts: {source}")]
    NeverReady {
        attempts: u32,
        #[source]
        source: DbError,
    },

    #[error("could not create schema: {0}")]
    Schema(#[source] DbError),
}

/// Request-phase failure; always rendered as a generic 500.
#[derive(Debug)]
pub enum AppError {
    Database(DbError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        AppError::Database(e)
    }
}
