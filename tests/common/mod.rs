#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use visitcount::config::Config;
use visitcount::db::Database;

pub struct TestApp {
    pub router: Router,
    pub db: Database,
}

impl TestApp {
    /// App backed by a fresh in-memory database with the schema in place.
    pub async fn new() -> Self {
        let db = memory_db();
        db.ensure_schema()
            .await
            .expect("Failed to create visits table");

        Self::with_db(db)
    }

    /// App over `db` as-is; no startup sequence is run.
    pub fn with_db(db: Database) -> Self {
        let router = visitcount::build_app(db.clone());
        Self { router, db }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }
}

/// Single-connection pool so every operation sees the same in-memory database.
pub fn memory_db() -> Database {
    let mut config = Config::new("sqlite::memory:");
    config.max_connections = 1;
    Database::new(&config).expect("Failed to create in-memory database")
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}
