use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Sqlite;
use std::str::FromStr;
use std::time::Duration;

use crate::config::Config;
use crate::error::DbError;
use crate::models::Visit;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const CREATE_VISITS: &str = r#"
    CREATE TABLE IF NOT EXISTS visits (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        visited_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    )
"#;

/// Handle to the visits database.
///
/// Every operation acquires its own pooled connection, runs a single
/// statement, and releases the connection when it goes out of scope,
/// whether the statement succeeded or not.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Prepare a lazily-connecting pool. Nothing is opened until the first
    /// `connect()`, so an unreachable database is not an error here.
    pub fn new(config: &Config) -> Result<Self, DbError> {
        let url = config.database_url.trim();
        if url.is_empty() {
            return Err(DbError::EndpointNotSet);
        }

        // The file is created on demand, its directory is not.
        let options = SqliteConnectOptions::from_str(url)
            .map_err(DbError::InvalidEndpoint)?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(ACQUIRE_TIMEOUT);

        // An in-memory database disappears with its last connection.
        if is_in_memory(url) {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        Ok(Self {
            pool: pool_options.connect_lazy_with(options),
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn connect(&self) -> Result<PoolConnection<Sqlite>, DbError> {
        self.pool.acquire().await.map_err(DbError::Connection)
    }

    /// Open a connection and release it straight away.
    pub async fn ping(&self) -> Result<(), DbError> {
        let conn = self.connect().await?;
        drop(conn);
        Ok(())
    }

    pub async fn ensure_schema(&self) -> Result<(), DbError> {
        let mut conn = self.connect().await?;
        sqlx::query(CREATE_VISITS)
            .execute(&mut *conn)
            .await
            .map_err(DbError::Schema)?;
        Ok(())
    }

    pub async fn insert_visit(&self) -> Result<Visit, DbError> {
        let mut conn = self.connect().await?;
        sqlx::query_as::<_, Visit>(
            "INSERT INTO visits DEFAULT VALUES RETURNING id, visited_at",
        )
        .fetch_one(&mut *conn)
        .await
        .map_err(DbError::Query)
    }

    pub async fn count_visits(&self) -> Result<i64, DbError> {
        let mut conn = self.connect().await?;
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
            .fetch_one(&mut *conn)
            .await
            .map_err(DbError::Query)?;
        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// True for the sqlx in-memory forms: `sqlite::memory:` (optionally with
/// query parameters) and any URL carrying `mode=memory`.
fn is_in_memory(url: &str) -> bool {
    let rest = url.strip_prefix("sqlite:").unwrap_or(url);
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let (database, params) = rest.split_once('?').unwrap_or((rest, ""));

    database == ":memory:" || params.split('&').any(|param| param == "mode=memory")
}

#[cfg(test)]
mod tests {
    use super::is_in_memory;

    #[test]
    fn recognises_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://:memory:"));
        assert!(is_in_memory("sqlite::memory:?cache=shared"));
        assert!(is_in_memory("sqlite:visits?mode=memory&cache=shared"));
    }

    #[test]
    fn file_paths_mentioning_memory_are_files() {
        assert!(!is_in_memory("sqlite:data/:memory:/visits.db"));
        assert!(!is_in_memory("sqlite:/tmp/x:memory:.db"));
        assert!(!is_in_memory("sqlite:visits.db?mode=rwc"));
    }
}
