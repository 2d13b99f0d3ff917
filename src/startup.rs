//! Startup sequence: wait for the database, then create the schema.
//!
//! The readiness wait is a bounded loop with a fixed delay between attempts.
//! There is no backoff or jitter, and nothing cancels it; it either gets a
//! connection or gives up after `max_attempts` failures.

use std::time::Duration;

use crate::config::Config;
use crate::db::Database;
use crate::error::StartupError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: config.retry_delay,
        }
    }
}

/// Poll `db` until a connection can be opened.
///
/// Returns the number of attempts it took. After `max_attempts` failures the
/// last connection error is returned inside `StartupError::NeverReady`.
pub async fn wait_for_db(db: &Database, policy: RetryPolicy) -> Result<u32, StartupError> {
    let mut attempt = 0;

    loop {
        attempt += 1;
        let err = match db.ping().await {
            Ok(()) => {
                tracing::info!(attempt, "database ready");
                return Ok(attempt);
            }
            Err(e) => e,
        };

        tracing::warn!(
            attempt,
            max_attempts = policy.max_attempts,
            error = %err,
            "database not ready"
        );

        // Give up straight away on the last attempt; sleeping first would
        // only delay the fatal error.
        if attempt >= policy.max_attempts {
            return Err(StartupError::NeverReady {
                attempts: attempt,
                source: err,
            });
        }
        tokio::time::sleep(policy.delay).await;
    }
}

/// Full startup sequence. The returned handle is ready to serve requests.
pub async fn initialize(config: &Config) -> Result<Database, StartupError> {
    let db = Database::new(config).map_err(StartupError::Database)?;

    wait_for_db(&db, RetryPolicy::from_config(config)).await?;

    db.ensure_schema().await.map_err(StartupError::Schema)?;
    tracing::info!("schema ready");

    Ok(db)
}

/// Load the configuration from `lookup` and run the startup sequence.
///
/// A missing or malformed configuration fails here, before the database is
/// ever contacted.
pub async fn boot<F>(lookup: F) -> Result<(Config, Database), StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    let config = Config::from_lookup(lookup)?;
    let db = initialize(&config).await?;
    Ok((config, db))
}
