//! Process configuration, read once from the environment at startup.

use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 2;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// sqlx SQLite URL, e.g. `sqlite:data/visits.db`.
    pub database_url: String,
    pub port: u16,
    /// Readiness wait ceiling.
    pub max_attempts: u32,
    /// Fixed pause between readiness attempts.
    pub retry_delay: Duration,
    pub max_connections: u32,
}

impl Config {
    /// Config for `database_url` with every other setting at its default.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            port: DEFAULT_PORT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Build a config from an arbitrary variable source.
    ///
    /// `DATABASE_URL` is required and must be non-empty. The optional
    /// numeric settings fall back to their defaults when unset, but a value
    /// that is present and unparsable is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let mut config = Self::new(database_url);
        config.port = parse_var(&lookup, "PORT", DEFAULT_PORT)?;
        config.max_attempts = parse_var(&lookup, "DB_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        config.retry_delay = Duration::from_secs(parse_var(
            &lookup,
            "DB_RETRY_DELAY_SECS",
            DEFAULT_RETRY_DELAY_SECS,
        )?);
        config.max_connections =
            parse_var(&lookup, "DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;

        // Zero would never attempt a connection / never hand one out.
        for (var, value) in [
            ("DB_MAX_ATTEMPTS", config.max_attempts),
            ("DB_MAX_CONNECTIONS", config.max_connections),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    var,
                    value: value.to_string(),
                });
            }
        }

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => {
            let parsed: Result<T, _> = raw.trim().parse();
            parsed.map_err(|_| ConfigError::Invalid { var, value: raw })
        }
    }
}
