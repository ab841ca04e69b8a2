//! Server configuration read from the environment.

use std::str::FromStr;

use axum::http::HeaderValue;

use sixten_core::defaults::{
    DEFAULT_USER_ID, MAX_ACTIVE_LINKS, MAX_ACTIVE_MINUTES, MAX_BODY_BYTES, SERVER_PORT,
};
use sixten_core::{Error, OwnerId, Result, TriageLimits};

/// Origins allowed when `ALLOWED_ORIGINS` is unset or blank.
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";

/// Where links are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local store, lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(Error::Config(format!(
                "SIXTEN_STORAGE must be 'postgres' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

/// Everything `main` needs to assemble the server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: String,
    pub allowed_origins: String,
    pub owner: OwnerId,
    pub limits: TriageLimits,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: SERVER_PORT,
            storage: StorageBackend::Postgres,
            database_url: "postgres://localhost/sixten".to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.to_string(),
            owner: OwnerId::new(DEFAULT_USER_ID),
            limits: TriageLimits::default(),
            max_body_bytes: MAX_BODY_BYTES,
        }
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: '{}'", key, raw))),
        _ => Ok(default),
    }
}

impl AppConfig {
    /// Read configuration from environment variables, falling back to
    /// defaults for anything unset. Malformed numbers are an error.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let storage = match std::env::var("SIXTEN_STORAGE") {
            Ok(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => defaults.storage,
        };

        let limits = TriageLimits {
            max_active_links: env_parse("MAX_ACTIVE_LINKS", MAX_ACTIVE_LINKS)?,
            max_active_minutes: env_parse("MAX_ACTIVE_MINUTES", MAX_ACTIVE_MINUTES)?,
        };
        if limits.max_active_links == 0 || limits.max_active_minutes <= 0 {
            return Err(Error::Config(
                "MAX_ACTIVE_LINKS and MAX_ACTIVE_MINUTES must be positive".to_string(),
            ));
        }

        Ok(Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_parse("PORT", defaults.port)?,
            storage,
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            allowed_origins: std::env::var("ALLOWED_ORIGINS").unwrap_or(defaults.allowed_origins),
            owner: std::env::var("SIXTEN_USER_ID")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(OwnerId::new)
                .unwrap_or(defaults.owner),
            limits,
            max_body_bytes: env_parse("MAX_BODY_BYTES", defaults.max_body_bytes)?,
        })
    }

    /// CORS origins as header values. Invalid entries are skipped with a
    /// warning; a blank list falls back to the defaults.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        let source = if self.allowed_origins.trim().is_empty() {
            DEFAULT_ALLOWED_ORIGINS
        } else {
            self.allowed_origins.as_str()
        };

        source
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match trimmed.parse::<HeaderValue>() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                        None
                    }
                }
            })
            .collect()
    }
}
