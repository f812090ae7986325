//! Process configuration read from the environment.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use scribe_core::defaults;

/// Which persistence backend the process runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    /// Volatile store for local development; everything is lost on exit.
    Memory,
}

impl StoreKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            "memory" | "mem" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Server configuration.
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | `DATABASE_URL` | `postgres://localhost/scribe` | Postgres connection string |
/// | `STORE` | `postgres` | `postgres` or `memory` |
/// | `HOST` | `0.0.0.0` | Bind address |
/// | `PORT` | `3000` | Bind port |
/// | `ALLOWED_ORIGINS` | `http://localhost:3000` | Comma-separated CORS origins |
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub store: StoreKind,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/scribe".to_string(),
            store: StoreKind::Postgres,
            host: "0.0.0.0".to_string(),
            port: defaults::SERVER_PORT,
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let base = Self::default();
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(base.database_url),
            store: std::env::var("STORE")
                .ok()
                .and_then(|v| StoreKind::parse(&v))
                .unwrap_or(base.store),
            host: std::env::var("HOST").unwrap_or(base.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(base.port),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| split_origins(&v))
                .filter(|o| !o.is_empty())
                .unwrap_or(base.allowed_origins),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    /// Origins usable by the CORS layer. Unparseable entries are dropped.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                    None
                }
            })
            .collect()
    }
}

fn split_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
