//! # scribe-db
//!
//! Persistence layer for scribe.
//!
//! This crate provides:
//! - Connection pool management
//! - PostgreSQL repositories for content sources, the job ledger, comment
//!   sets and artifacts
//! - Embedded schema migrations
//! - An in-memory store implementing the same traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use scribe_db::{Database, JobContext};
//!
//! #[tokio::main]
//! async fn main() -> scribe_db::Result<()> {
//!     let db = Database::connect("postgres://localhost/scribe").await?;
//!     db.migrate().await?;
//!
//!     let pending = db.jobs.pending_count().await?;
//!     println!("{} jobs waiting", pending);
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use serde_json::Value as JsonValue;

pub mod artifacts;
pub mod comments;
pub mod contents;
pub mod jobs;
pub mod memory;
pub mod pool;

// Re-export core types
pub use scribe_core::*;

pub use artifacts::PgArtifactRepository;
pub use comments::PgCommentRepository;
pub use contents::PgContentRepository;
pub use jobs::PgJobRepository;
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool; `None` for the in-memory store.
    pub pool: Option<sqlx::Pool<sqlx::Postgres>>,
    /// Content source repository.
    pub contents: Arc<dyn ContentRepository>,
    /// Job ledger.
    pub jobs: Arc<dyn JobRepository>,
    /// Cached comment sets.
    pub comments: Arc<dyn CommentRepository>,
    /// Derived artifacts.
    pub artifacts: Arc<dyn ArtifactRepository>,
}

impl Database {
    /// Create a new database context from an existing pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            contents: Arc::new(PgContentRepository::new(pool.clone())),
            jobs: Arc::new(PgJobRepository::new(pool.clone())),
            comments: Arc::new(PgCommentRepository::new(pool.clone())),
            artifacts: Arc::new(PgArtifactRepository::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Connect to the database with default pool configuration.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_config(url, PoolConfig::default()).await
    }

    /// Connect to the database with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Database context backed by a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Database context sharing an existing in-memory store.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            pool: None,
            contents: store.clone(),
            jobs: store.clone(),
            comments: store.clone(),
            artifacts: store,
        }
    }

    /// Run embedded migrations. A no-op for the in-memory store.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        if let Some(pool) = &self.pool {
            sqlx::migrate!("./migrations")
                .run(pool)
                .await
                .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        }
        Ok(())
    }

    /// Content source with every job created for it.
    pub async fn content_with_jobs(&self, id: uuid::Uuid) -> Result<Option<ContentWithJobs>> {
        let Some(content) = self.contents.get(id).await? else {
            return Ok(None);
        };
        let jobs = self.jobs.list_for_content(id).await?;
        Ok(Some(ContentWithJobs { content, jobs }))
    }

    /// A page of a user's content sources, each with its jobs.
    pub async fn list_contents_with_jobs(
        &self,
        req: ListContentsRequest,
    ) -> Result<ListContentsResponse> {
        let (contents, total) = self.contents.list(req).await?;
        let mut items = Vec::with_capacity(contents.len());
        for content in contents {
            let jobs = self.jobs.list_for_content(content.id).await?;
            items.push(ContentWithJobs { content, jobs });
        }
        Ok(ListContentsResponse { items, total })
    }
}

/// Coerce a metadata value into a JSON object suitable for merging.
///
/// `null` becomes `{}`; any other non-object is kept under `"result"`.
pub(crate) fn metadata_patch(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(_) => value,
        JsonValue::Null => JsonValue::Object(Default::default()),
        other => serde_json::json!({ "result": other }),
    }
}
