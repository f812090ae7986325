//! Core traits for scribe abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// CONTENT REPOSITORY
// =============================================================================

/// Repository for content sources.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Insert a new content source.
    ///
    /// Fails with [`Error::Conflict`](crate::Error::Conflict) when the user
    /// already has an active source for the same link.
    async fn insert(&self, req: NewContentSource) -> Result<ContentSource>;

    /// Insert a content source and its pending jobs atomically: either the
    /// source and every job are stored, or nothing is.
    async fn insert_with_jobs(
        &self,
        req: NewContentSource,
        jobs: Vec<(JobContext, JsonValue)>,
    ) -> Result<(ContentSource, Vec<Job>)>;

    /// Fetch a content source by ID.
    async fn get(&self, id: Uuid) -> Result<Option<ContentSource>>;

    /// Find the active content source a user already ingested for `link`.
    async fn find_by_link(&self, user_id: &str, link: &str) -> Result<Option<ContentSource>>;

    /// Bump `updated_at` without other changes.
    async fn touch(&self, id: Uuid) -> Result<()>;

    /// Append artifact ids to the blog or social list, bumping `updated_at`.
    async fn append_artifacts(&self, id: Uuid, slot: ArtifactSlot, ids: &[Uuid]) -> Result<()>;

    /// List a user's content sources, newest first, with the total count.
    async fn list(&self, req: ListContentsRequest) -> Result<(Vec<ContentSource>, i64)>;
}

// =============================================================================
// JOB REPOSITORY
// =============================================================================

/// The job ledger.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Create a pending job.
    async fn create(
        &self,
        content_id: Uuid,
        user_id: &str,
        context: JobContext,
        metadata: JsonValue,
    ) -> Result<Job>;

    /// Create several pending jobs in one transaction, preserving order.
    async fn create_many(&self, jobs: Vec<NewJob>) -> Result<Vec<Job>>;

    /// Claim the oldest pending job, moving it to `in_progress`.
    ///
    /// Returns `None` when nothing is pending.
    async fn claim_next_pending(&self) -> Result<Option<Job>>;

    /// Move an `in_progress` job to its terminal state.
    ///
    /// Returns `false` when the job was not `in_progress` and nothing changed.
    async fn finalize(&self, job_id: Uuid, outcome: JobOutcome) -> Result<bool>;

    /// Get job by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Job>>;

    /// All jobs for a content source in creation order.
    async fn list_for_content(&self, content_id: Uuid) -> Result<Vec<Job>>;

    /// Number of pending jobs.
    async fn pending_count(&self) -> Result<i64>;

    /// Return `in_progress` jobs claimed longer than `lease` ago to `pending`.
    async fn requeue_stale(&self, lease: Duration) -> Result<u64>;
}

// =============================================================================
// COMMENT & ARTIFACT REPOSITORIES
// =============================================================================

/// Repository for cached comment sets.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// The active comment set for a content source, if one was stored.
    async fn find_active(&self, content_id: Uuid) -> Result<Option<CommentSet>>;

    /// Store a new active comment set.
    async fn insert(
        &self,
        content_id: Uuid,
        job_id: Option<Uuid>,
        comments: Vec<Comment>,
    ) -> Result<CommentSet>;
}

/// Repository for derived artifacts.
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Persist one artifact.
    async fn insert(&self, req: NewArtifact) -> Result<Artifact>;

    /// Persist several artifacts atomically; either all are stored or none.
    async fn insert_many(&self, reqs: Vec<NewArtifact>) -> Result<Vec<Artifact>>;

    /// Persist artifacts and append their ids to the content source's
    /// `slot` list in one transaction.
    async fn insert_linked(
        &self,
        content_id: Uuid,
        slot: ArtifactSlot,
        reqs: Vec<NewArtifact>,
    ) -> Result<Vec<Artifact>>;

    /// Fetch an artifact by ID.
    async fn get(&self, id: Uuid) -> Result<Option<Artifact>>;

    /// Active artifacts for a content source, optionally filtered by kind.
    async fn list_for_content(&self, content_id: Uuid, kind: Option<&str>)
        -> Result<Vec<Artifact>>;
}

// =============================================================================
// EXTERNAL COLLABORATORS
// =============================================================================

/// Backend for text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}

/// Acquires transcript text for a link.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, link: &str) -> Result<Transcript>;
}

/// Acquires viewer comments for a video.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// All top-level comments for `video_id`, following pagination.
    async fn fetch_all(&self, video_id: &str) -> Result<Vec<Comment>>;
}
