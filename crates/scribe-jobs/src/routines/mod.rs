//! Transformation routines, one per job context.
//!
//! Each routine reads its input, calls the model through the shared
//! [`Pipeline`](crate::pipeline::Pipeline), persists its artifact and returns
//! the metadata the scheduler merges into the job on success.

pub mod blog;
pub mod ideas;
pub mod sentiment;
pub mod social;

pub use blog::BlogRoutine;
pub use ideas::IdeasRoutine;
pub use sentiment::SentimentRoutine;
pub use social::SocialRoutine;

use tracing::{debug, info};
use uuid::Uuid;

use scribe_core::{Comment, CommentSource, ContentSource, Error, Job, Result};
use scribe_db::Database;

use crate::adapters::youtube::extract_video_id;

/// Load the job's content source together with its non-empty raw text.
pub(crate) async fn load_source(db: &Database, content_id: Uuid) -> Result<(ContentSource, String)> {
    let content = db
        .contents
        .get(content_id)
        .await?
        .ok_or(Error::ContentNotFound(content_id))?;

    let text = content
        .raw_text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            Error::TranscriptUnavailable(format!("content {} has no raw text", content_id))
        })?;

    Ok((content, text))
}

/// Comments for the job's content source, fetched once and cached.
///
/// An existing active comment set is reused as-is; otherwise the comments are
/// acquired from `source` and stored, even when there are none.
pub(crate) async fn comments_for(
    db: &Database,
    source: &dyn CommentSource,
    job: &Job,
) -> Result<Vec<Comment>> {
    if let Some(set) = db.comments.find_active(job.content_id).await? {
        debug!(
            subsystem = "jobs",
            component = "comments",
            op = "cache_hit",
            content_id = %job.content_id,
            comment_count = set.comments.len(),
            "Reusing cached comment set"
        );
        return Ok(set.comments);
    }

    let content = db
        .contents
        .get(job.content_id)
        .await?
        .ok_or(Error::ContentNotFound(job.content_id))?;
    let video_id = extract_video_id(&content.link).ok_or_else(|| {
        Error::InvalidInput(format!("no video id in link: {}", content.link))
    })?;

    let comments = source.fetch_all(&video_id).await?;
    info!(
        subsystem = "jobs",
        component = "comments",
        op = "acquire",
        content_id = %job.content_id,
        comment_count = comments.len(),
        "Fetched comments"
    );

    let set = db
        .comments
        .insert(job.content_id, Some(job.id), comments)
        .await?;
    Ok(set.comments)
}

/// Trim, drop empties and remove case-insensitive duplicates, keeping the
/// first occurrence, then cap at `max`.
pub(crate) fn dedupe_capped(items: Vec<String>, max: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(s.to_lowercase()))
        .take(max)
        .collect()
}
