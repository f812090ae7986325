//! Ingestion: turn a link into a content source plus one pending job per
//! requested artifact type.

use std::sync::Arc;

use tracing::{info, instrument};

use scribe_core::{
    ContentSource, Error, IngestRequest, IngestResponse, NewContentSource, Result,
    TranscriptSource,
};
use scribe_db::Database;

use crate::adapters::youtube::extract_video_id;

pub const MESSAGE_CREATED: &str = "Content ingested, jobs queued";
pub const MESSAGE_EXISTS: &str = "Content already exists";

pub struct Ingestor {
    db: Database,
    transcripts: Arc<dyn TranscriptSource>,
}

impl Ingestor {
    pub fn new(db: Database, transcripts: Arc<dyn TranscriptSource>) -> Self {
        Self { db, transcripts }
    }

    /// Ingest `request.link` for `user_id`.
    ///
    /// A link the user already ingested is not fetched again: the existing
    /// source is touched and returned with no new jobs. The source and its
    /// jobs are written in one transaction, so errors here leave nothing
    /// behind in the ledger. A concurrent ingest of the same link that wins
    /// the insert turns this call into the already-exists answer.
    #[instrument(skip(self, request), fields(user_id = %user_id, link = %request.link))]
    pub async fn ingest(&self, user_id: &str, request: IngestRequest) -> Result<IngestResponse> {
        let link = request.link.trim().to_string();
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id is required".to_string()));
        }
        if link.is_empty() {
            return Err(Error::InvalidInput("link is required".to_string()));
        }

        let requested = request.requested_jobs();
        if requested.is_empty() {
            return Err(Error::InvalidInput(
                "at least one artifact type must be requested".to_string(),
            ));
        }
        if extract_video_id(&link).is_none() {
            return Err(Error::InvalidInput(format!("not a YouTube link: {}", link)));
        }

        if let Some(existing) = self.db.contents.find_by_link(user_id, &link).await? {
            return self.existing(existing).await;
        }

        let transcript = self.transcripts.fetch(&link).await?;
        if transcript.text.trim().is_empty() {
            return Err(Error::TranscriptUnavailable(format!(
                "empty transcript for {}",
                link
            )));
        }

        let inserted = self
            .db
            .contents
            .insert_with_jobs(
                NewContentSource {
                    user_id: user_id.to_string(),
                    link: link.clone(),
                    title: request
                        .title
                        .clone()
                        .filter(|t| !t.trim().is_empty())
                        .unwrap_or_else(|| link.clone()),
                    raw_text: transcript.text,
                    tags: request.tags.clone(),
                },
                requested,
            )
            .await;
        let (content, jobs) = match inserted {
            Ok(created) => created,
            Err(Error::Conflict(reason)) => {
                match self.db.contents.find_by_link(user_id, &link).await? {
                    Some(existing) => return self.existing(existing).await,
                    None => return Err(Error::Conflict(reason)),
                }
            }
            Err(e) => return Err(e),
        };
        let job_ids: Vec<_> = jobs.iter().map(|j| j.id).collect();

        info!(
            subsystem = "jobs",
            component = "ingest",
            op = "ingest",
            content_id = %content.id,
            transcript_method = %transcript.method,
            job_count = job_ids.len(),
            "Content ingested"
        );

        Ok(IngestResponse {
            message: MESSAGE_CREATED.to_string(),
            content_id: content.id,
            job_ids,
        })
    }

    async fn existing(&self, existing: ContentSource) -> Result<IngestResponse> {
        self.db.contents.touch(existing.id).await?;
        info!(
            subsystem = "jobs",
            component = "ingest",
            op = "dedupe",
            content_id = %existing.id,
            "Link already ingested"
        );
        Ok(IngestResponse {
            message: MESSAGE_EXISTS.to_string(),
            content_id: existing.id,
            job_ids: Vec::new(),
        })
    }
}
