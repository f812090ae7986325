//! Blog post generation.
//!
//! condense → outline → full post (outline as input) → parse → persist.

use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use scribe_core::{
    ArtifactBody, ArtifactSlot, BlogPost, Error, Job, JobContext, NewArtifact, Result,
};
use scribe_db::Database;

use crate::handler::{HandlerContext, JobHandler, JobResult};
use crate::pipeline::Pipeline;
use crate::prompts;

use super::load_source;

pub struct BlogRoutine {
    db: Database,
    pipeline: Pipeline,
}

impl BlogRoutine {
    pub fn new(db: Database, pipeline: Pipeline) -> Self {
        Self { db, pipeline }
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, content_id = %job.content_id))]
    pub async fn run(&self, job: &Job) -> Result<JsonValue> {
        let start = Instant::now();
        let (_, text) = load_source(&self.db, job.content_id).await?;

        let summary = self.pipeline.condense(&text).await?;
        let outline = self
            .pipeline
            .complete(prompts::BLOG_SYSTEM, &prompts::blog_outline(&summary))
            .await?;
        let post: BlogPost = self
            .pipeline
            .complete_json(prompts::BLOG_SYSTEM, &prompts::blog_post(&summary, &outline))
            .await?;

        if post.title.trim().is_empty() && post.sections.is_empty() {
            return Err(Error::Serialization(
                "Model returned an empty blog post".to_string(),
            ));
        }

        let title = post.title.clone();
        let section_count = post.sections.len();
        let stored = self
            .db
            .artifacts
            .insert_linked(
                job.content_id,
                ArtifactSlot::Blog,
                vec![NewArtifact {
                    content_id: job.content_id,
                    job_id: Some(job.id),
                    body: ArtifactBody::Blog(post),
                }],
            )
            .await?;
        let artifact = stored
            .into_iter()
            .next()
            .ok_or_else(|| Error::Internal("blog artifact was not stored".to_string()))?;

        info!(
            subsystem = "jobs",
            component = "blog",
            op = "generate",
            artifact_id = %artifact.id,
            sections = section_count,
            duration_ms = start.elapsed().as_millis() as u64,
            "Blog post generated"
        );

        Ok(json!({
            "artifact_id": artifact.id,
            "title": title,
            "sections": section_count,
        }))
    }
}

#[async_trait]
impl JobHandler for BlogRoutine {
    fn context(&self) -> JobContext {
        JobContext::Blog
    }

    async fn execute(&self, ctx: HandlerContext) -> JobResult {
        self.run(&ctx.job).await.into()
    }
}
