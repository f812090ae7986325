//! Video idea generation from viewer comments.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use scribe_core::{
    defaults, ArtifactBody, CommentSource, Error, Job, JobContext, NewArtifact, Result,
    VideoIdeas,
};
use scribe_db::Database;

use crate::chunker::batch_comments;
use crate::handler::{HandlerContext, JobHandler, JobResult};
use crate::pipeline::Pipeline;
use crate::prompts;

use super::{comments_for, dedupe_capped};

#[derive(Debug, Deserialize)]
struct IdeasReply {
    #[serde(default)]
    ideas: Vec<String>,
}

pub struct IdeasRoutine {
    db: Database,
    pipeline: Pipeline,
    comments: Arc<dyn CommentSource>,
}

impl IdeasRoutine {
    pub fn new(db: Database, pipeline: Pipeline, comments: Arc<dyn CommentSource>) -> Self {
        Self {
            db,
            pipeline,
            comments,
        }
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, content_id = %job.content_id))]
    pub async fn run(&self, job: &Job) -> Result<JsonValue> {
        let comments = comments_for(&self.db, self.comments.as_ref(), job).await?;
        if comments.is_empty() {
            info!(
                subsystem = "jobs",
                component = "ideas",
                op = "generate",
                "No comments to draw ideas from, skipping"
            );
            return Ok(json!({ "skipped": true, "reason": "no_comments" }));
        }

        let budget = self.pipeline.config().chunk_policy.max_tokens;
        let batches = batch_comments(self.pipeline.tokenizer(), &comments, budget);

        let mut candidates = Vec::new();
        for batch in &batches {
            let reply: IdeasReply = self
                .pipeline
                .complete_json(prompts::COMMENTS_SYSTEM, &prompts::ideas_batch(batch))
                .await?;
            candidates.extend(reply.ideas);
        }

        let ideas = if batches.len() == 1 {
            dedupe_capped(candidates, defaults::IDEAS_MAX)
        } else {
            let candidates = dedupe_capped(candidates, usize::MAX);
            let reply: IdeasReply = self
                .pipeline
                .complete_json(
                    prompts::COMMENTS_SYSTEM,
                    &prompts::ideas_aggregate(&candidates),
                )
                .await?;
            dedupe_capped(reply.ideas, defaults::IDEAS_AGGREGATE_MAX)
        };

        if ideas.is_empty() {
            return Err(Error::Inference("Model returned no video ideas".to_string()));
        }

        let count = ideas.len();
        let artifact = self
            .db
            .artifacts
            .insert(NewArtifact {
                content_id: job.content_id,
                job_id: Some(job.id),
                body: ArtifactBody::Ideas(VideoIdeas::new(ideas)),
            })
            .await?;

        info!(
            subsystem = "jobs",
            component = "ideas",
            op = "generate",
            comment_count = comments.len(),
            batch_count = batches.len(),
            idea_count = count,
            "Video ideas stored"
        );

        Ok(json!({
            "artifact_id": artifact.id,
            "idea_count": count,
        }))
    }
}

#[async_trait]
impl JobHandler for IdeasRoutine {
    fn context(&self) -> JobContext {
        JobContext::CommentIdeaGeneration
    }

    async fn execute(&self, ctx: HandlerContext) -> JobResult {
        self.run(&ctx.job).await.into()
    }
}
