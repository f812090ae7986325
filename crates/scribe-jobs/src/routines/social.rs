//! Social post generation for every supported platform.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use scribe_core::{
    defaults, ArtifactBody, ArtifactSlot, Error, Job, JobContext, NewArtifact, Result,
    SocialArtifact, SocialPlatform, SocialPost,
};
use scribe_db::Database;

use crate::handler::{HandlerContext, JobHandler, JobResult};
use crate::pipeline::Pipeline;
use crate::prompts;

use super::load_source;

#[derive(Debug, Deserialize)]
struct PostsReply {
    #[serde(default)]
    posts: Vec<SocialPost>,
}

/// Generates `count` posts for one platform.
pub struct SocialRoutine {
    platform: SocialPlatform,
    db: Database,
    pipeline: Pipeline,
}

impl SocialRoutine {
    pub fn new(platform: SocialPlatform, db: Database, pipeline: Pipeline) -> Self {
        Self {
            platform,
            db,
            pipeline,
        }
    }

    pub fn platform(&self) -> SocialPlatform {
        self.platform
    }

    #[instrument(skip(self, job), fields(job_id = %job.id, platform = self.platform.display_name()))]
    pub async fn run(&self, job: &Job) -> Result<JsonValue> {
        let count = job.requested_count().min(defaults::SOCIAL_POST_COUNT_MAX);
        let (_, text) = load_source(&self.db, job.content_id).await?;

        let summary = self.pipeline.condense(&text).await?;
        let reply: PostsReply = self
            .pipeline
            .complete_json(
                prompts::SOCIAL_SYSTEM,
                &prompts::social_posts(self.platform, &summary, count),
            )
            .await?;

        let mut posts: Vec<SocialPost> = reply
            .posts
            .into_iter()
            .filter(|p| !p.content.trim().is_empty())
            .collect();
        if posts.len() < count as usize {
            return Err(Error::Inference(format!(
                "Model returned {} usable {} posts, {} requested",
                posts.len(),
                self.platform.display_name(),
                count
            )));
        }
        posts.truncate(count as usize);

        let new_artifacts = posts
            .into_iter()
            .map(|post| NewArtifact {
                content_id: job.content_id,
                job_id: Some(job.id),
                body: ArtifactBody::Social(SocialArtifact {
                    platform: self.platform,
                    post,
                }),
            })
            .collect();
        let artifacts = self
            .db
            .artifacts
            .insert_linked(job.content_id, ArtifactSlot::Social, new_artifacts)
            .await?;
        let ids: Vec<_> = artifacts.iter().map(|a| a.id).collect();

        info!(
            subsystem = "jobs",
            component = "social",
            op = "generate",
            requested = count,
            created = ids.len(),
            "Social posts generated"
        );

        Ok(json!({
            "artifact_ids": ids,
            "posts_created": ids.len(),
        }))
    }
}

#[async_trait]
impl JobHandler for SocialRoutine {
    fn context(&self) -> JobContext {
        self.platform.context()
    }

    async fn execute(&self, ctx: HandlerContext) -> JobResult {
        self.run(&ctx.job).await.into()
    }
}
