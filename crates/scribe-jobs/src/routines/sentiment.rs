//! Comment sentiment analysis.
//!
//! Comments that fit one token budget are analyzed in a single call. Larger
//! sets are split into batches, each batch is analyzed on its own, the
//! distributions are combined weighted by batch size and a final pass writes
//! the overall summary and re-selects the top examples.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{info, instrument};

use scribe_core::{
    defaults, ArtifactBody, CommentSource, Job, JobContext, NewArtifact, Result,
    SentimentDistribution, SentimentReport,
};
use scribe_db::Database;

use crate::chunker::batch_comments;
use crate::handler::{HandlerContext, JobHandler, JobResult};
use crate::pipeline::Pipeline;
use crate::prompts;

use super::{comments_for, dedupe_capped};

#[derive(Debug, Deserialize)]
struct AggregateReply {
    summary: String,
    #[serde(default)]
    top_positive: Vec<String>,
    #[serde(default)]
    top_negative: Vec<String>,
}

pub struct SentimentRoutine {
    db: Database,
    pipeline: Pipeline,
    comments: Arc<dyn CommentSource>,
}

impl SentimentRoutine {
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
                component = "sentiment",
                op = "analyze",
                "No comments to analyze, skipping"
            );
            return Ok(json!({ "skipped": true, "reason": "no_comments" }));
        }

        let budget = self.pipeline.config().chunk_policy.max_tokens;
        let batches = batch_comments(self.pipeline.tokenizer(), &comments, budget);

        let mut partials = Vec::with_capacity(batches.len());
        for batch in &batches {
            let report: SentimentReport = self
                .pipeline
                .complete_json(prompts::COMMENTS_SYSTEM, &prompts::sentiment_batch(batch))
                .await?;
            partials.push((report, batch.len()));
        }

        let weighted: Vec<(SentimentDistribution, usize)> = partials
            .iter()
            .map(|(report, n)| (report.distribution, *n))
            .collect();
        let distribution = SentimentDistribution::combine(&weighted);

        let (summary, top_positive, top_negative) = if partials.len() == 1 {
            let (report, _) = partials.remove(0);
            (report.summary, report.top_positive, report.top_negative)
        } else {
            let reports: Vec<SentimentReport> = partials.into_iter().map(|(r, _)| r).collect();
            let reply: AggregateReply = self
                .pipeline
                .complete_json(
                    prompts::COMMENTS_SYSTEM,
                    &prompts::sentiment_aggregate(&reports),
                )
                .await?;
            (reply.summary, reply.top_positive, reply.top_negative)
        };

        let report = SentimentReport {
            summary: summary.trim().to_string(),
            distribution,
            top_positive: dedupe_capped(top_positive, defaults::SENTIMENT_TOP_POSITIVE),
            top_negative: dedupe_capped(top_negative, defaults::SENTIMENT_TOP_NEGATIVE),
        };

        let artifact = self
            .db
            .artifacts
            .insert(NewArtifact {
                content_id: job.content_id,
                job_id: Some(job.id),
                body: ArtifactBody::Sentiment(report),
            })
            .await?;

        info!(
            subsystem = "jobs",
            component = "sentiment",
            op = "analyze",
            comment_count = comments.len(),
            batch_count = batches.len(),
            positive = distribution.positive,
            neutral = distribution.neutral,
            negative = distribution.negative,
            "Sentiment analysis stored"
        );

        Ok(json!({
            "artifact_id": artifact.id,
            "comment_count": comments.len(),
            "batch_count": batches.len(),
        }))
    }
}

#[async_trait]
impl JobHandler for SentimentRoutine {
    fn context(&self) -> JobContext {
        JobContext::CommentSentimentAnalysis
    }

    async fn execute(&self, ctx: HandlerContext) -> JobResult {
        self.run(&ctx.job).await.into()
    }
}
