//! Dispatch of claimed jobs to the handler registered for their context.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use scribe_core::{CommentSource, Job, JobContext, SocialPlatform};
use scribe_db::Database;

use crate::handler::{HandlerContext, JobHandler, JobResult};
use crate::pipeline::Pipeline;
use crate::routines::{BlogRoutine, IdeasRoutine, SentimentRoutine, SocialRoutine};

/// Maps each job context to exactly one handler.
#[derive(Clone, Default)]
pub struct Router {
    handlers: Arc<RwLock<HashMap<JobContext, Arc<dyn JobHandler>>>>,
}

impl Router {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with every built-in routine registered.
    pub async fn standard(
        db: Database,
        pipeline: Pipeline,
        comments: Arc<dyn CommentSource>,
    ) -> Self {
        let router = Self::new();
        router
            .register(BlogRoutine::new(db.clone(), pipeline.clone()))
            .await;
        for platform in [
            SocialPlatform::Twitter,
            SocialPlatform::Reddit,
            SocialPlatform::LinkedIn,
            SocialPlatform::Facebook,
        ] {
            router
                .register(SocialRoutine::new(platform, db.clone(), pipeline.clone()))
                .await;
        }
        router
            .register(SentimentRoutine::new(
                db.clone(),
                pipeline.clone(),
                comments.clone(),
            ))
            .await;
        router
            .register(IdeasRoutine::new(db, pipeline, comments))
            .await;
        router
    }

    /// Register a handler, replacing any previous one for its context.
    pub async fn register<H: JobHandler + 'static>(&self, handler: H) {
        let context = handler.context();
        self.handlers.write().await.insert(context, Arc::new(handler));
        debug!(%context, "Registered job handler");
    }

    /// Contexts that currently have a handler.
    pub async fn contexts(&self) -> Vec<JobContext> {
        let handlers = self.handlers.read().await;
        JobContext::ALL
            .into_iter()
            .filter(|c| handlers.contains_key(c))
            .collect()
    }

    /// Run `job` through the handler for its context.
    ///
    /// A context without a handler fails the job.
    pub async fn process(&self, job: Job) -> JobResult {
        let context = job.context;
        let handler = self.handlers.read().await.get(&context).cloned();

        match handler {
            Some(handler) => handler.execute(HandlerContext::new(job)).await,
            None => {
                warn!(%context, job_id = %job.id, "No handler registered for job context");
                JobResult::Failed(format!("No handler registered for context: {}", context))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use scribe_core::JobStatus;
    use serde_json::json;
    use uuid::Uuid;

    struct FixedHandler(JobContext);

    #[async_trait]
    impl JobHandler for FixedHandler {
        fn context(&self) -> JobContext {
            self.0
        }

        async fn execute(&self, _ctx: HandlerContext) -> JobResult {
            JobResult::Success(Some(json!({ "handled_by": self.0.as_str() })))
        }
    }

    fn job(context: JobContext) -> Job {
        Job {
            id: Uuid::new_v4(),
            content_id: Uuid::new_v4(),
            user_id: "u".into(),
            status: JobStatus::InProgress,
            context,
            completed: false,
            metadata: json!({}),
            error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_by_context() {
        let router = Router::new();
        router.register(FixedHandler(JobContext::Blog)).await;
        router.register(FixedHandler(JobContext::RedditPost)).await;

        match router.process(job(JobContext::RedditPost)).await {
            JobResult::Success(Some(meta)) => assert_eq!(meta["handled_by"], "reddit_post"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(
            router.contexts().await,
            vec![JobContext::Blog, JobContext::RedditPost]
        );
    }

    #[tokio::test]
    async fn test_missing_handler_fails() {
        let router = Router::new();
        let result = router.process(job(JobContext::FacebookPost)).await;
        match result {
            JobResult::Failed(msg) => assert!(msg.contains("facebook_post")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
