//! Job handlers, one per job context.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use scribe_core::{Error, Job, JobContext};

/// Context provided to job handlers.
pub struct HandlerContext {
    /// The claimed job being processed.
    pub job: Job,
}

impl HandlerContext {
    pub fn new(job: Job) -> Self {
        Self { job }
    }

    pub fn job_id(&self) -> Uuid {
        self.job.id
    }

    pub fn content_id(&self) -> Uuid {
        self.job.content_id
    }

    pub fn metadata(&self) -> &JsonValue {
        &self.job.metadata
    }
}

/// Result of job execution.
///
/// Handlers never write terminal job state themselves; the scheduler turns
/// this value into the ledger transition.
#[derive(Debug)]
pub enum JobResult {
    /// Job completed successfully with optional result metadata.
    Success(Option<JsonValue>),
    /// The transformation itself failed.
    Failed(String),
    /// An infrastructure dependency failed (store, network, configuration).
    Fatal(String),
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success(_))
    }

    /// Error message for failed outcomes.
    pub fn error(&self) -> Option<&str> {
        match self {
            JobResult::Success(_) => None,
            JobResult::Failed(e) | JobResult::Fatal(e) => Some(e),
        }
    }
}

impl From<Error> for JobResult {
    fn from(err: Error) -> Self {
        if err.is_infrastructure() {
            JobResult::Fatal(err.to_string())
        } else {
            JobResult::Failed(err.to_string())
        }
    }
}

impl From<scribe_core::Result<JsonValue>> for JobResult {
    fn from(res: scribe_core::Result<JsonValue>) -> Self {
        match res {
            Ok(meta) => JobResult::Success(Some(meta)),
            Err(e) => e.into(),
        }
    }
}

/// Trait for job handlers.
#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The job context this handler processes.
    fn context(&self) -> JobContext;

    /// Execute the job.
    async fn execute(&self, ctx: HandlerContext) -> JobResult;

    /// Check if this handler can process the given context.
    fn can_handle(&self, context: JobContext) -> bool {
        self.context() == context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use scribe_core::JobStatus;
    use serde_json::json;

    struct EchoHandler;

    #[async_trait]
    impl JobHandler for EchoHandler {
        fn context(&self) -> JobContext {
            JobContext::Blog
        }

        async fn execute(&self, ctx: HandlerContext) -> JobResult {
            JobResult::Success(Some(ctx.metadata().clone()))
        }
    }

    fn job() -> Job {
        Job {
            id: Uuid::new_v4(),
            content_id: Uuid::new_v4(),
            user_id: "u".into(),
            status: JobStatus::InProgress,
            context: JobContext::Blog,
            completed: false,
            metadata: json!({"count": 2}),
            error: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_handler_dispatch_basics() {
        let handler = EchoHandler;
        assert!(handler.can_handle(JobContext::Blog));
        assert!(!handler.can_handle(JobContext::TwitterPost));

        let ctx = HandlerContext::new(job());
        let result = handler.execute(ctx).await;
        assert!(matches!(result, JobResult::Success(Some(ref m)) if m["count"] == 2));
    }

    #[test]
    fn test_error_classification() {
        let r: JobResult = Error::Inference("bad".into()).into();
        assert!(matches!(r, JobResult::Failed(_)));

        let r: JobResult = Error::Request("refused".into()).into();
        assert!(matches!(r, JobResult::Fatal(_)));
        assert!(r.error().unwrap().contains("refused"));
    }

    #[test]
    fn test_from_result() {
        let ok: JobResult = Ok::<_, Error>(json!({"a": 1})).into();
        assert!(ok.is_success());
        assert!(ok.error().is_none());
    }
}
