//! In-memory store implementing every repository trait.
//!
//! Backs tests and `STORE=memory` development runs. All state lives behind a
//! single async mutex, so each operation is atomic with respect to the others.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use uuid::Uuid;

use scribe_core::{
    new_v7, Artifact, ArtifactRepository, ArtifactSlot, Comment, CommentRepository, CommentSet,
    ContentRepository, ContentSource, Error, Job, JobContext, JobOutcome, JobRepository,
    JobStatus, ListContentsRequest, NewArtifact, NewContentSource, NewJob, Result,
};

use crate::metadata_patch;

#[derive(Default)]
struct State {
    contents: Vec<ContentSource>,
    jobs: Vec<Job>,
    comments: Vec<CommentSet>,
    artifacts: Vec<Artifact>,
}

/// In-memory implementation of the content, job, comment and artifact repositories.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    unavailable: AtomicBool,
    fail_job_inserts: AtomicBool,
    fail_artifact_links: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a database outage: while set, every operation fails with a
    /// database error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    /// While set, creating jobs fails with a database error, including the
    /// job half of [`ContentRepository::insert_with_jobs`].
    pub fn set_fail_job_inserts(&self, fail: bool) {
        self.fail_job_inserts.store(fail, Ordering::SeqCst);
    }

    /// While set, linking artifacts to their content source fails with a
    /// database error.
    pub fn set_fail_artifact_links(&self, fail: bool) {
        self.fail_artifact_links.store(fail, Ordering::SeqCst);
    }

    fn check_job_inserts(&self) -> Result<()> {
        if self.fail_job_inserts.load(Ordering::SeqCst) {
            Err(Error::Database(sqlx::Error::WorkerCrashed))
        } else {
            Ok(())
        }
    }

    fn check_artifact_links(&self) -> Result<()> {
        if self.fail_artifact_links.load(Ordering::SeqCst) {
            Err(Error::Database(sqlx::Error::WorkerCrashed))
        } else {
            Ok(())
        }
    }

    /// Total artifacts stored, regardless of content source.
    pub async fn artifact_count(&self) -> usize {
        self.state.lock().await.artifacts.len()
    }

    /// Overwrite a job's `updated_at`, for exercising lease expiry.
    pub async fn backdate_job(&self, job_id: Uuid, by: Duration) {
        let mut state = self.state.lock().await;
        if let Some(job) = state.jobs.iter_mut().find(|j| j.id == job_id) {
            if let Ok(by) = chrono::Duration::from_std(by) {
                job.updated_at -= by;
            }
        }
    }

    fn build_content(state: &State, req: NewContentSource) -> Result<ContentSource> {
        if state
            .contents
            .iter()
            .any(|c| c.is_active && c.user_id == req.user_id && c.link == req.link)
        {
            return Err(Error::Conflict(format!(
                "content already exists for link {}",
                req.link
            )));
        }

        let now = Utc::now();
        Ok(ContentSource {
            id: new_v7(),
            user_id: req.user_id,
            link: req.link,
            title: req.title,
            raw_text: Some(req.raw_text),
            blog_ids: Vec::new(),
            social_ids: Vec::new(),
            tags: req.tags,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    fn build_job(job: NewJob) -> Job {
        let now = Utc::now();
        Job {
            id: new_v7(),
            content_id: job.content_id,
            user_id: job.user_id,
            status: JobStatus::Pending,
            context: job.context,
            completed: false,
            metadata: metadata_patch(job.metadata),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn build_artifact(req: NewArtifact) -> Artifact {
        let now = Utc::now();
        Artifact {
            id: new_v7(),
            content_id: req.content_id,
            job_id: req.job_id,
            body: req.body,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

fn merge_into(base: &mut JsonValue, patch: JsonValue) {
    let patch = metadata_patch(patch);
    if !base.is_object() {
        *base = JsonValue::Object(Default::default());
    }
    if let (Some(base), JsonValue::Object(patch)) = (base.as_object_mut(), patch) {
        for (k, v) in patch {
            base.insert(k, v);
        }
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn insert(&self, req: NewContentSource) -> Result<ContentSource> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let content = Self::build_content(&state, req)?;
        state.contents.push(content.clone());
        Ok(content)
    }

    async fn insert_with_jobs(
        &self,
        req: NewContentSource,
        jobs: Vec<(JobContext, JsonValue)>,
    ) -> Result<(ContentSource, Vec<Job>)> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let content = Self::build_content(&state, req)?;
        self.check_job_inserts()?;

        let created: Vec<Job> = jobs
            .into_iter()
            .map(|(context, metadata)| {
                Self::build_job(NewJob {
                    content_id: content.id,
                    user_id: content.user_id.clone(),
                    context,
                    metadata,
                })
            })
            .collect();
        state.contents.push(content.clone());
        state.jobs.extend(created.iter().cloned());
        Ok((content, created))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContentSource>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.contents.iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_link(&self, user_id: &str, link: &str) -> Result<Option<ContentSource>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .contents
            .iter()
            .find(|c| c.is_active && c.user_id == user_id && c.link == link)
            .cloned())
    }

    async fn touch(&self, id: Uuid) -> Result<()> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let content = state
            .contents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::ContentNotFound(id))?;
        content.updated_at = Utc::now();
        Ok(())
    }

    async fn append_artifacts(&self, id: Uuid, slot: ArtifactSlot, ids: &[Uuid]) -> Result<()> {
        self.check_available()?;
        self.check_artifact_links()?;
        let mut state = self.state.lock().await;
        let content = state
            .contents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(Error::ContentNotFound(id))?;
        match slot {
            ArtifactSlot::Blog => content.blog_ids.extend_from_slice(ids),
            ArtifactSlot::Social => content.social_ids.extend_from_slice(ids),
        }
        content.updated_at = Utc::now();
        Ok(())
    }

    async fn list(&self, req: ListContentsRequest) -> Result<(Vec<ContentSource>, i64)> {
        self.check_available()?;
        let state = self.state.lock().await;
        let mut owned: Vec<&ContentSource> = state
            .contents
            .iter()
            .filter(|c| c.is_active && c.user_id == req.user_id)
            .collect();
        let total = owned.len() as i64;
        // Newest first; later inserts win ties.
        owned.reverse();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let items = owned
            .into_iter()
            .skip(req.offset.max(0) as usize)
            .take(req.limit.max(0) as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn create(
        &self,
        content_id: Uuid,
        user_id: &str,
        context: JobContext,
        metadata: JsonValue,
    ) -> Result<Job> {
        self.check_available()?;
        self.check_job_inserts()?;
        let job = Self::build_job(NewJob {
            content_id,
            user_id: user_id.to_string(),
            context,
            metadata,
        });
        self.state.lock().await.jobs.push(job.clone());
        Ok(job)
    }

    async fn create_many(&self, jobs: Vec<NewJob>) -> Result<Vec<Job>> {
        self.check_available()?;
        self.check_job_inserts()?;
        let created: Vec<Job> = jobs.into_iter().map(Self::build_job).collect();
        self.state.lock().await.jobs.extend(created.iter().cloned());
        Ok(created)
    }

    async fn claim_next_pending(&self) -> Result<Option<Job>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        // Vec position is the insertion sequence.
        let next = state
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| j.status == JobStatus::Pending && !j.completed)
            .min_by_key(|(idx, j)| (j.created_at, *idx))
            .map(|(idx, _)| idx);

        Ok(next.map(|idx| {
            let job = &mut state.jobs[idx];
            job.status = JobStatus::InProgress;
            job.updated_at = Utc::now();
            job.clone()
        }))
    }

    async fn finalize(&self, job_id: Uuid, outcome: JobOutcome) -> Result<bool> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let Some(job) = state.jobs.iter_mut().find(|j| j.id == job_id) else {
            return Ok(false);
        };
        if job.status != JobStatus::InProgress {
            return Ok(false);
        }

        match outcome {
            JobOutcome::Success(metadata) => {
                job.status = JobStatus::Completed;
                job.completed = true;
                job.error = None;
                merge_into(&mut job.metadata, metadata);
            }
            JobOutcome::Failure(error) => {
                job.status = JobStatus::Failed;
                job.error = Some(error);
            }
        }
        job.updated_at = Utc::now();
        Ok(true)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.jobs.iter().find(|j| j.id == id).cloned())
    }

    async fn list_for_content(&self, content_id: Uuid) -> Result<Vec<Job>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .jobs
            .iter()
            .filter(|j| j.content_id == content_id)
            .cloned()
            .collect())
    }

    async fn pending_count(&self) -> Result<i64> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Pending && !j.completed)
            .count() as i64)
    }

    async fn requeue_stale(&self, lease: Duration) -> Result<u64> {
        self.check_available()?;
        let lease = chrono::Duration::from_std(lease)
            .map_err(|e| Error::InvalidInput(format!("lease out of range: {}", e)))?;
        let now = Utc::now();
        let cutoff = now - lease;

        let mut state = self.state.lock().await;
        let mut requeued = 0;
        for job in state
            .jobs
            .iter_mut()
            .filter(|j| j.status == JobStatus::InProgress && j.updated_at < cutoff)
        {
            job.status = JobStatus::Pending;
            job.updated_at = now;
            requeued += 1;
        }
        Ok(requeued)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn find_active(&self, content_id: Uuid) -> Result<Option<CommentSet>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .comments
            .iter()
            .rev()
            .find(|c| c.is_active && c.content_id == content_id)
            .cloned())
    }

    async fn insert(
        &self,
        content_id: Uuid,
        job_id: Option<Uuid>,
        comments: Vec<Comment>,
    ) -> Result<CommentSet> {
        self.check_available()?;
        let now = Utc::now();
        let set = CommentSet {
            id: new_v7(),
            content_id,
            job_id,
            comments,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.comments.push(set.clone());
        Ok(set)
    }
}

#[async_trait]
impl ArtifactRepository for MemoryStore {
    async fn insert(&self, req: NewArtifact) -> Result<Artifact> {
        self.check_available()?;
        let artifact = Self::build_artifact(req);
        self.state.lock().await.artifacts.push(artifact.clone());
        Ok(artifact)
    }

    async fn insert_many(&self, reqs: Vec<NewArtifact>) -> Result<Vec<Artifact>> {
        self.check_available()?;
        let stored: Vec<Artifact> = reqs.into_iter().map(Self::build_artifact).collect();
        self.state
            .lock()
            .await
            .artifacts
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn insert_linked(
        &self,
        content_id: Uuid,
        slot: ArtifactSlot,
        reqs: Vec<NewArtifact>,
    ) -> Result<Vec<Artifact>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let Some(idx) = state.contents.iter().position(|c| c.id == content_id) else {
            return Err(Error::ContentNotFound(content_id));
        };
        self.check_artifact_links()?;

        let stored: Vec<Artifact> = reqs.into_iter().map(Self::build_artifact).collect();
        let ids: Vec<Uuid> = stored.iter().map(|a| a.id).collect();
        let content = &mut state.contents[idx];
        match slot {
            ArtifactSlot::Blog => content.blog_ids.extend_from_slice(&ids),
            ArtifactSlot::Social => content.social_ids.extend_from_slice(&ids),
        }
        content.updated_at = Utc::now();
        state.artifacts.extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Artifact>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state.artifacts.iter().find(|a| a.id == id).cloned())
    }

    async fn list_for_content(
        &self,
        content_id: Uuid,
        kind: Option<&str>,
    ) -> Result<Vec<Artifact>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .artifacts
            .iter()
            .filter(|a| a.is_active && a.content_id == content_id)
            .filter(|a| kind.map_or(true, |k| a.kind() == k))
            .cloned()
            .collect())
    }
}
