//! Job ledger repository implementation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use scribe_core::{new_v7, Error, Job, JobContext, JobOutcome, JobRepository, NewJob, Result};

use crate::metadata_patch;

const JOB_COLUMNS: &str =
    "id, content_id, user_id, status, context, completed, metadata, error, created_at, updated_at";

/// PostgreSQL implementation of JobRepository.
pub struct PgJobRepository {
    pool: Pool<Postgres>,
}

impl PgJobRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Parse a job row into a Job struct.
    fn parse_job_row(row: sqlx::postgres::PgRow) -> Result<Job> {
        let status: String = row.get("status");
        let context: String = row.get("context");
        Ok(Job {
            id: row.get("id"),
            content_id: row.get("content_id"),
            user_id: row.get("user_id"),
            status: status.parse()?,
            context: context.parse()?,
            completed: row.get("completed"),
            metadata: row.get("metadata"),
            error: row.get("error"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    pub(crate) async fn insert_job<'e, E>(executor: E, job: &NewJob) -> Result<Job>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO content_jobs (id, content_id, user_id, status, context, completed, metadata, created_at, updated_at)
             VALUES ($1, $2, $3, 'pending', $4, FALSE, $5, $6, $6)
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(job.content_id)
        .bind(&job.user_id)
        .bind(job.context.as_str())
        .bind(metadata_patch(job.metadata.clone()))
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(Error::Database)?;

        Self::parse_job_row(row)
    }
}

#[async_trait]
impl JobRepository for PgJobRepository {
    async fn create(
        &self,
        content_id: Uuid,
        user_id: &str,
        context: JobContext,
        metadata: JsonValue,
    ) -> Result<Job> {
        let job = NewJob {
            content_id,
            user_id: user_id.to_string(),
            context,
            metadata,
        };
        Self::insert_job(&self.pool, &job).await
    }

    async fn create_many(&self, jobs: Vec<NewJob>) -> Result<Vec<Job>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut created = Vec::with_capacity(jobs.len());
        for job in &jobs {
            created.push(Self::insert_job(&mut *tx, job).await?);
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(created)
    }

    async fn claim_next_pending(&self) -> Result<Option<Job>> {
        let now = Utc::now();

        // SKIP LOCKED keeps a second process from claiming the same row even
        // though only one scheduler per ledger is supported.
        let row = sqlx::query(&format!(
            "UPDATE content_jobs
             SET status = 'in_progress', updated_at = $1
             WHERE id = (
                 SELECT id FROM content_jobs
                 WHERE status = 'pending' AND completed = FALSE
                 ORDER BY created_at ASC, seq ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_job_row).transpose()
    }

    async fn finalize(&self, job_id: Uuid, outcome: JobOutcome) -> Result<bool> {
        let now = Utc::now();
        let result = match outcome {
            JobOutcome::Success(metadata) => {
                sqlx::query(
                    "UPDATE content_jobs
                     SET status = 'completed', completed = TRUE,
                         metadata = metadata || $2, error = NULL, updated_at = $3
                     WHERE id = $1 AND status = 'in_progress'",
                )
                .bind(job_id)
                .bind(metadata_patch(metadata))
                .bind(now)
                .execute(&self.pool)
                .await
            }
            JobOutcome::Failure(error) => {
                sqlx::query(
                    "UPDATE content_jobs
                     SET status = 'failed', error = $2, updated_at = $3
                     WHERE id = $1 AND status = 'in_progress'",
                )
                .bind(job_id)
                .bind(error)
                .bind(now)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        let transitioned = result.rows_affected() > 0;
        if !transitioned {
            debug!(
                subsystem = "db",
                component = "jobs",
                op = "finalize",
                job_id = %job_id,
                "Job not in progress, finalize ignored"
            );
        }
        Ok(transitioned)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Job>> {
        let row = sqlx::query(&format!("SELECT {JOB_COLUMNS} FROM content_jobs WHERE id = $1"))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_job_row).transpose()
    }

    async fn list_for_content(&self, content_id: Uuid) -> Result<Vec<Job>> {
        let rows = sqlx::query(&format!(
            "SELECT {JOB_COLUMNS} FROM content_jobs
             WHERE content_id = $1
             ORDER BY created_at ASC, seq ASC"
        ))
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(Self::parse_job_row).collect()
    }

    async fn pending_count(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM content_jobs WHERE status = 'pending' AND completed = FALSE",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)
    }

    async fn requeue_stale(&self, lease: Duration) -> Result<u64> {
        let now = Utc::now();
        let lease = chrono::Duration::from_std(lease)
            .map_err(|e| Error::InvalidInput(format!("lease out of range: {}", e)))?;

        let result = sqlx::query(
            "UPDATE content_jobs
             SET status = 'pending', updated_at = $1
             WHERE status = 'in_progress' AND updated_at < $2",
        )
        .bind(now)
        .bind(now - lease)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(result.rows_affected())
    }
}
