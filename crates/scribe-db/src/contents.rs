//! Content source repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use scribe_core::{
    new_v7, ArtifactSlot, ContentRepository, ContentSource, Error, Job, JobContext,
    ListContentsRequest, NewContentSource, NewJob, Result,
};

use crate::jobs::PgJobRepository;

const CONTENT_COLUMNS: &str = "id, user_id, link, title, raw_text, blog_ids, social_ids, tags, \
                               is_active, created_at, updated_at";

/// PostgreSQL implementation of ContentRepository.
pub struct PgContentRepository {
    pool: Pool<Postgres>,
}

impl PgContentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_content_row(row: sqlx::postgres::PgRow) -> ContentSource {
        ContentSource {
            id: row.get("id"),
            user_id: row.get("user_id"),
            link: row.get("link"),
            title: row.get("title"),
            raw_text: row.get("raw_text"),
            blog_ids: row.get("blog_ids"),
            social_ids: row.get("social_ids"),
            tags: row.get("tags"),
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    async fn insert_content<'e, E>(executor: E, req: &NewContentSource) -> Result<ContentSource>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO content_sources (id, user_id, link, title, raw_text, tags, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
             RETURNING {CONTENT_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(&req.user_id)
        .bind(&req.link)
        .bind(&req.title)
        .bind(&req.raw_text)
        .bind(&req.tags)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::Conflict(format!("content already exists for link {}", req.link))
            }
            other => Error::Database(other),
        })?;

        Ok(Self::parse_content_row(row))
    }
}

/// `UPDATE` appending `$2` to the slot's id array of source `$1`.
pub(crate) fn append_artifacts_sql(slot: ArtifactSlot) -> &'static str {
    match slot {
        ArtifactSlot::Blog => {
            "UPDATE content_sources SET blog_ids = blog_ids || $2, updated_at = $3 WHERE id = $1"
        }
        ArtifactSlot::Social => {
            "UPDATE content_sources SET social_ids = social_ids || $2, updated_at = $3 WHERE id = $1"
        }
    }
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn insert(&self, req: NewContentSource) -> Result<ContentSource> {
        Self::insert_content(&self.pool, &req).await
    }

    async fn insert_with_jobs(
        &self,
        req: NewContentSource,
        jobs: Vec<(JobContext, JsonValue)>,
    ) -> Result<(ContentSource, Vec<Job>)> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let content = Self::insert_content(&mut *tx, &req).await?;

        let mut created = Vec::with_capacity(jobs.len());
        for (context, metadata) in jobs {
            let job = NewJob {
                content_id: content.id,
                user_id: content.user_id.clone(),
                context,
                metadata,
            };
            // Dropping the transaction on error rolls back the source too.
            created.push(PgJobRepository::insert_job(&mut *tx, &job).await?);
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok((content, created))
    }

    async fn get(&self, id: Uuid) -> Result<Option<ContentSource>> {
        let row = sqlx::query(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_sources WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_content_row))
    }

    async fn find_by_link(&self, user_id: &str, link: &str) -> Result<Option<ContentSource>> {
        let row = sqlx::query(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_sources
             WHERE user_id = $1 AND link = $2 AND is_active
             LIMIT 1"
        ))
        .bind(user_id)
        .bind(link)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(Self::parse_content_row))
    }

    async fn touch(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE content_sources SET updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ContentNotFound(id));
        }
        Ok(())
    }

    async fn append_artifacts(&self, id: Uuid, slot: ArtifactSlot, ids: &[Uuid]) -> Result<()> {
        let result = sqlx::query(append_artifacts_sql(slot))
            .bind(id)
            .bind(ids)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::ContentNotFound(id));
        }
        Ok(())
    }

    async fn list(&self, req: ListContentsRequest) -> Result<(Vec<ContentSource>, i64)> {
        let rows = sqlx::query(&format!(
            "SELECT {CONTENT_COLUMNS} FROM content_sources
             WHERE user_id = $1 AND is_active
             ORDER BY created_at DESC, id DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(&req.user_id)
        .bind(req.limit)
        .bind(req.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content_sources WHERE user_id = $1 AND is_active",
        )
        .bind(&req.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok((rows.into_iter().map(Self::parse_content_row).collect(), total))
    }
}
