//! Comment set repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use scribe_core::{new_v7, Comment, CommentRepository, CommentSet, Error, Result};

/// PostgreSQL implementation of CommentRepository.
pub struct PgCommentRepository {
    pool: Pool<Postgres>,
}

impl PgCommentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_comment_row(row: sqlx::postgres::PgRow) -> Result<CommentSet> {
        let comments: JsonValue = row.get("comments");
        Ok(CommentSet {
            id: row.get("id"),
            content_id: row.get("content_id"),
            job_id: row.get("job_id"),
            comments: serde_json::from_value(comments)?,
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn find_active(&self, content_id: Uuid) -> Result<Option<CommentSet>> {
        let row = sqlx::query(
            "SELECT id, content_id, job_id, comments, is_active, created_at, updated_at
             FROM comment_sets
             WHERE content_id = $1 AND is_active
             ORDER BY created_at DESC
             LIMIT 1",
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_comment_row).transpose()
    }

    async fn insert(
        &self,
        content_id: Uuid,
        job_id: Option<Uuid>,
        comments: Vec<Comment>,
    ) -> Result<CommentSet> {
        let now = Utc::now();
        let row = sqlx::query(
            "INSERT INTO comment_sets (id, content_id, job_id, comments, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, TRUE, $5, $5)
             RETURNING id, content_id, job_id, comments, is_active, created_at, updated_at",
        )
        .bind(new_v7())
        .bind(content_id)
        .bind(job_id)
        .bind(serde_json::to_value(&comments)?)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Self::parse_comment_row(row)
    }
}
