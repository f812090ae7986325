//! Artifact repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use scribe_core::{
    new_v7, Artifact, ArtifactRepository, ArtifactSlot, Error, NewArtifact, Result,
};

use crate::contents::append_artifacts_sql;

const ARTIFACT_COLUMNS: &str = "id, content_id, job_id, body, is_active, created_at, updated_at";

/// PostgreSQL implementation of ArtifactRepository.
pub struct PgArtifactRepository {
    pool: Pool<Postgres>,
}

impl PgArtifactRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn parse_artifact_row(row: sqlx::postgres::PgRow) -> Result<Artifact> {
        let body: JsonValue = row.get("body");
        Ok(Artifact {
            id: row.get("id"),
            content_id: row.get("content_id"),
            job_id: row.get("job_id"),
            body: serde_json::from_value(body)?,
            is_active: row.get("is_active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    async fn insert_artifact<'e, E>(executor: E, req: &NewArtifact) -> Result<Artifact>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO artifacts (id, content_id, job_id, kind, body, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
             RETURNING {ARTIFACT_COLUMNS}"
        ))
        .bind(new_v7())
        .bind(req.content_id)
        .bind(req.job_id)
        .bind(req.body.kind())
        .bind(serde_json::to_value(&req.body)?)
        .bind(now)
        .fetch_one(executor)
        .await
        .map_err(Error::Database)?;

        Self::parse_artifact_row(row)
    }
}

#[async_trait]
impl ArtifactRepository for PgArtifactRepository {
    async fn insert(&self, req: NewArtifact) -> Result<Artifact> {
        Self::insert_artifact(&self.pool, &req).await
    }

    async fn insert_many(&self, reqs: Vec<NewArtifact>) -> Result<Vec<Artifact>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut stored = Vec::with_capacity(reqs.len());
        for req in &reqs {
            // Dropping the transaction on error rolls back earlier inserts.
            stored.push(Self::insert_artifact(&mut *tx, req).await?);
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(stored)
    }

    async fn insert_linked(
        &self,
        content_id: Uuid,
        slot: ArtifactSlot,
        reqs: Vec<NewArtifact>,
    ) -> Result<Vec<Artifact>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut stored = Vec::with_capacity(reqs.len());
        for req in &reqs {
            stored.push(Self::insert_artifact(&mut *tx, req).await?);
        }

        let ids: Vec<Uuid> = stored.iter().map(|a| a.id).collect();
        let result = sqlx::query(append_artifacts_sql(slot))
            .bind(content_id)
            .bind(&ids)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::ContentNotFound(content_id));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Artifact>> {
        let row = sqlx::query(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        row.map(Self::parse_artifact_row).transpose()
    }

    async fn list_for_content(
        &self,
        content_id: Uuid,
        kind: Option<&str>,
    ) -> Result<Vec<Artifact>> {
        let rows = sqlx::query(&format!(
            "SELECT {ARTIFACT_COLUMNS} FROM artifacts
             WHERE content_id = $1 AND is_active AND ($2::text IS NULL OR kind = $2)
             ORDER BY seq ASC"
        ))
        .bind(content_id)
        .bind(kind)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.into_iter().map(Self::parse_artifact_row).collect()
    }
}
