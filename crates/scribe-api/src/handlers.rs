//! Thin HTTP shell over the ingestor, the ledger and the scheduler.
//!
//! The caller is identified by the `x-user-id` header; authentication is
//! expected to happen in front of this service.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use scribe_core::{defaults, IngestRequest, ListContentsRequest};
use scribe_jobs::TickOutcome;

use crate::context::AppContext;
use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";

const MAX_PAGE_LIMIT: i64 = 100;

fn user_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", USER_HEADER)))
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `POST /api/v1/contents`
///
/// 201 with the queued job ids for a new link, 200 when the link was already
/// ingested by this user.
pub async fn ingest_content(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(request): Json<IngestRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    let response = ctx.ingestor.ingest(&user, request).await?;
    let status = if response.job_ids.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct ListContentsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// `GET /api/v1/contents`
pub async fn list_contents(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Query(query): Query<ListContentsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    let response = ctx
        .db
        .list_contents_with_jobs(ListContentsRequest {
            user_id: user,
            limit: query
                .limit
                .unwrap_or(defaults::PAGE_LIMIT)
                .clamp(1, MAX_PAGE_LIMIT),
            offset: query.offset.unwrap_or(0).max(0),
        })
        .await?;
    Ok(Json(response))
}

/// `GET /api/v1/contents/:id`
pub async fn get_content(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    match ctx.db.content_with_jobs(id).await? {
        Some(found) if found.content.user_id == user => Ok(Json(found)),
        _ => Err(ApiError::NotFound(format!("content {}", id))),
    }
}

#[derive(Debug, Deserialize)]
pub struct ArtifactsQuery {
    pub kind: Option<String>,
}

/// `GET /api/v1/contents/:id/artifacts?kind=`
pub async fn list_artifacts(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Query(query): Query<ArtifactsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    match ctx.db.contents.get(id).await? {
        Some(content) if content.user_id == user => {}
        _ => return Err(ApiError::NotFound(format!("content {}", id))),
    }

    let kind = query.kind.as_deref().filter(|k| !k.is_empty());
    let artifacts = ctx.db.artifacts.list_for_content(id, kind).await?;
    Ok(Json(artifacts))
}

/// `GET /api/v1/jobs/:id`
pub async fn get_job(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = user_id(&headers)?;
    match ctx.db.jobs.get(id).await? {
        Some(job) if job.user_id == user => Ok(Json(job)),
        _ => Err(ApiError::NotFound(format!("job {}", id))),
    }
}

/// `POST /api/v1/scheduler/tick`
///
/// Runs one tick inline. Useful when the background loop is disabled.
pub async fn run_tick(State(ctx): State<AppContext>) -> Result<impl IntoResponse, ApiError> {
    let body = match ctx.scheduler.tick().await? {
        TickOutcome::Idle => json!({ "outcome": "idle" }),
        TickOutcome::Skipped => json!({ "outcome": "skipped" }),
        TickOutcome::Completed(job_id) => json!({ "outcome": "completed", "job_id": job_id }),
        TickOutcome::Failed(job_id) => json!({ "outcome": "failed", "job_id": job_id }),
    };
    Ok(Json(body))
}

/// `GET /api/v1/scheduler`
pub async fn scheduler_status(
    State(ctx): State<AppContext>,
) -> Result<impl IntoResponse, ApiError> {
    let pending = ctx.scheduler.pending_count().await?;
    Ok(Json(json!({
        "running": ctx.scheduler.is_running(),
        "pending_jobs": pending,
        "interval_ms": ctx.scheduler.config().interval_ms,
    })))
}
