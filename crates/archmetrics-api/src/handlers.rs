use crate::{ApiResult, AppState};
use archmetrics_cache::CacheStats;
use archmetrics_core::{export, ArchitectureDefinition, ExportFormat, RepoStatus, Summary};
use archmetrics_github::Repository;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

const DEFAULT_REPO_LIMIT: u32 = 30;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ArchitectureQuery {
    pub branch: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub branch: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepoListQuery {
    pub limit: Option<u32>,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Token cancelled when the handler future is dropped, e.g. on client disconnect.
fn request_token() -> (CancellationToken, tokio_util::sync::DropGuard) {
    let token = CancellationToken::new();
    let guard = token.clone().drop_guard();
    (token, guard)
}

pub async fn architecture_summary(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    Query(query): Query<ArchitectureQuery>,
) -> ApiResult<Json<Summary>> {
    let key = state.summaries.key(&org, &repo, query.branch, query.path);
    let (cancel, _guard) = request_token();
    Ok(Json(state.summaries.summary(&key, &cancel).await?))
}

pub async fn default_architecture_summary(
    State(state): State<AppState>,
    Query(query): Query<ArchitectureQuery>,
) -> ApiResult<Json<Summary>> {
    let key = state.summaries.default_key(query.branch, query.path);
    let (cancel, _guard) = request_token();
    Ok(Json(state.summaries.summary(&key, &cancel).await?))
}

pub async fn architecture_repos(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    Query(query): Query<ArchitectureQuery>,
) -> ApiResult<Json<Vec<RepoStatus>>> {
    let key = state.summaries.key(&org, &repo, query.branch, query.path);
    let (cancel, _guard) = request_token();
    Ok(Json(state.summaries.repo_statuses(&key, &cancel).await?))
}

pub async fn get_architecture(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    Query(query): Query<ArchitectureQuery>,
) -> ApiResult<Json<ArchitectureDefinition>> {
    let key = state.summaries.key(&org, &repo, query.branch, query.path);
    let adf = state.summaries.architecture(&key).await?;
    Ok(Json(ArchitectureDefinition::clone(&adf)))
}

pub async fn export_architecture(
    State(state): State<AppState>,
    Path((org, repo)): Path<(String, String)>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let format: ExportFormat = query.format.as_deref().unwrap_or("json").parse()?;
    let key = state.summaries.key(&org, &repo, query.branch, query.path);
    let adf = state.summaries.architecture(&key).await?;
    let body = export(&adf, format)?;
    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}

pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.stats())
}

pub async fn clear_cache(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.cache.clear())
}

pub async fn list_org_repos(
    State(state): State<AppState>,
    Path(org): Path<String>,
    Query(query): Query<RepoListQuery>,
) -> ApiResult<Json<Vec<Repository>>> {
    let limit = query.limit.unwrap_or(DEFAULT_REPO_LIMIT);
    Ok(Json(state.github.list_repos(&org, limit).await?))
}
