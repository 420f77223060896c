//! Blog post endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::{status, BlogView, SaveBlogRequest, WriteOutcome};
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/blogs (admin, drafts included)
pub async fn list_blogs(State(state): State<AppState>) -> ApiResult<Vec<BlogView>> {
    let rows = state.repo.list_blogs().await?;
    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        views.push(state.assembler.blog_view(row).await?);
    }
    success(views)
}

/// GET /api/blogs/{id} (admin)
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<BlogView> {
    let row = state
        .repo
        .get_blog(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Blog {id} not found")))?;
    success(state.assembler.blog_view(&row).await?)
}

/// GET /api/public/blogs
pub async fn list_public_blogs(State(state): State<AppState>) -> ApiResult<Vec<BlogView>> {
    let rows = state.repo.list_published_blogs().await?;
    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        views.push(state.assembler.blog_view(row).await?);
    }
    success(views)
}

/// GET /api/public/blogs/{slug}
pub async fn get_public_blog(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<BlogView> {
    let row = state
        .repo
        .get_blog_by_slug(&slug)
        .await?
        .filter(|b| b.status == status::PUBLISHED)
        .ok_or_else(|| AppError::NotFound(format!("Blog {slug} not found")))?;
    success(state.assembler.blog_view(&row).await?)
}

/// POST /api/blogs
pub async fn create_blog(
    State(state): State<AppState>,
    Json(req): Json<SaveBlogRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.create_blog(req).await?)
}

/// PUT /api/blogs/{id}
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<SaveBlogRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.update_blog(id, req).await?)
}

/// DELETE /api/blogs/{id}
pub async fn delete_blog(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    if !state.reconciler.delete_blog(id).await? {
        return Err(AppError::NotFound(format!("Blog {id} not found")));
    }
    success(serde_json::json!({ "deleted": true }))
}
