//! Theme page endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::{
    status, PublicThemePageView, SaveThemePageRequest, ThemePageView, WriteOutcome,
};
use crate::related::Siblings;
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/theme-pages (admin, drafts included)
pub async fn list_theme_pages(State(state): State<AppState>) -> ApiResult<Vec<ThemePageView>> {
    let rows = state.repo.list_theme_pages().await?;
    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        views.push(state.assembler.theme_page_admin(row).await?);
    }
    success(views)
}

/// GET /api/theme-pages/{slug} (admin)
pub async fn get_theme_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<ThemePageView> {
    let row = state
        .repo
        .get_theme_page_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Theme page {slug} not found")))?;
    success(state.assembler.theme_page_admin(&row).await?)
}

/// GET /api/public/theme-pages/{slug}
pub async fn get_public_theme_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<PublicThemePageView> {
    let row = state
        .repo
        .get_theme_page_by_slug(&slug)
        .await?
        .filter(|p| p.status == status::PUBLISHED)
        .ok_or_else(|| AppError::NotFound(format!("Theme page {slug} not found")))?;
    success(state.assembler.theme_page_public(&row).await?)
}

/// POST /api/theme-pages
pub async fn create_theme_page(
    State(state): State<AppState>,
    Json(req): Json<SaveThemePageRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.create_theme_page(req).await?)
}

/// PUT /api/theme-pages/{slug}
pub async fn update_theme_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SaveThemePageRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.update_theme_page(&slug, req).await?)
}

/// DELETE /api/theme-pages/{id}
pub async fn delete_theme_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    if !state.reconciler.delete_theme_page(id).await? {
        return Err(AppError::NotFound(format!("Theme page {id} not found")));
    }
    success(serde_json::json!({ "deleted": true }))
}

/// GET /api/theme-pages/{slug}/siblings
pub async fn theme_page_siblings(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Siblings> {
    let row = state
        .repo
        .get_theme_page_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Theme page {slug} not found")))?;
    success(state.resolver.theme_page_siblings(&row).await?)
}
