//! Tour package endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::{
    status, CheckSlugRequest, CheckSlugResponse, PackageView, PublicPackageView,
    SavePackageRequest, WriteOutcome,
};
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/packages (admin, drafts included)
pub async fn list_packages(State(state): State<AppState>) -> ApiResult<Vec<PackageView>> {
    let rows = state.repo.list_packages().await?;
    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        views.push(state.assembler.package_admin(row).await?);
    }
    success(views)
}

/// GET /api/packages/{slug} (admin)
pub async fn get_package(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<PackageView> {
    let row = state
        .repo
        .get_package_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Package {slug} not found")))?;
    success(state.assembler.package_admin(&row).await?)
}

/// GET /api/public/packages/{slug}
pub async fn get_public_package(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<PublicPackageView> {
    let row = state
        .repo
        .get_package_by_slug(&slug)
        .await?
        .filter(|p| p.status == status::PUBLISHED)
        .ok_or_else(|| AppError::NotFound(format!("Package {slug} not found")))?;
    success(state.assembler.package_public(&row).await?)
}

/// POST /api/packages
pub async fn create_package(
    State(state): State<AppState>,
    Json(req): Json<SavePackageRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.create_package(req).await?)
}

/// PUT /api/packages/{slug}
pub async fn update_package(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SavePackageRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.update_package(&slug, req).await?)
}

/// DELETE /api/packages/{id}
pub async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    if !state.reconciler.delete_package(id).await? {
        return Err(AppError::NotFound(format!("Package {id} not found")));
    }
    success(serde_json::json!({ "deleted": true }))
}

/// POST /api/packages/check-slug
pub async fn check_package_slug(
    State(state): State<AppState>,
    Json(req): Json<CheckSlugRequest>,
) -> ApiResult<CheckSlugResponse> {
    let slug = req.slug.trim();
    if slug.is_empty() {
        return Err(AppError::Validation("slug: a non-empty value is required".to_string()));
    }

    let taken = state.repo.package_slug_exists(slug, req.exclude_id).await?;
    let suggestion = if taken {
        Some(state.reconciler.unique_package_slug(slug).await?)
    } else {
        None
    };

    success(CheckSlugResponse {
        available: !taken,
        suggestion,
    })
}
