//! Destination page endpoints.

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::{
    status, DestinationView, PackageCard, PublicDestinationView, RelatedPackagesRequest,
    SaveDestinationRequest, WriteOutcome,
};
use crate::related::{related_package_order, Siblings};
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/destinations (admin, drafts included)
pub async fn list_destinations(State(state): State<AppState>) -> ApiResult<Vec<DestinationView>> {
    let rows = state.repo.list_destinations().await?;
    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        views.push(state.assembler.destination_admin(row).await?);
    }
    success(views)
}

/// GET /api/destinations/{slug} (admin)
pub async fn get_destination(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<DestinationView> {
    let row = state
        .repo
        .get_destination_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Destination {slug} not found")))?;
    success(state.assembler.destination_admin(&row).await?)
}

/// GET /api/public/destinations/{slug}
pub async fn get_public_destination(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<PublicDestinationView> {
    let row = state
        .repo
        .get_destination_by_slug(&slug)
        .await?
        .filter(|d| d.status == status::PUBLISHED)
        .ok_or_else(|| AppError::NotFound(format!("Destination {slug} not found")))?;
    success(state.assembler.destination_public(&row).await?)
}

/// POST /api/destinations
pub async fn create_destination(
    State(state): State<AppState>,
    Json(req): Json<SaveDestinationRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.create_destination(req).await?)
}

/// PUT /api/destinations/{slug}
pub async fn update_destination(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(req): Json<SaveDestinationRequest>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.update_destination(&slug, req).await?)
}

/// DELETE /api/destinations/{id}
pub async fn delete_destination(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    if !state.reconciler.delete_destination(id).await? {
        return Err(AppError::NotFound(format!("Destination {id} not found")));
    }
    success(serde_json::json!({ "deleted": true }))
}

/// GET /api/destinations/{slug}/siblings
pub async fn destination_siblings(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Siblings> {
    let row = state
        .repo
        .get_destination_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Destination {slug} not found")))?;
    success(state.resolver.destination_siblings(&row).await?)
}

/// POST /api/related-packages
pub async fn related_packages(
    State(state): State<AppState>,
    Json(req): Json<RelatedPackagesRequest>,
) -> ApiResult<Vec<PackageCard>> {
    let matches = state
        .resolver
        .related_packages(&req.destination_name, req.category.as_deref())
        .await?;

    let mut cards = Vec::with_capacity(matches.len());
    for pkg in &matches {
        cards.push(state.assembler.package_card(pkg).await?);
    }
    cards.sort_by(related_package_order);

    success(cards)
}
