//! Homepage curation endpoints.

use axum::extract::State;
use axum::Json;

use crate::models::{HomepageContent, HomepageView, WriteOutcome};
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/homepage (admin, raw stored references)
pub async fn get_homepage(State(state): State<AppState>) -> ApiResult<HomepageContent> {
    success(state.assembler.homepage_admin().await?)
}

/// PUT /api/homepage
pub async fn save_homepage(
    State(state): State<AppState>,
    Json(content): Json<HomepageContent>,
) -> ApiResult<WriteOutcome> {
    success(state.reconciler.save_homepage(content).await?)
}

/// GET /api/public/homepage (enriched)
pub async fn get_public_homepage(State(state): State<AppState>) -> ApiResult<HomepageView> {
    success(state.assembler.homepage_public().await?)
}
