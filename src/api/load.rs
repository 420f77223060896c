//! Taxonomy loaders for admin form dropdowns.

use axum::extract::{Path, State};

use crate::errors::AppError;
use crate::models::{TaxonomyEntry, TaxonomyFamily};
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/load/{family}
pub async fn load_taxonomy(
    State(state): State<AppState>,
    Path(family): Path<String>,
) -> ApiResult<Vec<TaxonomyEntry>> {
    let family = TaxonomyFamily::from_str(&family)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown taxonomy family: {family}")))?;
    success(state.repo.list_taxonomy(family).await?)
}
