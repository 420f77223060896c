//! Customer review endpoints.

use axum::extract::{Path, State};
use axum::Json;

use chrono::Utc;

use crate::errors::AppError;
use crate::models::{moderation, review_type, CreateReviewRequest, ModerateRequest, ReviewView};
use crate::AppState;

use super::{success, ApiResult};

/// GET /api/reviews (admin moderation queue)
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Vec<ReviewView>> {
    success(state.repo.list_reviews().await?)
}

/// GET /api/public/reviews (approved text reviews)
pub async fn list_public_reviews(State(state): State<AppState>) -> ApiResult<Vec<ReviewView>> {
    success(state.repo.list_approved_reviews(review_type::TEXT).await?)
}

/// GET /api/public/video-reviews (approved video reviews)
pub async fn list_public_video_reviews(
    State(state): State<AppState>,
) -> ApiResult<Vec<ReviewView>> {
    success(state.repo.list_approved_reviews(review_type::VIDEO).await?)
}

/// POST /api/public/reviews (visitor submission, lands pending)
pub async fn create_review(
    State(state): State<AppState>,
    Json(req): Json<CreateReviewRequest>,
) -> ApiResult<ReviewView> {
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("name: a non-empty value is required".to_string()));
    }
    if !(1..=5).contains(&req.rating) {
        return Err(AppError::Validation("rating: must be between 1 and 5".to_string()));
    }

    let kind = match req.review_type.as_deref().map(str::trim) {
        None | Some("") | Some(review_type::TEXT) => review_type::TEXT,
        Some(review_type::VIDEO) => review_type::VIDEO,
        Some(other) => {
            return Err(AppError::Validation(format!(
                "reviewType: {other} is not a valid review type"
            )))
        }
    };

    // A text review needs a comment, a video review needs a video URL
    match kind {
        review_type::TEXT
            if req.comment.as_deref().map(str::trim).unwrap_or("").is_empty() =>
        {
            return Err(AppError::Validation("comment: required for text reviews".to_string()));
        }
        review_type::VIDEO
            if req.video_url.as_deref().map(str::trim).unwrap_or("").is_empty() =>
        {
            return Err(AppError::Validation("videoUrl: required for video reviews".to_string()));
        }
        _ => {}
    }

    let review = ReviewView {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        designation: req.designation,
        rating: req.rating,
        comment: req.comment,
        image_url: req.image_url,
        review_images: req.review_images,
        video_url: req.video_url,
        thumbnail_url: req.thumbnail_url,
        destination: req.destination,
        review_type: kind.to_string(),
        status: moderation::PENDING.to_string(),
        created_at: Utc::now().to_rfc3339(),
    };

    state.repo.insert_review(&review).await?;
    tracing::info!(review = %review.id, kind, "review submitted");
    success(review)
}

/// POST /api/reviews/{id}/moderate
pub async fn moderate_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ModerateRequest>,
) -> ApiResult<serde_json::Value> {
    state.reconciler.moderate_review(&id, &req.status).await?;
    success(serde_json::json!({ "id": id, "status": req.status }))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    if !state.repo.delete_review(&id).await? {
        return Err(AppError::NotFound(format!("Review {id} not found")));
    }
    success(serde_json::json!({ "deleted": true }))
}
