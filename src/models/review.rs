//! Customer review models.

use serde::{Deserialize, Serialize};

/// A row from the `reviews` table. Reviews use uuid string ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    pub rating: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub review_images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    pub review_type: String,
    pub status: String,
    pub created_at: String,
}

/// Review submission payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub name: String,
    pub designation: Option<String>,
    pub rating: i64,
    pub comment: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub review_images: Vec<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub destination: Option<String>,
    /// "text" or "video"
    pub review_type: Option<String>,
}

/// Review type values.
pub mod review_type {
    pub const TEXT: &str = "text";
    pub const VIDEO: &str = "video";
}
