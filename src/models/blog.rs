//! Blog post and comment models.
//!
//! Blog taxonomy references (category/tag ids) and SEO meta stay embedded in
//! the row as JSON rather than going through the blob store.

use serde::{Deserialize, Serialize};

use super::blob::MetaInfo;

/// A row from the `blogs` table.
#[derive(Debug, Clone)]
pub struct BlogRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub featured_image: Option<i64>,
    /// Category taxonomy ids, embedded JSON
    pub category: Vec<i64>,
    /// Tag taxonomy ids, embedded JSON
    pub tags: Vec<i64>,
    pub author: Option<String>,
    pub meta: MetaInfo,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Sparse create/update payload for a blog post. Categories and tags arrive
/// as display names and go through taxonomy find-or-create.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBlogRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub featured_image: Option<String>,
    pub category: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub author: Option<String>,
    pub meta_title: Option<String>,
    pub meta_tags: Option<String>,
    pub extra_meta_tags: Option<String>,
    pub status: Option<String>,
}

/// Hydrated blog view with taxonomy names resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogView {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    pub category: Vec<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub meta_title: String,
    pub meta_tags: String,
    pub extra_meta_tags: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A row from the `blog_comments` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRow {
    pub id: i64,
    pub blog_id: i64,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub content: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    pub is_admin_reply: bool,
    pub created_at: String,
}

/// A top-level comment with its replies (threads are two levels deep).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(flatten)]
    pub comment: CommentRow,
    pub replies: Vec<CommentRow>,
}

/// Visitor comment submission (lands in moderation as pending).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub blog_id: i64,
    pub author: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub content: String,
    pub parent_id: Option<i64>,
}

/// Admin reply to a comment (auto-approved).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminReplyRequest {
    pub blog_id: i64,
    pub parent_id: i64,
    pub content: String,
    pub author: Option<String>,
}

/// Moderation decision for a comment or review.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerateRequest {
    pub status: String,
}
