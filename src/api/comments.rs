//! Blog comment endpoints.
//!
//! Threads are two levels deep: top-level comments and direct replies.
//! Visitor comments land as pending; admin replies are auto-approved.

use axum::extract::{Path, State};
use axum::Json;

use crate::errors::AppError;
use crate::models::{
    moderation, AdminReplyRequest, CommentRow, CommentThread, CreateCommentRequest,
    ModerateRequest,
};
use crate::AppState;

use super::{success, ApiResult};

/// Group a flat comment list into top-level threads with replies attached.
/// Replies whose parent is absent from the list are dropped.
fn build_threads(comments: Vec<CommentRow>) -> Vec<CommentThread> {
    let mut threads: Vec<CommentThread> = comments
        .iter()
        .filter(|c| c.parent_id.is_none())
        .map(|c| CommentThread {
            comment: c.clone(),
            replies: Vec::new(),
        })
        .collect();

    for comment in comments {
        let Some(parent_id) = comment.parent_id else {
            continue;
        };
        if let Some(thread) = threads.iter_mut().find(|t| t.comment.id == parent_id) {
            thread.replies.push(comment);
        }
    }

    threads
}

/// GET /api/comments (admin moderation queue, threaded)
pub async fn list_comments(State(state): State<AppState>) -> ApiResult<Vec<CommentThread>> {
    let comments = state.repo.list_comments().await?;
    success(build_threads(comments))
}

/// GET /api/public/blogs/{id}/comments (approved threads only)
pub async fn list_public_comments(
    State(state): State<AppState>,
    Path(blog_id): Path<i64>,
) -> ApiResult<Vec<CommentThread>> {
    let comments = state.repo.list_comments_for_blog(blog_id, true).await?;
    success(build_threads(comments))
}

/// POST /api/public/comments (visitor submission, lands pending)
pub async fn create_comment(
    State(state): State<AppState>,
    Json(req): Json<CreateCommentRequest>,
) -> ApiResult<CommentRow> {
    if req.author.trim().is_empty() || req.content.trim().is_empty() {
        return Err(AppError::Validation(
            "author and content are required".to_string(),
        ));
    }
    if state.repo.get_blog(req.blog_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Blog {} not found", req.blog_id)));
    }
    // Threads are two levels: a reply's parent must be top-level
    if let Some(parent_id) = req.parent_id {
        let parent = state
            .repo
            .get_comment(parent_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment {parent_id} not found")))?;
        if parent.parent_id.is_some() {
            return Err(AppError::Validation(
                "parentId: replies to replies are not allowed".to_string(),
            ));
        }
    }

    let comment = state
        .repo
        .create_comment(
            req.blog_id,
            req.author.trim(),
            req.email.as_deref(),
            req.phone.as_deref(),
            req.content.trim(),
            req.parent_id,
            moderation::PENDING,
            false,
        )
        .await?;

    success(comment)
}

/// POST /api/comments/reply (admin, auto-approved)
pub async fn admin_reply(
    State(state): State<AppState>,
    Json(req): Json<AdminReplyRequest>,
) -> ApiResult<CommentRow> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content is required".to_string()));
    }
    let parent = state
        .repo
        .get_comment(req.parent_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", req.parent_id)))?;
    if parent.parent_id.is_some() {
        return Err(AppError::Validation(
            "parentId: replies to replies are not allowed".to_string(),
        ));
    }

    let author = req.author.as_deref().unwrap_or("Admin");
    let comment = state
        .repo
        .create_comment(
            req.blog_id,
            author,
            None,
            None,
            req.content.trim(),
            Some(req.parent_id),
            moderation::APPROVED,
            true,
        )
        .await?;

    success(comment)
}

/// POST /api/comments/{id}/moderate
pub async fn moderate_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<ModerateRequest>,
) -> ApiResult<serde_json::Value> {
    state.reconciler.moderate_comment(id, &req.status).await?;
    success(serde_json::json!({ "id": id, "status": req.status }))
}

/// DELETE /api/comments/{id} (deletes direct replies too)
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<serde_json::Value> {
    if !state.repo.delete_comment_with_replies(id).await? {
        return Err(AppError::NotFound(format!("Comment {id} not found")));
    }
    success(serde_json::json!({ "deleted": true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, parent_id: Option<i64>) -> CommentRow {
        CommentRow {
            id,
            blog_id: 1,
            author: format!("user-{id}"),
            email: None,
            phone: None,
            content: "hello".to_string(),
            status: moderation::APPROVED.to_string(),
            parent_id,
            is_admin_reply: false,
            created_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_build_threads_attaches_replies() {
        let threads = build_threads(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, None),
            comment(4, Some(1)),
        ]);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, 1);
        assert_eq!(threads[0].replies.len(), 2);
        assert!(threads[1].replies.is_empty());
    }

    #[test]
    fn test_build_threads_drops_orphan_replies() {
        let threads = build_threads(vec![comment(2, Some(99)), comment(1, None)]);
        assert_eq!(threads.len(), 1);
        assert!(threads[0].replies.is_empty());
    }
}
