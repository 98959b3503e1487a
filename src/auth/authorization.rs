use sea_orm::DatabaseConnection;
use tracing::warn;
use uuid::Uuid;

use crate::db::comments as comment_db;
use crate::db::posts as post_db;
use crate::error::ApiError;
use crate::models::{comments, posts};

/// Load a post, failing with 404 when it is absent.
pub async fn find_post(db: &DatabaseConnection, post_id: Uuid) -> Result<posts::Model, ApiError> {
    post_db::get_post_by_id(db, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))
}

/// Load a comment, failing with 404 when it is absent.
pub async fn find_comment(
    db: &DatabaseConnection,
    comment_id: Uuid,
) -> Result<comments::Model, ApiError> {
    comment_db::get_comment_by_id(db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))
}

/// Load a post that `user_id` wrote; 404 when absent, 403 for anyone else.
pub async fn verify_post_author(
    db: &DatabaseConnection,
    post_id: Uuid,
    user_id: Uuid,
    action: &str,
) -> Result<posts::Model, ApiError> {
    let post = find_post(db, post_id).await?;
    if post.author_id != user_id {
        warn!(%post_id, %user_id, action, "rejected post change by non-author");
        return Err(ApiError::Forbidden(format!("You can only {action} your own posts")));
    }
    Ok(post)
}

/// Load a comment that `user_id` wrote; 404 when absent, 403 for anyone else.
pub async fn verify_comment_author(
    db: &DatabaseConnection,
    comment_id: Uuid,
    user_id: Uuid,
    action: &str,
) -> Result<comments::Model, ApiError> {
    let comment = find_comment(db, comment_id).await?;
    if comment.author_id != user_id {
        warn!(%comment_id, %user_id, action, "rejected comment change by non-author");
        return Err(ApiError::Forbidden(format!(
            "You can only {action} your own comments"
        )));
    }
    Ok(comment)
}
