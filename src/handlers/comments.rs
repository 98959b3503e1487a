use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use super::respond;
use crate::auth::authorization::{find_comment, find_post, verify_comment_author};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::comments as comment_db;
use crate::error::ApiError;
use crate::models::comments::{
    CommentFilters, CommentResponse, CreateComment, CreatePostComment, UpdateComment,
};
use crate::pagination::PageRequest;

fn page_request(query: web::Query<PageRequest>) -> Result<PageRequest, ApiError> {
    let request = query.into_inner().normalized();
    request.validate().map_err(ApiError::BadRequest)?;
    Ok(request)
}

async fn create(
    user: AuthenticatedUser,
    db: &DatabaseConnection,
    input: CreateComment,
) -> Result<HttpResponse, ApiError> {
    let input = input.validated().map_err(ApiError::BadRequest)?;
    find_post(db, input.post_id).await?;

    let comment = comment_db::insert_comment(db, input, user.0.id).await?;
    info!(comment_id = %comment.id, post_id = %comment.post_id, "created comment");
    Ok(respond(StatusCode::CREATED, CommentResponse::from(comment)))
}

/// GET /api/comments — paginated, searchable comment listing.
pub async fn get_comments(
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageRequest>,
    filters: web::Query<CommentFilters>,
) -> Result<HttpResponse, ApiError> {
    let request = page_request(query)?;
    let page = comment_db::list_comments(db.get_ref(), &request, &filters).await?;
    info!(
        returned = page.items.len(),
        page = page.pagination.page,
        total_pages = page.pagination.total_pages,
        "fetched comments"
    );
    Ok(respond(StatusCode::OK, page))
}

/// GET /api/posts/{id}/comments — comments on one post.
pub async fn get_post_comments(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<PageRequest>,
    filters: web::Query<CommentFilters>,
) -> Result<HttpResponse, ApiError> {
    let post = find_post(db.get_ref(), path.into_inner()).await?;
    let request = page_request(query)?;
    let filters = CommentFilters {
        post_id: Some(post.id),
        ..filters.into_inner()
    };

    let page = comment_db::list_comments(db.get_ref(), &request, &filters).await?;
    info!(post_id = %post.id, returned = page.items.len(), "fetched post comments");
    Ok(respond(StatusCode::OK, page))
}

/// GET /api/comments/{id} — get a single comment.
pub async fn get_comment(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let comment = find_comment(db.get_ref(), path.into_inner()).await?;
    Ok(respond(StatusCode::OK, CommentResponse::from(comment)))
}

/// POST /api/comments — comment on the post named in the body (requires authentication).
pub async fn create_comment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateComment>,
) -> Result<HttpResponse, ApiError> {
    create(user, db.get_ref(), body.into_inner()).await
}

/// POST /api/posts/{id}/comments — comment on the post in the path (requires authentication).
pub async fn create_post_comment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<CreatePostComment>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner().for_post(path.into_inner());
    create(user, db.get_ref(), input).await
}

/// PATCH /api/comments/{id} — update a comment (author only).
pub async fn update_comment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateComment>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner().validated().map_err(ApiError::BadRequest)?;
    let comment =
        verify_comment_author(db.get_ref(), path.into_inner(), user.0.id, "update").await?;

    let updated = comment_db::update_comment(db.get_ref(), comment, input).await?;
    info!(comment_id = %updated.id, "updated comment");
    Ok(respond(StatusCode::OK, CommentResponse::from(updated)))
}

/// DELETE /api/comments/{id} — delete a comment (author only).
pub async fn delete_comment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let comment =
        verify_comment_author(db.get_ref(), path.into_inner(), user.0.id, "delete").await?;

    comment_db::delete_comment(db.get_ref(), comment.id).await?;
    info!(comment_id = %comment.id, "deleted comment");
    Ok(HttpResponse::NoContent().finish())
}
