use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use super::respond;
use crate::auth::authorization::{find_post, verify_post_author};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::posts as post_db;
use crate::error::ApiError;
use crate::models::posts::{CreatePost, PostFilters, PostResponse, UpdatePost};
use crate::pagination::PageRequest;

/// GET /api/posts — paginated, searchable post listing.
pub async fn get_posts(
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageRequest>,
    filters: web::Query<PostFilters>,
) -> Result<HttpResponse, ApiError> {
    let request = query.into_inner().normalized();
    request.validate().map_err(ApiError::BadRequest)?;

    let page = post_db::list_posts(db.get_ref(), &request, &filters).await?;
    info!(
        returned = page.items.len(),
        page = page.pagination.page,
        total_pages = page.pagination.total_pages,
        "fetched posts"
    );
    Ok(respond(StatusCode::OK, page))
}

/// GET /api/posts/{id} — get a single post.
pub async fn get_post(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let post = find_post(db.get_ref(), path.into_inner()).await?;
    Ok(respond(StatusCode::OK, PostResponse::from(post)))
}

/// POST /api/posts — create a post (requires authentication).
pub async fn create_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreatePost>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner().validated().map_err(ApiError::BadRequest)?;
    let post = post_db::insert_post(db.get_ref(), input, user.0.id).await?;
    info!(post_id = %post.id, author_id = %post.author_id, "created post");
    Ok(respond(StatusCode::CREATED, PostResponse::from(post)))
}

/// PATCH /api/posts/{id} — update a post (author only).
pub async fn update_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePost>,
) -> Result<HttpResponse, ApiError> {
    let input = body.into_inner().validated().map_err(ApiError::BadRequest)?;
    let post = verify_post_author(db.get_ref(), path.into_inner(), user.0.id, "update").await?;

    let updated = post_db::update_post(db.get_ref(), post, input).await?;
    info!(post_id = %updated.id, "updated post");
    Ok(respond(StatusCode::OK, PostResponse::from(updated)))
}

/// DELETE /api/posts/{id} — delete a post (author only).
pub async fn delete_post(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let post = verify_post_author(db.get_ref(), path.into_inner(), user.0.id, "delete").await?;

    post_db::delete_post(db.get_ref(), post.id).await?;
    info!(post_id = %post.id, "deleted post");
    Ok(HttpResponse::NoContent().finish())
}
