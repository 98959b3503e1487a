use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use tracing::info;
use uuid::Uuid;

use super::respond;
use crate::db::users as user_db;
use crate::error::ApiError;
use crate::models::users::UserResponse;
use crate::pagination::PageRequest;

/// GET /api/users — paginated user listing.
pub async fn get_users(
    db: web::Data<DatabaseConnection>,
    query: web::Query<PageRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = query.into_inner().normalized();
    request.validate().map_err(ApiError::BadRequest)?;

    let page = user_db::list_users(db.get_ref(), &request).await?;
    info!(
        returned = page.items.len(),
        page = page.pagination.page,
        total_pages = page.pagination.total_pages,
        "fetched users"
    );
    Ok(respond(StatusCode::OK, page))
}

/// GET /api/users/{id} — get a single user.
pub async fn get_user(
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let user = user_db::get_user_by_id(db.get_ref(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(respond(StatusCode::OK, UserResponse::from(user)))
}
