use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use tracing::info;

use super::respond;
use crate::auth::jwt::JwtSettings;
use crate::auth::middleware::AuthenticatedUser;
use crate::db::users as user_db;
use crate::error::ApiError;
use crate::models::users::{LoginRequest, LoginResponse, UserResponse};

/// POST /api/auth/login — find or create the user and issue an access token.
pub async fn login(
    db: web::Data<DatabaseConnection>,
    jwt: web::Data<JwtSettings>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    let username = body.validated_username().map_err(ApiError::BadRequest)?;
    let user = user_db::find_or_create_by_username(db.get_ref(), &username).await?;

    let access_token = jwt
        .issue(&user)
        .map_err(|e| ApiError::Internal(format!("Failed to sign token: {e}")))?;
    info!(user_id = %user.id, "issued access token");

    Ok(respond(
        StatusCode::OK,
        LoginResponse {
            access_token,
            token_type: "Bearer",
            expires_in: jwt.ttl().as_secs(),
            user: UserResponse::from(user),
        },
    ))
}

/// GET /api/auth/me — return the currently authenticated user's profile.
pub async fn me(user: AuthenticatedUser) -> HttpResponse {
    respond(StatusCode::OK, UserResponse::from(user.0))
}
