use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{SecondsFormat, Utc};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use crate::pagination::PaginationError;

/// Errors surfaced by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// Body of every error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub success: bool,
    pub message: String,
    pub error: String,
    pub status_code: u16,
    pub timestamp: String,
}

impl ApiError {
    fn is_unique_violation(err: &DbErr) -> bool {
        matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
    }

    /// Message shown to the client. Server-side failures are not described.
    fn public_message(&self) -> String {
        match self {
            ApiError::Database(e) if Self::is_unique_violation(e) => {
                "Resource already exists".to_string()
            }
            _ if self.status_code().is_server_error() => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(e) if Self::is_unique_violation(e) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Database(_) | ApiError::Pagination(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            debug!(error = %self, status = status.as_u16(), "request rejected");
        }

        HttpResponse::build(status).json(ErrorEnvelope {
            success: false,
            message: self.public_message(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            status_code: status.as_u16(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_statuses() {
        assert_eq!(
            ApiError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Database(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Pagination(PaginationError::UnknownField("posts.x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_errors_hide_details() {
        let err = ApiError::Database(DbErr::Custom("password=hunter2".into()));
        assert_eq!(err.public_message(), "Internal server error");

        let err = ApiError::NotFound("Post not found".into());
        assert_eq!(err.public_message(), "Post not found");
    }

    #[actix_web::test]
    async fn error_response_uses_envelope() {
        let response = ApiError::NotFound("Post not found".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Post not found");
        assert_eq!(json["error"], "Not Found");
        assert_eq!(json["statusCode"], 404);
        assert!(json["timestamp"].is_string());
    }
}
