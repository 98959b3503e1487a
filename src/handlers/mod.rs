pub mod auth;
pub mod comments;
pub mod posts;
pub mod users;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::error::ApiError;

/// Body of every successful response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: &'static str,
    pub data: T,
    pub timestamp: String,
    pub status_code: u16,
}

fn status_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::CREATED => "Created successfully",
        StatusCode::NO_CONTENT => "No content",
        _ => "Success",
    }
}

/// Wrap `data` in the success envelope.
pub fn respond<T: Serialize>(status: StatusCode, data: T) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse {
        success: true,
        message: status_message(status),
        data,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        status_code: status.as_u16(),
    })
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // Malformed paths, query strings and bodies are 400s in the error envelope.
    cfg.app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
    );

    // ── Auth routes ──
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(auth::login))
            .route("/me", web::get().to(auth::me)),
    );

    // ── User routes (public) ──
    cfg.service(web::resource("/users").route(web::get().to(users::get_users)));
    cfg.service(web::resource("/users/{id}").route(web::get().to(users::get_user)));
    cfg.service(web::resource("/user/{id}").route(web::get().to(users::get_user)));

    // ── Post routes (writes require a valid JWT) ──
    cfg.service(
        web::scope("/posts")
            .route("", web::get().to(posts::get_posts))
            .route("", web::post().to(posts::create_post))
            .route("/{id}", web::get().to(posts::get_post))
            .route("/{id}", web::patch().to(posts::update_post))
            .route("/{id}", web::delete().to(posts::delete_post))
            .route("/{id}/comments", web::get().to(comments::get_post_comments))
            .route("/{id}/comments", web::post().to(comments::create_post_comment)),
    );

    // ── Comment routes (writes require a valid JWT) ──
    cfg.service(
        web::scope("/comments")
            .route("", web::get().to(comments::get_comments))
            .route("", web::post().to(comments::create_comment))
            .route("/{id}", web::get().to(comments::get_comment))
            .route("/{id}", web::patch().to(comments::update_comment))
            .route("/{id}", web::delete().to(comments::delete_comment)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn respond_wraps_data() {
        let response = respond(StatusCode::CREATED, serde_json::json!({ "id": 1 }));
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Created successfully");
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["data"]["id"], 1);
    }
}
