use actix_web::FromRequest;
use actix_web::http::header::Header;
use actix_web::{HttpRequest, dev::Payload, web};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use moka::future::Cache;
use sea_orm::{DatabaseConnection, DbErr};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::auth::jwt::JwtSettings;
use crate::db::users as user_db;
use crate::error::ApiError;
use crate::models::users;

/// The user behind a verified bearer token.
pub struct AuthenticatedUser(pub users::Model);

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            // 1. Extract the Bearer token from the Authorization header.
            let bearer = Authorization::<Bearer>::parse(&req)
                .map_err(|_| {
                    ApiError::Unauthorized(
                        "Authorization header must be: Bearer <token>".to_string(),
                    )
                })?
                .into_scheme();

            // 2. Verify signature and expiry.
            let jwt = req
                .app_data::<web::Data<JwtSettings>>()
                .ok_or_else(|| ApiError::Internal("JWT settings not configured".to_string()))?;
            let claims = jwt
                .validate(bearer.token())
                .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {e}")))?;
            let user_id = claims.user_id().map_err(ApiError::Unauthorized)?;

            // 3. Resolve the user, through the cache when one is configured.
            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| ApiError::Internal("Database not configured".to_string()))?;
            let user = match req.app_data::<web::Data<UserCache>>() {
                Some(cache) => {
                    cache
                        .get_or_load(user_id, |id| user_db::get_user_by_id(db.get_ref(), id))
                        .await?
                }
                None => user_db::get_user_by_id(db.get_ref(), user_id).await?,
            };

            let user =
                user.ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;
            Ok(AuthenticatedUser(user))
        })
    }
}

/// Short-lived in-process cache of users resolved from tokens.
#[derive(Clone)]
pub struct UserCache {
    cache: Cache<Uuid, users::Model>,
}

impl UserCache {
    pub fn new(ttl: Duration, max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(max_capacity)
                .build(),
        }
    }

    /// Cached user for `id`, calling `load` on a miss.
    /// Missing users are not cached.
    pub async fn get_or_load<F, Fut>(&self, id: Uuid, load: F) -> Result<Option<users::Model>, DbErr>
    where
        F: FnOnce(Uuid) -> Fut,
        Fut: Future<Output = Result<Option<users::Model>, DbErr>>,
    {
        if let Some(cached) = self.cache.get(&id).await {
            return Ok(Some(cached));
        }

        debug!(user_id = %id, "user cache miss");
        let user = load(id).await?;
        if let Some(user) = &user {
            self.cache.insert(id, user.clone()).await;
        }
        Ok(user)
    }

    pub async fn insert(&self, user: users::Model) {
        self.cache.insert(user.id, user).await;
    }

    pub async fn contains(&self, id: &Uuid) -> bool {
        self.cache.get(id).await.is_some()
    }
}

impl Default for UserCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(60), 10_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> users::Model {
        users::Model {
            id: Uuid::new_v4(),
            username: name.to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_the_loader() {
        let cache = UserCache::default();
        let alice = user("alice");
        cache.insert(alice.clone()).await;

        let found = cache
            .get_or_load(alice.id, |_| async { Err(DbErr::Custom("not reached".into())) })
            .await
            .unwrap();
        assert_eq!(found, Some(alice));
    }

    #[tokio::test]
    async fn loaded_users_are_cached() {
        let cache = UserCache::default();
        let bob = user("bob");
        let loaded = bob.clone();

        let found = cache
            .get_or_load(bob.id, |_| async move { Ok(Some(loaded)) })
            .await
            .unwrap();
        assert_eq!(found, Some(bob.clone()));
        assert!(cache.contains(&bob.id).await);
    }

    #[tokio::test]
    async fn misses_and_errors_are_not_cached() {
        let cache = UserCache::default();
        let id = Uuid::new_v4();

        assert_eq!(cache.get_or_load(id, |_| async { Ok(None) }).await.unwrap(), None);
        assert!(!cache.contains(&id).await);

        let err = cache
            .get_or_load(id, |_| async { Err(DbErr::Custom("connection refused".into())) })
            .await;
        assert!(err.is_err());
        assert!(!cache.contains(&id).await);
    }
}
