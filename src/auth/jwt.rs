use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::users;

/// Access token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's UUID.
    pub sub: String,
    pub username: String,
    /// Token expiration (Unix timestamp).
    pub exp: usize,
    /// Token issued-at (Unix timestamp).
    pub iat: Option<usize>,
}

impl Claims {
    /// Extract the user UUID from the `sub` claim.
    pub fn user_id(&self) -> Result<Uuid, String> {
        Uuid::parse_str(&self.sub).map_err(|e| format!("Invalid UUID in sub claim: {e}"))
    }
}

/// Sign an HS256 access token for `user_id` valid for `ttl`.
pub fn issue_token(
    user_id: Uuid,
    username: &str,
    secret: &str,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: now + ttl.as_secs() as usize,
        iat: Some(now),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Validate an HS256 access token and return the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, String> {
    let validation = Validation::new(Algorithm::HS256);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| format!("{:?}", e.kind()))
}

/// Signing settings shared through actix app data.
#[derive(Clone)]
pub struct JwtSettings {
    secret: String,
    ttl: Duration,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &users::Model) -> Result<String, jsonwebtoken::errors::Error> {
        issue_token(user.id, &user.username, &self.secret, self.ttl)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, String> {
        validate_token(token, &self.secret)
    }
}

impl From<&JwtConfig> for JwtSettings {
    fn from(config: &JwtConfig) -> Self {
        Self::new(config.secret.clone(), config.expires_in)
    }
}
