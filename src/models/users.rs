use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::validate_text;

pub const USERNAME_MAX_LEN: usize = 50;
pub const SORTABLE_FIELDS: [&str; 2] = ["createdAt", "username"];

/// SeaORM entity for the `users` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::posts::Entity")]
    Posts,
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Body of `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

impl LoginRequest {
    /// The trimmed username, 1 to 50 characters.
    pub fn validated_username(&self) -> Result<String, String> {
        validate_text("Username", &self.username, USERNAME_MAX_LEN)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTimeUtc,
}

impl From<Model> for UserResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_username_is_trimmed() {
        let request = LoginRequest {
            username: "  alice  ".to_string(),
        };
        assert_eq!(request.validated_username().unwrap(), "alice");

        let blank = LoginRequest {
            username: " ".to_string(),
        };
        assert!(blank.validated_username().is_err());
    }

    #[test]
    fn user_response_uses_camel_case() {
        let user = Model {
            id: Uuid::nil(),
            username: "alice".to_string(),
            created_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["username"], "alice");
        assert!(json.get("createdAt").is_some());
    }
}
