use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::validate_text;

pub const CONTENT_MAX_LEN: usize = 255;
pub const SORTABLE_FIELDS: [&str; 3] = ["createdAt", "updatedAt", "content"];

/// SeaORM entity for the `comments` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::posts::Entity",
        from = "Column::PostId",
        to = "super::posts::Column::Id"
    )]
    Post,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Body of `POST /api/comments`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub content: String,
    pub post_id: Uuid,
}

impl CreateComment {
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            content: validate_text("Content", &self.content, CONTENT_MAX_LEN)?,
            post_id: self.post_id,
        })
    }
}

/// Body of `POST /api/posts/{post_id}/comments`; the post comes from the path.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostComment {
    pub content: String,
}

impl CreatePostComment {
    pub fn for_post(self, post_id: Uuid) -> CreateComment {
        CreateComment {
            content: self.content,
            post_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateComment {
    pub content: Option<String>,
}

impl UpdateComment {
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            content: self
                .content
                .map(|c| validate_text("Content", &c, CONTENT_MAX_LEN))
                .transpose()?,
        })
    }
}

/// Entity-specific filters accepted by the comment listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFilters {
    pub post_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Model> for CommentResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            content: m.content,
            post_id: m.post_id,
            author_id: m.author_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
