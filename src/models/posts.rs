use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::validate_text;

pub const TITLE_MAX_LEN: usize = 255;
pub const CONTENT_MAX_LEN: usize = 255;
pub const SORTABLE_FIELDS: [&str; 4] = ["createdAt", "updatedAt", "title", "category"];

/// Alias the author join is selected under; search paths use `author.username`.
pub const AUTHOR_ALIAS: &str = "author";

/// Post categories, stored as their display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Category {
    #[sea_orm(string_value = "History")]
    History,
    #[sea_orm(string_value = "Science")]
    Science,
    #[sea_orm(string_value = "Technology")]
    Technology,
    #[sea_orm(string_value = "Art")]
    Art,
    #[sea_orm(string_value = "Music")]
    Music,
    #[sea_orm(string_value = "Sports")]
    Sports,
    #[sea_orm(string_value = "Other")]
    Other,
}

/// SeaORM entity for the `posts` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::comments::Entity")]
    Comments,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AuthorId",
        to = "super::users::Column::Id"
    )]
    Author,
}

impl Related<super::comments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    pub title: String,
    pub content: String,
    pub category: Category,
}

impl CreatePost {
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            title: validate_text("Title", &self.title, TITLE_MAX_LEN)?,
            content: validate_text("Content", &self.content, CONTENT_MAX_LEN)?,
            category: self.category,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePost {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<Category>,
}

impl UpdatePost {
    pub fn validated(self) -> Result<Self, String> {
        Ok(Self {
            title: self
                .title
                .map(|t| validate_text("Title", &t, TITLE_MAX_LEN))
                .transpose()?,
            content: self
                .content
                .map(|c| validate_text("Content", &c, CONTENT_MAX_LEN))
                .transpose()?,
            category: self.category,
        })
    }
}

/// Entity-specific filters accepted by `GET /api/posts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFilters {
    pub category: Option<Category>,
    pub author_id: Option<Uuid>,
    pub created_from: Option<NaiveDate>,
    pub created_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author_id: Uuid,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl From<Model> for PostResponse {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            content: m.content,
            category: m.category,
            author_id: m.author_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
