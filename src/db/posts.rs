use sea_orm::sea_query::Alias;
use sea_orm::*;
use uuid::Uuid;

use crate::models::created_range;
use crate::models::posts::{
    self, AUTHOR_ALIAS, CreatePost, PostFilters, PostResponse, SORTABLE_FIELDS, UpdatePost,
};
use crate::pagination::{
    FilterCondition, PageRequest, PaginatedResult, PaginationError, PaginationOptions,
    SeaPageQuery, paginate,
};

/// Insert a new post written by `author_id`.
pub async fn insert_post(
    db: &DatabaseConnection,
    input: CreatePost,
    author_id: Uuid,
) -> Result<posts::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_post = posts::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        content: Set(input.content),
        category: Set(input.category),
        author_id: Set(author_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_post.insert(db).await
}

/// Fetch a single post by ID.
pub async fn get_post_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<posts::Model>, DbErr> {
    posts::Entity::find_by_id(id).one(db).await
}

/// Apply the present fields of `input` to `post`.
pub async fn update_post(
    db: &DatabaseConnection,
    post: posts::Model,
    input: UpdatePost,
) -> Result<posts::Model, DbErr> {
    let mut active: posts::ActiveModel = post.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(content) = input.content {
        active.content = Set(content);
    }
    if let Some(category) = input.category {
        active.category = Set(category);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await
}

/// Delete a post by ID. Its comments go with it.
pub async fn delete_post(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    posts::Entity::delete_by_id(id).exec(db).await
}

/// Posts joined with their author so search can reach `author.username`.
pub fn select_with_author() -> Select<posts::Entity> {
    posts::Entity::find().join_as(
        JoinType::LeftJoin,
        posts::Relation::Author.def(),
        Alias::new(AUTHOR_ALIAS),
    )
}

pub fn list_options(filters: &PostFilters) -> PaginationOptions {
    let mut options = PaginationOptions::default()
        .with_search_fields(["title", "content"])
        .with_search_relations([format!("{AUTHOR_ALIAS}.username")])
        .with_sortable_fields(SORTABLE_FIELDS);

    if let Some(category) = filters.category {
        options = options.filter(FilterCondition::equals("category", category.to_value()));
    }
    if let Some(author_id) = filters.author_id {
        options = options.filter(FilterCondition::equals("authorId", author_id));
    }
    if let Some(range) = created_range(filters.created_from, filters.created_to) {
        options = options.date_range(range);
    }

    options
}

/// One page of posts matching `filters`.
pub async fn list_posts(
    db: &DatabaseConnection,
    request: &PageRequest,
    filters: &PostFilters,
) -> Result<PaginatedResult<PostResponse>, PaginationError> {
    let query = SeaPageQuery::new(db, select_with_author());
    paginate(query, request, PostResponse::from, &list_options(filters)).await
}
