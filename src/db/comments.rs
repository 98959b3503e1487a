use sea_orm::*;
use uuid::Uuid;

use crate::models::comments::{
    self, CommentFilters, CommentResponse, CreateComment, SORTABLE_FIELDS, UpdateComment,
};
use crate::models::created_range;
use crate::pagination::{
    FilterCondition, PageRequest, PaginatedResult, PaginationError, PaginationOptions,
    SeaRepository, paginate_by_repository,
};

/// Insert a new comment written by `author_id`. The post must already exist.
pub async fn insert_comment(
    db: &DatabaseConnection,
    input: CreateComment,
    author_id: Uuid,
) -> Result<comments::Model, DbErr> {
    let now = chrono::Utc::now();
    let new_comment = comments::ActiveModel {
        id: Set(Uuid::new_v4()),
        content: Set(input.content),
        post_id: Set(input.post_id),
        author_id: Set(author_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    new_comment.insert(db).await
}

/// Fetch a single comment by ID.
pub async fn get_comment_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<comments::Model>, DbErr> {
    comments::Entity::find_by_id(id).one(db).await
}

pub async fn update_comment(
    db: &DatabaseConnection,
    comment: comments::Model,
    input: UpdateComment,
) -> Result<comments::Model, DbErr> {
    let mut active: comments::ActiveModel = comment.into();

    if let Some(content) = input.content {
        active.content = Set(content);
    }
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await
}

/// Delete a comment by ID.
pub async fn delete_comment(db: &DatabaseConnection, id: Uuid) -> Result<DeleteResult, DbErr> {
    comments::Entity::delete_by_id(id).exec(db).await
}

pub fn list_options(filters: &CommentFilters) -> PaginationOptions {
    let mut options = PaginationOptions::default()
        .with_search_fields(["content"])
        .with_sortable_fields(SORTABLE_FIELDS);

    if let Some(post_id) = filters.post_id {
        options = options.filter(FilterCondition::equals("postId", post_id));
    }
    if let Some(author_id) = filters.author_id {
        options = options.filter(FilterCondition::equals("authorId", author_id));
    }
    if let Some(range) = created_range(filters.created_from, filters.created_to) {
        options = options.date_range(range);
    }

    options
}

/// One page of comments matching `filters`.
pub async fn list_comments(
    db: &DatabaseConnection,
    request: &PageRequest,
    filters: &CommentFilters,
) -> Result<PaginatedResult<CommentResponse>, PaginationError> {
    let repository = SeaRepository::<comments::Entity>::new(db);
    paginate_by_repository(&repository, request, CommentResponse::from, &list_options(filters))
        .await
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::pagination::sea;

    #[test]
    fn post_and_date_filters_compose() {
        let post_id = Uuid::new_v4();
        let filters = CommentFilters {
            post_id: Some(post_id),
            created_to: NaiveDate::from_ymd_opt(2024, 2, 29),
            ..CommentFilters::default()
        };
        let options = list_options(&filters);

        assert_eq!(options.filters, [FilterCondition::equals("postId", post_id)]);
        let range = &options.date_range_filters[0];
        assert!(range.from.is_none());
        assert_eq!(range.to.unwrap().to_rfc3339(), "2024-02-29T23:59:59.999+00:00");
    }

    #[test]
    fn comment_filters_resolve_to_columns() {
        let post_id = Uuid::nil();
        let filters = CommentFilters {
            post_id: Some(post_id),
            ..CommentFilters::default()
        };
        let predicates: Vec<_> = list_options(&filters)
            .filters
            .iter()
            .enumerate()
            .map(|(i, f)| f.to_predicate("comments", i).unwrap())
            .collect();

        let sql = sea::compose(comments::Entity::find(), "comments", &predicates, None)
            .unwrap()
            .build(DbBackend::Postgres)
            .to_string();
        assert!(
            sql.contains(r#""comments"."post_id" = '00000000-0000-0000-0000-000000000000'"#),
            "{sql}"
        );
    }
}
