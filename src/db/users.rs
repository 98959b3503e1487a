use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;
use uuid::Uuid;

use crate::models::users::{self, SORTABLE_FIELDS, UserResponse};
use crate::pagination::{
    PageRequest, PaginatedResult, PaginationError, PaginationOptions, SeaRepository,
    paginate_by_repository,
};

/// Fetch the user called `username`, creating it on first login.
///
/// Concurrent first logins for the same name both end up with the row
/// that won the insert.
pub async fn find_or_create_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = get_user_by_username(db, username).await? {
        return Ok(existing);
    }

    let inserted = match insert_if_absent(username).exec_without_returning(db).await {
        Ok(rows) => rows,
        Err(DbErr::RecordNotInserted) => 0,
        Err(err) => return Err(err),
    };

    let user = get_user_by_username(db, username)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("user `{username}`")))?;
    if inserted > 0 {
        info!(user_id = %user.id, username = %user.username, "created user on first login");
    }
    Ok(user)
}

fn insert_if_absent(username: &str) -> Insert<users::ActiveModel> {
    let new_user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        created_at: Set(chrono::Utc::now()),
    };

    users::Entity::insert(new_user).on_conflict(
        OnConflict::column(users::Column::Username)
            .do_nothing()
            .to_owned(),
    )
}

/// Fetch a single user by ID.
pub async fn get_user_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find_by_id(id).one(db).await
}

pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<users::Model>, DbErr> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(db)
        .await
}

pub fn list_options() -> PaginationOptions {
    PaginationOptions::default()
        .with_search_fields(["username"])
        .with_sortable_fields(SORTABLE_FIELDS)
}

/// One page of users, searchable by username.
pub async fn list_users(
    db: &DatabaseConnection,
    request: &PageRequest,
) -> Result<PaginatedResult<UserResponse>, PaginationError> {
    let repository = SeaRepository::<users::Entity>::new(db);
    paginate_by_repository(&repository, request, UserResponse::from, &list_options()).await
}
