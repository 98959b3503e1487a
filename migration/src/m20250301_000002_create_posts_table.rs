use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `posts` table and its columns.
#[derive(DeriveIden)]
pub(crate) enum Posts {
    Table,
    Id,
    Title,
    Content,
    Category,
    AuthorId,
    CreatedAt,
    UpdatedAt,
}

const CATEGORY_CHECK: &str = "ALTER TABLE posts ADD CONSTRAINT chk_posts_category_valid CHECK (category IN ('History', 'Science', 'Technology', 'Art', 'Music', 'Sports', 'Other'))";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Posts::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Posts::Content).string_len(255).not_null())
                    .col(ColumnDef::new(Posts::Category).string().not_null())
                    .col(ColumnDef::new(Posts::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Posts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Posts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_posts_author_id")
                            .from(Posts::Table, Posts::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(CATEGORY_CHECK)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}
