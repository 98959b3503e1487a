use sea_orm_migration::prelude::*;

use crate::m20250301_000002_create_posts_table::Posts;
use crate::m20250301_000003_create_comments_table::Comments;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (name, table, column) for every index used by the paginated listings.
fn indexes() -> Vec<(&'static str, DynIden, DynIden)> {
    vec![
        ("idx_posts_author_id", Posts::Table.into_iden(), Posts::AuthorId.into_iden()),
        ("idx_posts_category", Posts::Table.into_iden(), Posts::Category.into_iden()),
        ("idx_posts_created_at", Posts::Table.into_iden(), Posts::CreatedAt.into_iden()),
        ("idx_comments_post_id", Comments::Table.into_iden(), Comments::PostId.into_iden()),
        ("idx_comments_author_id", Comments::Table.into_iden(), Comments::AuthorId.into_iden()),
        ("idx_comments_created_at", Comments::Table.into_iden(), Comments::CreatedAt.into_iden()),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, column) in indexes() {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(column)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _) in indexes() {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}
