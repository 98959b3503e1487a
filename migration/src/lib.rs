pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_users_table;
mod m20250301_000002_create_posts_table;
mod m20250301_000003_create_comments_table;
mod m20250301_000004_add_listing_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_users_table::Migration),
            Box::new(m20250301_000002_create_posts_table::Migration),
            Box::new(m20250301_000003_create_comments_table::Migration),
            Box::new(m20250301_000004_add_listing_indexes::Migration),
        ]
    }
}
