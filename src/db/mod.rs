pub mod comments;
pub mod posts;
pub mod users;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::config::DatabaseConfig;

/// Open a SeaORM connection pool for `config.url`.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options.sqlx_logging(config.logging);
    Database::connect(options).await
}
