use actix_cors::Cors;
use actix_web::middleware::{Condition, Logger};
use actix_web::{App, HttpServer, web};
use blog_backend::auth::jwt::JwtSettings;
use blog_backend::auth::middleware::UserCache;
use blog_backend::config::{AppConfig, ServerConfig};
use blog_backend::create_pool;
use blog_backend::handlers;
use blog_backend::telemetry::init_tracing;
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use std::io;

fn build_cors(config: &ServerConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(config.cors_methods.iter().map(String::as_str))
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::CONTENT_TYPE,
            actix_web::http::header::ACCEPT,
        ])
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = if origin == "*" {
            cors.allow_any_origin()
        } else {
            cors.allowed_origin(origin)
        };
    }
    cors
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    init_tracing(&config.logging);
    tracing::info!(environment = %config.server.environment, "configuration loaded");

    let db = create_pool(&config.database)
        .await
        .map_err(|e| io::Error::other(format!("Failed to connect to database: {e}")))?;

    if config.database.run_migrations {
        Migrator::up(&db, None)
            .await
            .map_err(|e| io::Error::other(format!("Failed to run migrations: {e}")))?;
        tracing::info!("database migrations applied");
    }

    let db_data = web::Data::new(db);
    let jwt_data = web::Data::new(JwtSettings::from(&config.jwt));
    let user_cache = web::Data::new(UserCache::default());

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let api_prefix = format!("/{}", config.server.api_prefix);
    tracing::info!("Server running at http://{bind_addr}{api_prefix}");

    let server_config = config.server.clone();
    let log_requests = config.logging.log_requests;

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(&server_config))
            .wrap(Condition::new(log_requests, Logger::default()))
            .app_data(db_data.clone())
            .app_data(jwt_data.clone())
            .app_data(user_cache.clone())
            .service(web::scope(&api_prefix).configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
