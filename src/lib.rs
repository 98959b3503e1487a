pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod telemetry;

pub use db::create_pool;
