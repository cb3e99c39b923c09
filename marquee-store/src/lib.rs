pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod memory;
pub mod redis_repo;
pub mod seat_repo;

pub use catalog_repo::PostgresCatalogRepository;
pub use database::DbClient;
pub use memory::{InMemorySeatCache, InMemorySeatRepository};
pub use redis_repo::RedisClient;
pub use seat_repo::PostgresSeatRepository;
