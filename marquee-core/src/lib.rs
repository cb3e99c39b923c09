pub mod seat;
pub mod catalog;
pub mod keys;
pub mod policy;
pub mod repository;

pub use policy::CachePolicy;
pub use seat::{SeatSnapshot, SeatStatus};

/// Failure reported by the durable seat store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed store row: {0}")]
    Decode(String),
}

/// Failure reported by the cache. Always transient from the caller's point of view.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type CacheResult<T> = Result<T, CacheError>;
