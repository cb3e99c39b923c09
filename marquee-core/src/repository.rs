use async_trait::async_trait;
use std::time::Duration;

use crate::catalog::{Movie, Screening};
use crate::seat::{SeatSnapshot, SeatStatus};
use crate::{CacheResult, StoreResult};

/// Durable seat store. Source of truth for seat status.
#[async_trait]
pub trait SeatRepository: Send + Sync {
    /// All seats of a screening, ordered by seat id ascending.
    async fn list_seats(&self, screening_id: &str) -> StoreResult<Vec<SeatSnapshot>>;

    async fn get_seat_status(
        &self,
        screening_id: &str,
        seat_id: &str,
    ) -> StoreResult<Option<SeatStatus>>;

    /// Returns the number of rows updated; 0 means the seat does not exist.
    async fn set_seat_status(
        &self,
        screening_id: &str,
        seat_id: &str,
        status: SeatStatus,
    ) -> StoreResult<u64>;
}

/// Volatile key/value cache with per-key TTL.
#[async_trait]
pub trait SeatCache: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// `ttl: None` stores the value without expiry.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()>;

    /// Atomically creates `key` only if it is absent. Returns whether it was created.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Atomically deletes `key` only while it still holds `expected`.
    async fn delete_if_equals(&self, key: &str, expected: &str) -> CacheResult<bool>;
}

/// Read-only movie and screening listings.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_movies(&self) -> StoreResult<Vec<Movie>>;

    async fn list_screenings(&self, movie_id: &str) -> StoreResult<Vec<Screening>>;
}
