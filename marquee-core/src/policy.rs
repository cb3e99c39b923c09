use std::time::Duration;

/// TTLs and invalidation behaviour of the seat cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CachePolicy {
    pub collection_ttl: Duration,
    pub seat_ttl: Duration,
    /// Backstop against a crashed lock holder, never the normal release path.
    pub lock_ttl: Duration,
    /// Drop `seats:{screening}` after a reservation commits. Off by default, which
    /// leaves collection reads stale until their TTL runs out.
    pub invalidate_collection_on_reserve: bool,
}

impl CachePolicy {
    pub fn from_seconds(collection: u64, seat: u64, lock: u64) -> Self {
        Self {
            collection_ttl: Duration::from_secs(collection),
            seat_ttl: Duration::from_secs(seat),
            lock_ttl: Duration::from_secs(lock),
            invalidate_collection_on_reserve: false,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_seconds(60 * 5, 60 * 5, 30)
    }
}
