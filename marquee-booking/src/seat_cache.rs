use marquee_core::keys;
use marquee_core::repository::{SeatCache, SeatRepository};
use marquee_core::{CachePolicy, CacheResult, SeatSnapshot, SeatStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{require, BookingError, BookingResult};

/// Where a resolved seat status came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StatusSource {
    Cache,
    Store,
}

/// Cache-aside reads of seat state at two granularities: the whole screening
/// (`seats:{screening}`) and a single seat (`seat:{screening}:{seat}`).
///
/// The two entries expire independently and are never cross-invalidated, so a
/// collection read may report a seat as available for up to the collection TTL
/// after it was reserved (unless `invalidate_collection_on_reserve` is set).
///
/// Cache failures never fail a read: they are logged and the store answers.
pub struct SeatCacheManager {
    store: Arc<dyn SeatRepository>,
    cache: Arc<dyn SeatCache>,
    policy: CachePolicy,
}

impl SeatCacheManager {
    pub fn new(store: Arc<dyn SeatRepository>, cache: Arc<dyn SeatCache>, policy: CachePolicy) -> Self {
        Self { store, cache, policy }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// All seats of a screening ordered by seat id. `NotFound` when it has none.
    pub async fn get_seats_for_screening(&self, screening_id: &str) -> BookingResult<Vec<SeatSnapshot>> {
        let screening_id = require("screeningId", screening_id)?;
        let key = keys::seats_key(screening_id);

        if let Some(cached) = self.cache_get(&key).await {
            match serde_json::from_str::<Vec<SeatSnapshot>>(&cached) {
                Ok(seats) => {
                    info!("Seats for screening {} found in cache.", screening_id);
                    return Ok(seats);
                }
                Err(e) => warn!("Discarding unreadable cache entry {}: {}", key, e),
            }
        }

        info!("Seats for screening {} not in cache. Fetching from store...", screening_id);
        let seats = self.store.list_seats(screening_id).await?;

        if seats.is_empty() {
            return Err(BookingError::NotFound(format!(
                "No seats found for screening {}",
                screening_id
            )));
        }

        match serde_json::to_string(&seats) {
            Ok(encoded) => {
                if self.cache_set(&key, &encoded, Some(self.policy.collection_ttl)).await {
                    info!("Seats for screening {} cached.", screening_id);
                }
            }
            Err(e) => warn!("Could not encode seats for {}: {}", key, e),
        }

        Ok(seats)
    }

    pub async fn get_seat_status(&self, screening_id: &str, seat_id: &str) -> BookingResult<SeatStatus> {
        let screening_id = require("screeningId", screening_id)?;
        let seat_id = require("seatId", seat_id)?;
        self.lookup_status(screening_id, seat_id)
            .await
            .map(|(status, _)| status)
    }

    /// Cache-aside lookup of one seat. The store answer is cached with the seat TTL.
    ///
    /// Population only creates the entry: a reader racing a reservation must not
    /// replace the `reserved` value the reservation pinned.
    pub(crate) async fn lookup_status(
        &self,
        screening_id: &str,
        seat_id: &str,
    ) -> BookingResult<(SeatStatus, StatusSource)> {
        let key = keys::seat_key(screening_id, seat_id);

        if let Some(cached) = self.cache_get(&key).await {
            match cached.parse::<SeatStatus>() {
                Ok(status) => {
                    debug!("Seat {} for screening {} found in cache.", seat_id, screening_id);
                    return Ok((status, StatusSource::Cache));
                }
                Err(e) => {
                    warn!("Discarding unreadable cache entry {}: {}", key, e);
                    self.cache_delete(&key).await;
                }
            }
        }

        info!(
            "Seat {} for screening {} not in cache. Fetching from store...",
            seat_id, screening_id
        );
        let status = self
            .store
            .get_seat_status(screening_id, seat_id)
            .await?
            .ok_or_else(|| BookingError::NotFound("Seat not found".to_string()))?;

        match self.cache.set_if_absent(&key, status.as_str(), self.policy.seat_ttl).await {
            Ok(true) => debug!("Seat {} for screening {} cached.", seat_id, screening_id),
            Ok(false) => debug!("Seat {} for screening {} was cached meanwhile, keeping it.", seat_id, screening_id),
            Err(e) => warn!("Cache population of {} failed: {}", key, e),
        }

        Ok((status, StatusSource::Store))
    }

    /// Writes a seat status with no expiry. Unlike population this must not fail
    /// silently: callers rely on the entry being in place.
    pub(crate) async fn pin_status(&self, screening_id: &str, seat_id: &str, status: SeatStatus) -> CacheResult<()> {
        let key = keys::seat_key(screening_id, seat_id);
        self.cache.set(&key, status.as_str(), None).await
    }

    pub(crate) async fn invalidate_seat(&self, screening_id: &str, seat_id: &str) {
        self.cache_delete(&keys::seat_key(screening_id, seat_id)).await;
    }

    pub(crate) async fn invalidate_collection(&self, screening_id: &str) {
        self.cache_delete(&keys::seats_key(screening_id)).await;
    }

    async fn cache_get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Cache read of {} failed, falling back to store: {}", key, e);
                None
            }
        }
    }

    async fn cache_set(&self, key: &str, value: &str, ttl: Option<Duration>) -> bool {
        match self.cache.set(key, value, ttl).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache population of {} failed: {}", key, e);
                false
            }
        }
    }

    async fn cache_delete(&self, key: &str) {
        if let Err(e) = self.cache.delete(key).await {
            warn!("Cache invalidation of {} failed: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_store::{InMemorySeatCache, InMemorySeatRepository};
    use std::sync::atomic::Ordering;

    fn setup() -> (InMemorySeatRepository, InMemorySeatCache, SeatCacheManager) {
        let store = InMemorySeatRepository::new()
            .with_seat("S1", "B", SeatStatus::Reserved)
            .with_seat("S1", "A", SeatStatus::Available);
        let cache = InMemorySeatCache::new();
        let manager = SeatCacheManager::new(
            Arc::new(store.clone()),
            Arc::new(cache.clone()),
            CachePolicy::default(),
        );
        (store, cache, manager)
    }

    #[tokio::test(start_paused = true)]
    async fn test_collection_miss_populates_then_hits() {
        let (store, cache, manager) = setup();

        let first = manager.get_seats_for_screening("S1").await.unwrap();
        assert_eq!(
            first,
            vec![
                SeatSnapshot::new("A", SeatStatus::Available),
                SeatSnapshot::new("B", SeatStatus::Reserved),
            ]
        );
        assert_eq!(cache.ttl("seats:S1"), Some(Some(Duration::from_secs(300))));

        let second = manager.get_seats_for_screening("S1").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.calls().list_seats.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_collection_refetches_after_ttl() {
        let (store, _cache, manager) = setup();

        manager.get_seats_for_screening("S1").await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        manager.get_seats_for_screening("S1").await.unwrap();

        assert_eq!(store.calls().list_seats.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_screening_is_not_found_and_not_cached() {
        let (_store, cache, manager) = setup();

        let err = manager.get_seats_for_screening("S9").await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
        assert!(!cache.contains("seats:S9"));
    }

    #[tokio::test]
    async fn test_cache_outage_degrades_to_store() {
        let (store, cache, manager) = setup();
        cache.set_offline(true);

        let seats = manager.get_seats_for_screening("S1").await.unwrap();
        assert_eq!(seats.len(), 2);
        let status = manager.get_seat_status("S1", "B").await.unwrap();
        assert_eq!(status, SeatStatus::Reserved);

        assert_eq!(store.calls().list_seats.load(Ordering::SeqCst), 1);
        assert_eq!(store.calls().get_seat_status.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_outage_is_transient() {
        let (store, _cache, manager) = setup();
        store.set_offline(true);

        let err = manager.get_seats_for_screening("S1").await.unwrap_err();
        assert!(matches!(err, BookingError::Transient(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_seat_uses_its_own_key() {
        let (store, cache, manager) = setup();

        assert_eq!(manager.get_seat_status("S1", "A").await.unwrap(), SeatStatus::Available);
        assert_eq!(cache.get("seat:S1:A").await.unwrap().as_deref(), Some("available"));
        assert_eq!(cache.ttl("seat:S1:A"), Some(Some(Duration::from_secs(300))));
        assert!(!cache.contains("seats:S1"));

        manager.get_seat_status("S1", "A").await.unwrap();
        assert_eq!(store.calls().get_seat_status.load(Ordering::SeqCst), 1);

        let err = manager.get_seat_status("S1", "Z").await.unwrap_err();
        assert!(matches!(err, BookingError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_treated_as_miss() {
        let (store, cache, manager) = setup();
        cache.set("seat:S1:A", "maybe", None).await.unwrap();
        cache.set("seats:S1", "not json", None).await.unwrap();

        assert_eq!(manager.get_seat_status("S1", "A").await.unwrap(), SeatStatus::Available);
        assert_eq!(manager.get_seats_for_screening("S1").await.unwrap().len(), 2);
        assert_eq!(cache.get("seat:S1:A").await.unwrap().as_deref(), Some("available"));
        assert_eq!(store.calls().list_seats.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_blank_identifiers_rejected() {
        let (store, _cache, manager) = setup();

        assert!(matches!(
            manager.get_seats_for_screening("").await,
            Err(BookingError::Validation(_))
        ));
        assert!(matches!(
            manager.get_seat_status("S1", " ").await,
            Err(BookingError::Validation(_))
        ));
        assert_eq!(store.calls().get_seat_status.load(Ordering::SeqCst), 0);
    }
}
