//! In-process adapters with the same contracts as the Redis and Postgres ones.
//!
//! Used by tests and local runs without infrastructure. Expiry reads
//! `tokio::time::Instant`, so a paused test clock drives TTLs.

use async_trait::async_trait;
use marquee_core::catalog::{Movie, Screening};
use marquee_core::repository::{CatalogRepository, SeatCache, SeatRepository};
use marquee_core::{CacheError, CacheResult, SeatSnapshot, SeatStatus, StoreError, StoreResult};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySeatCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
    offline: Arc<AtomicBool>,
}

impl InMemorySeatCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an outage: every call fails until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Remaining TTL of a live key. `Some(None)` means it never expires.
    pub fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        let now = Instant::now();
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at.map(|at| at - now))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ttl(key).is_some()
    }

    fn guard(&self) -> CacheResult<MutexGuard<'_, HashMap<String, Entry>>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("in-memory cache is offline".to_string()));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::Unavailable("cache mutex poisoned".to_string()))?;
        let now = Instant::now();
        entries.retain(|_, e| e.is_live(now));
        Ok(entries)
    }
}

#[async_trait]
impl SeatCache for InMemorySeatCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.guard()?.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> CacheResult<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.guard()?.insert(
            key.to_string(),
            Entry { value: value.to_string(), expires_at },
        );
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<bool> {
        let mut entries = self.guard()?;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry { value: value.to_string(), expires_at: Some(Instant::now() + ttl) },
        );
        Ok(true)
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.guard()?.remove(key);
        Ok(())
    }

    async fn delete_if_equals(&self, key: &str, expected: &str) -> CacheResult<bool> {
        let mut entries = self.guard()?;
        match entries.get(key) {
            Some(entry) if entry.value == expected => {
                entries.remove(key);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Counts of store calls, for asserting cache-aside behaviour.
#[derive(Debug, Default)]
pub struct StoreCalls {
    pub list_seats: AtomicUsize,
    pub get_seat_status: AtomicUsize,
    pub set_seat_status: AtomicUsize,
}

type ScreeningSeats = BTreeMap<String, SeatStatus>;

#[derive(Debug, Clone, Default)]
pub struct InMemorySeatRepository {
    seats: Arc<Mutex<HashMap<String, ScreeningSeats>>>,
    movies: Arc<Mutex<Vec<Movie>>>,
    screenings: Arc<Mutex<Vec<Screening>>>,
    calls: Arc<StoreCalls>,
    offline: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_latency: Arc<Mutex<Option<Duration>>>,
}

impl InMemorySeatRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seat(self, screening_id: &str, seat_id: &str, status: SeatStatus) -> Self {
        if let Ok(mut seats) = self.seats.lock() {
            seats
                .entry(screening_id.to_string())
                .or_default()
                .insert(seat_id.to_string(), status);
        }
        self
    }

    pub fn with_movie(self, movie: Movie) -> Self {
        if let Ok(mut movies) = self.movies.lock() {
            movies.push(movie);
        }
        self
    }

    pub fn with_screening(self, screening: Screening) -> Self {
        if let Ok(mut screenings) = self.screenings.lock() {
            screenings.push(screening);
        }
        self
    }

    /// Delays every status write, widening the window in which a reservation is in flight.
    pub fn set_write_latency(&self, latency: Option<Duration>) {
        if let Ok(mut slot) = self.write_latency.lock() {
            *slot = latency;
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Fails status writes only; reads keep working.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> &StoreCalls {
        &self.calls
    }

    /// Current status, bypassing call counting.
    pub fn status_of(&self, screening_id: &str, seat_id: &str) -> Option<SeatStatus> {
        let seats = self.seats.lock().ok()?;
        seats.get(screening_id)?.get(seat_id).copied()
    }

    fn check_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }

    fn lock_seats(&self) -> StoreResult<MutexGuard<'_, HashMap<String, ScreeningSeats>>> {
        self.seats
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

#[async_trait]
impl SeatRepository for InMemorySeatRepository {
    async fn list_seats(&self, screening_id: &str) -> StoreResult<Vec<SeatSnapshot>> {
        self.calls.list_seats.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let seats = self.lock_seats()?;
        Ok(seats
            .get(screening_id)
            .map(|by_seat| {
                by_seat
                    .iter()
                    .map(|(seat_id, status)| SeatSnapshot::new(seat_id.clone(), *status))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_seat_status(
        &self,
        screening_id: &str,
        seat_id: &str,
    ) -> StoreResult<Option<SeatStatus>> {
        self.calls.get_seat_status.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let seats = self.lock_seats()?;
        Ok(seats.get(screening_id).and_then(|s| s.get(seat_id)).copied())
    }

    async fn set_seat_status(
        &self,
        screening_id: &str,
        seat_id: &str,
        status: SeatStatus,
    ) -> StoreResult<u64> {
        self.calls.set_seat_status.fetch_add(1, Ordering::SeqCst);
        let latency = self.write_latency.lock().ok().and_then(|slot| *slot);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.check_online()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("in-memory store rejects writes".to_string()));
        }

        let mut seats = self.lock_seats()?;
        match seats.get_mut(screening_id).and_then(|s| s.get_mut(seat_id)) {
            Some(current) => {
                *current = status;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl CatalogRepository for InMemorySeatRepository {
    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        self.check_online()?;
        let movies = self
            .movies
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(movies.clone())
    }

    async fn list_screenings(&self, movie_id: &str) -> StoreResult<Vec<Screening>> {
        self.check_online()?;
        let screenings = self
            .screenings
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(screenings
            .iter()
            .filter(|s| s.movie_id == movie_id)
            .cloned()
            .collect())
    }
}
