use chrono::{DateTime, Utc};
use marquee_core::keys;
use marquee_core::repository::{SeatCache, SeatRepository};
use marquee_core::SeatStatus;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{require, BookingError, BookingResult, ConflictReason};
use crate::lock::SeatLock;
use crate::seat_cache::{SeatCacheManager, StatusSource};

/// A committed seat reservation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub screening_id: String,
    pub seat_id: String,
    pub actor_id: String,
    pub reserved_at: DateTime<Utc>,
}

/// Serializes reservations per seat and commits them to cache and store.
///
/// Lock acquisition never waits: a caller that loses the race gets
/// `Conflict(LockHeld)` and decides itself whether to retry.
pub struct ReservationCoordinator {
    store: Arc<dyn SeatRepository>,
    cache: Arc<dyn SeatCache>,
    seats: Arc<SeatCacheManager>,
}

impl ReservationCoordinator {
    pub fn new(
        store: Arc<dyn SeatRepository>,
        cache: Arc<dyn SeatCache>,
        seats: Arc<SeatCacheManager>,
    ) -> Self {
        Self { store, cache, seats }
    }

    /// Moves a seat from available to reserved on behalf of `actor_id`.
    ///
    /// The seat lock is released on every path out of this call, including
    /// rejections and infrastructure errors.
    pub async fn reserve_seat(
        &self,
        screening_id: &str,
        seat_id: &str,
        actor_id: &str,
    ) -> BookingResult<Reservation> {
        let screening_id = require("screeningId", screening_id)?;
        let seat_id = require("seatId", seat_id)?;
        let actor_id = require("userId", actor_id)?;

        let lock_key = keys::lock_key(screening_id, seat_id);
        let token = format!("{}:{}", actor_id, Uuid::new_v4());
        let lock_ttl = self.seats.policy().lock_ttl;

        let lock = match SeatLock::try_acquire(&self.cache, lock_key, token, lock_ttl).await {
            Ok(Some(lock)) => lock,
            Ok(None) => {
                info!(
                    "Seat {} for screening {} is locked, rejecting {}",
                    seat_id, screening_id, actor_id
                );
                return Err(BookingError::Conflict(ConflictReason::LockHeld));
            }
            Err(e) => {
                error!("Could not acquire seat lock: {}", e);
                return Err(e.into());
            }
        };

        let outcome = self.reserve_locked(screening_id, seat_id, actor_id).await;
        lock.release().await;

        match &outcome {
            Ok(_) => info!("Seat {} for screening {} reserved by {}", seat_id, screening_id, actor_id),
            Err(BookingError::Transient(msg)) => error!("Error reserving seat {}: {}", seat_id, msg),
            Err(e) => info!("Reservation of seat {} rejected: {}", seat_id, e),
        }
        outcome
    }

    async fn reserve_locked(
        &self,
        screening_id: &str,
        seat_id: &str,
        actor_id: &str,
    ) -> BookingResult<Reservation> {
        let (cached, source) = self.seats.lookup_status(screening_id, seat_id).await?;
        let status = match source {
            StatusSource::Store => cached,
            StatusSource::Cache => self.current_status(screening_id, seat_id, cached).await?,
        };

        if status.is_reserved() {
            return Err(BookingError::Conflict(ConflictReason::AlreadyReserved));
        }

        // Cache first: a cache hit after this point never reads `available`.
        self.seats
            .pin_status(screening_id, seat_id, SeatStatus::Reserved)
            .await?;

        match self.store.set_seat_status(screening_id, seat_id, SeatStatus::Reserved).await {
            Ok(0) => {
                self.seats.invalidate_seat(screening_id, seat_id).await;
                return Err(BookingError::NotFound("Seat not found".to_string()));
            }
            Ok(_) => {}
            Err(e) => {
                // The store stays authoritative; let the next read go to it.
                self.seats.invalidate_seat(screening_id, seat_id).await;
                return Err(e.into());
            }
        }

        if self.seats.policy().invalidate_collection_on_reserve {
            self.seats.invalidate_collection(screening_id).await;
        }

        Ok(Reservation {
            screening_id: screening_id.to_string(),
            seat_id: seat_id.to_string(),
            actor_id: actor_id.to_string(),
            reserved_at: Utc::now(),
        })
    }

    /// Store status of a seat whose cached status was `cached`.
    ///
    /// Every commit happens under the seat lock, so this read is current; the
    /// cache entry may have been refilled by an unlocked reader or pinned by an
    /// attempt that never reached the store.
    async fn current_status(
        &self,
        screening_id: &str,
        seat_id: &str,
        cached: SeatStatus,
    ) -> BookingResult<SeatStatus> {
        match self.store.get_seat_status(screening_id, seat_id).await {
            Ok(Some(status)) => {
                if status != cached {
                    warn!(
                        "Cache shows seat {} for screening {} {} but store has {}",
                        seat_id, screening_id, cached, status
                    );
                }
                Ok(status)
            }
            Ok(None) => {
                self.seats.invalidate_seat(screening_id, seat_id).await;
                Err(BookingError::NotFound("Seat not found".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
