use marquee_booking::{ReservationCoordinator, SeatCacheManager};
use marquee_core::repository::{CatalogRepository, SeatCache, SeatRepository};
use marquee_core::CachePolicy;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub seats: Arc<SeatCacheManager>,
    pub reservations: Arc<ReservationCoordinator>,
    pub catalog: Arc<dyn CatalogRepository>,
}

impl AppState {
    /// Wires the seat services over one store and one cache namespace.
    pub fn new(
        store: Arc<dyn SeatRepository>,
        cache: Arc<dyn SeatCache>,
        catalog: Arc<dyn CatalogRepository>,
        policy: CachePolicy,
    ) -> Self {
        let seats = Arc::new(SeatCacheManager::new(store.clone(), cache.clone(), policy));
        let reservations = Arc::new(ReservationCoordinator::new(store, cache, seats.clone()));
        Self {
            seats,
            reservations,
            catalog,
        }
    }
}
