pub mod error;
pub mod lock;
pub mod reservation;
pub mod seat_cache;

pub use error::{BookingError, BookingResult, ConflictReason};
pub use lock::SeatLock;
pub use reservation::{Reservation, ReservationCoordinator};
pub use seat_cache::SeatCacheManager;
