//! Cache key scheme. All keys share one logical namespace.

/// Seat collection of a screening.
pub fn seats_key(screening_id: &str) -> String {
    format!("seats:{}", screening_id)
}

/// Status of a single seat.
pub fn seat_key(screening_id: &str, seat_id: &str) -> String {
    format!("seat:{}:{}", screening_id, seat_id)
}

/// Reservation lock of a single seat. Only its presence matters.
pub fn lock_key(screening_id: &str, seat_id: &str) -> String {
    format!("lock:{}:{}", screening_id, seat_id)
}
