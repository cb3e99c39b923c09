use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use marquee_booking::Reservation;
use marquee_core::{SeatSnapshot, SeatStatus};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Ids may arrive as strings or numbers; anything else counts as missing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSeatRequest {
    #[serde(default, deserialize_with = "lenient_id")]
    pub screen_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub seat_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub user_id: Option<String>,
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[derive(Debug, Serialize)]
pub struct ReserveSeatResponse {
    pub message: String,
    pub reservation: Reservation,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatStatusResponse {
    pub screening_id: String,
    pub seat_id: String,
    pub status: SeatStatus,
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/seats/reserve", post(reserve_seat))
        .route("/api/seats/{screen_id}", get(list_seats))
        .route("/api/seats/{screen_id}/{seat_id}", get(seat_status))
}

/// GET /api/seats/{screen_id}
async fn list_seats(
    State(state): State<AppState>,
    Path(screen_id): Path<String>,
) -> Result<Json<Vec<SeatSnapshot>>, AppError> {
    let seats = state.seats.get_seats_for_screening(&screen_id).await?;
    Ok(Json(seats))
}

/// GET /api/seats/{screen_id}/{seat_id}
async fn seat_status(
    State(state): State<AppState>,
    Path((screen_id, seat_id)): Path<(String, String)>,
) -> Result<Json<SeatStatusResponse>, AppError> {
    let status = state.seats.get_seat_status(&screen_id, &seat_id).await?;
    Ok(Json(SeatStatusResponse {
        screening_id: screen_id,
        seat_id,
        status,
    }))
}

/// POST /api/seats/reserve
async fn reserve_seat(
    State(state): State<AppState>,
    body: Result<Json<ReserveSeatRequest>, JsonRejection>,
) -> Result<Json<ReserveSeatResponse>, AppError> {
    let Json(req) = body.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

    let reservation = state
        .reservations
        .reserve_seat(
            req.screen_id.as_deref().unwrap_or_default(),
            req.seat_id.as_deref().unwrap_or_default(),
            req.user_id.as_deref().unwrap_or_default(),
        )
        .await?;

    Ok(Json(ReserveSeatResponse {
        message: "Seat reserved successfully".to_string(),
        reservation,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_request_accepts_numeric_ids() {
        let req: ReserveSeatRequest =
            serde_json::from_str(r#"{"screenId": 7, "seatId": "A1", "userId": null}"#).unwrap();
        assert_eq!(req.screen_id.as_deref(), Some("7"));
        assert_eq!(req.seat_id.as_deref(), Some("A1"));
        assert_eq!(req.user_id, None);

        let empty: ReserveSeatRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.screen_id.is_none());
    }
}
