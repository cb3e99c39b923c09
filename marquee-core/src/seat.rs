use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Seat availability. Transitions only from `Available` to `Reserved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Reserved,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Reserved => "reserved",
        }
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self, SeatStatus::Reserved)
    }
}

impl fmt::Display for SeatStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown seat status: {0:?}")]
pub struct UnknownSeatStatus(pub String);

impl FromStr for SeatStatus {
    type Err = UnknownSeatStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(SeatStatus::Available),
            "reserved" => Ok(SeatStatus::Reserved),
            other => Err(UnknownSeatStatus(other.to_string())),
        }
    }
}

/// One seat of a screening as observed at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatSnapshot {
    pub seat_id: String,
    pub status: SeatStatus,
}

impl SeatSnapshot {
    pub fn new(seat_id: impl Into<String>, status: SeatStatus) -> Self {
        Self {
            seat_id: seat_id.into(),
            status,
        }
    }
}
