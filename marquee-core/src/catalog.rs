use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub duration_minutes: Option<i32>,
}

/// A single showing of a movie in a hall.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screening {
    pub id: String,
    pub movie_id: String,
    pub hall: Option<String>,
    pub starts_at: DateTime<Utc>,
}
