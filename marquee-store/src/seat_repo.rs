use async_trait::async_trait;
use marquee_core::repository::SeatRepository;
use marquee_core::{SeatSnapshot, SeatStatus, StoreError, StoreResult};
use sqlx::PgPool;

use crate::database::store_error;

pub struct PostgresSeatRepository {
    pool: PgPool,
}

impl PostgresSeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SeatRow {
    seat_id: String,
    status: String,
}

fn parse_status(raw: &str) -> StoreResult<SeatStatus> {
    raw.parse::<SeatStatus>()
        .map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl SeatRepository for PostgresSeatRepository {
    async fn list_seats(&self, screening_id: &str) -> StoreResult<Vec<SeatSnapshot>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            "SELECT seat_id, status FROM seats WHERE screening_id = $1 ORDER BY seat_id ASC",
        )
        .bind(screening_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.into_iter()
            .map(|row| Ok(SeatSnapshot::new(row.seat_id, parse_status(&row.status)?)))
            .collect()
    }

    async fn get_seat_status(
        &self,
        screening_id: &str,
        seat_id: &str,
    ) -> StoreResult<Option<SeatStatus>> {
        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM seats WHERE screening_id = $1 AND seat_id = $2",
        )
        .bind(screening_id)
        .bind(seat_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        status.as_deref().map(parse_status).transpose()
    }

    async fn set_seat_status(
        &self,
        screening_id: &str,
        seat_id: &str,
        status: SeatStatus,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE seats SET status = $1, updated_at = NOW() WHERE screening_id = $2 AND seat_id = $3",
        )
        .bind(status.as_str())
        .bind(screening_id)
        .bind(seat_id)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected())
    }
}
