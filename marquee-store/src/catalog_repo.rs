use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_core::catalog::{Movie, Screening};
use marquee_core::repository::CatalogRepository;
use marquee_core::StoreResult;
use sqlx::PgPool;

use crate::database::store_error;

pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: String,
    title: String,
    duration_minutes: Option<i32>,
}

#[derive(sqlx::FromRow)]
struct ScreeningRow {
    id: String,
    movie_id: String,
    hall: Option<String>,
    starts_at: DateTime<Utc>,
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(
            "SELECT id, title, duration_minutes FROM movies ORDER BY title ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows
            .into_iter()
            .map(|row| Movie {
                id: row.id,
                title: row.title,
                duration_minutes: row.duration_minutes,
            })
            .collect())
    }

    async fn list_screenings(&self, movie_id: &str) -> StoreResult<Vec<Screening>> {
        let rows = sqlx::query_as::<_, ScreeningRow>(
            "SELECT id, movie_id, hall, starts_at FROM screenings WHERE movie_id = $1 ORDER BY starts_at ASC",
        )
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(rows
            .into_iter()
            .map(|row| Screening {
                id: row.id,
                movie_id: row.movie_id,
                hall: row.hall,
                starts_at: row.starts_at,
            })
            .collect())
    }
}
