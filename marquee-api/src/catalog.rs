use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use marquee_core::catalog::{Movie, Screening};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health))
        .route("/api/movies", get(list_movies))
        .route("/api/screens/{movie_id}", get(list_screenings))
}

/// Load balancer health check.
async fn health() -> &'static str {
    "Hello Load Balancer!"
}

/// GET /api/movies
async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<Movie>>, AppError> {
    Ok(Json(state.catalog.list_movies().await?))
}

/// GET /api/screens/{movie_id}
async fn list_screenings(
    State(state): State<AppState>,
    Path(movie_id): Path<String>,
) -> Result<Json<Vec<Screening>>, AppError> {
    Ok(Json(state.catalog.list_screenings(&movie_id).await?))
}
