use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use marquee_api::{app, AppState};
use marquee_core::catalog::{Movie, Screening};
use marquee_core::{CachePolicy, SeatStatus};
use marquee_store::{InMemorySeatCache, InMemorySeatRepository};
use serde_json::{json, Value};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: InMemorySeatRepository,
    cache: InMemorySeatCache,
}

fn test_app() -> TestApp {
    let store = InMemorySeatRepository::new()
        .with_seat("S1", "A", SeatStatus::Available)
        .with_seat("S1", "B", SeatStatus::Reserved)
        .with_movie(Movie {
            id: "M1".into(),
            title: "Metropolis".into(),
            duration_minutes: Some(153),
        })
        .with_screening(Screening {
            id: "S1".into(),
            movie_id: "M1".into(),
            hall: Some("Hall 1".into()),
            starts_at: Utc.with_ymd_and_hms(2026, 1, 1, 19, 30, 0).unwrap(),
        });
    let cache = InMemorySeatCache::new();

    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(cache.clone()),
        Arc::new(store.clone()),
        CachePolicy::default(),
    );

    TestApp {
        router: app(state),
        store,
        cache,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn reserve(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/seats/reserve")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_list_seats_returns_ordered_snapshots_and_caches() {
    let t = test_app();

    let (status, body) = send(&t.router, get("/api/seats/S1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"seatId": "A", "status": "available"},
            {"seatId": "B", "status": "reserved"}
        ])
    );

    let (status, again) = send(&t.router, get("/api/seats/S1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again, body);
    assert_eq!(t.store.calls().list_seats.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unknown_screening_is_404_with_reason() {
    let t = test_app();

    let (status, body) = send(&t.router, get("/api/seats/NOPE")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "not_found");
}

#[tokio::test]
async fn test_reserve_then_status_reads_reserved() {
    let t = test_app();

    let (status, body) = send(
        &t.router,
        reserve(json!({"screenId": "S1", "seatId": "A", "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Seat reserved successfully");
    assert_eq!(body["reservation"]["actorId"], "u1");

    let (status, body) = send(&t.router, get("/api/seats/S1/A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "reserved");
    assert_eq!(t.store.status_of("S1", "A"), Some(SeatStatus::Reserved));
}

#[tokio::test]
async fn test_reserve_rejections_carry_distinct_reasons() {
    let t = test_app();

    let (status, body) = send(&t.router, reserve(json!({"screenId": "S1", "seatId": "A"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation_error");

    let (status, body) = send(
        &t.router,
        reserve(json!({"screenId": "S1", "seatId": "B", "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["reason"], "already_reserved");

    let (status, body) = send(
        &t.router,
        reserve(json!({"screenId": "S1", "seatId": "Z", "userId": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["reason"], "not_found");
    assert!(!t.cache.contains("lock:S1:Z"));
}

#[tokio::test]
async fn test_held_lock_maps_to_423() {
    use marquee_core::repository::SeatCache;

    let t = test_app();
    t.cache
        .set_if_absent("lock:S1:A", "other-request", Duration::from_secs(30))
        .await
        .unwrap();

    let (status, body) = send(
        &t.router,
        reserve(json!({"screenId": "S1", "seatId": "A", "userId": "u2"})),
    )
    .await;
    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["reason"], "seat_locked");
    assert_eq!(t.store.status_of("S1", "A"), Some(SeatStatus::Available));
}

#[tokio::test]
async fn test_malformed_body_is_a_validation_error() {
    let t = test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/seats/reserve")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&t.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["reason"], "validation_error");
}

#[tokio::test]
async fn test_store_outage_is_503() {
    let t = test_app();
    t.store.set_offline(true);

    let (status, body) = send(&t.router, get("/api/seats/S1")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["reason"], "transient");
}

#[tokio::test]
async fn test_catalog_listings() {
    let t = test_app();

    let (status, body) = send(&t.router, get("/api/movies")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["title"], "Metropolis");

    let (status, body) = send(&t.router, get("/api/screens/M1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], "S1");
    assert_eq!(body[0]["hall"], "Hall 1");

    let (status, body) = send(&t.router, get("/api/screens/M2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_health_greets_the_load_balancer() {
    let t = test_app();

    let response = t.router.clone().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Hello Load Balancer!");
}
