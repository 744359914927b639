#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDate, NaiveTime};
use fake::faker::address::en::{CityName, StreetName};
use fake::faker::company::en::CompanyName;
use fake::Fake;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use cinema_booking::auth::{JwtAuthenticator, ROLE_ADMIN, ROLE_USER};
use cinema_booking::cache::CacheService;
use cinema_booking::config::Config;
use cinema_booking::database::Database;
use cinema_booking::models::catalog::{CreateCinemaRequest, CreateMovieRequest, CreateTheaterRequest};
use cinema_booking::models::seat::{BulkCreateSeatsRequest, SeatFilter};
use cinema_booking::models::showtime::CreateShowtimeRequest;
use cinema_booking::AppState;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";
pub const TICKET_PRICE: f64 = 90.0;

pub fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://localhost/cinema_test".to_string()),
        "JWT_SECRET" => Some(TEST_JWT_SECRET.to_string()),
        _ => None,
    })
    .expect("test config")
}

/// App state over the `#[sqlx::test]` pool, with caching disabled.
pub fn test_state(pool: PgPool) -> Arc<AppState> {
    let db = Database::from_pool(pool);
    let cache = CacheService::disabled(db.clone());
    let auth = Arc::new(JwtAuthenticator::new(TEST_JWT_SECRET));
    AppState::new(test_config(), db, cache, auth)
}

pub fn build_test_app(state: Arc<AppState>) -> Router {
    cinema_booking::app(state)
}

pub fn user_token(user_id: i64) -> String {
    JwtAuthenticator::new(TEST_JWT_SECRET)
        .issue(user_id, ROLE_USER, Duration::hours(1))
        .expect("sign user token")
}

pub fn admin_token(user_id: i64) -> String {
    JwtAuthenticator::new(TEST_JWT_SECRET)
        .issue(user_id, ROLE_ADMIN, Duration::hours(1))
        .expect("sign admin token")
}

/// A showtime in a freshly built theater.
#[derive(Debug, Clone)]
pub struct Screen {
    pub movie_id: i64,
    pub cinema_id: i64,
    pub theater_id: i64,
    pub showtime_id: i64,
    pub seat_ids: Vec<i64>,
}

/// Seeds a cinema with one theater of `rows x seats_per_row` seats and one
/// showtime at [`TICKET_PRICE`].
pub async fn seed_screen(state: &AppState, rows: &[&str], seats_per_row: i32) -> Screen {
    let catalog = &state.catalog;

    let movie = catalog
        .create_movie(CreateMovieRequest {
            title: CompanyName().fake(),
            description: None,
            duration_minutes: 120,
            genre: Some("Drama".to_string()),
            language: Some("English".to_string()),
            subtitle: None,
            poster_url: None,
            release_date: None,
        })
        .await
        .expect("create movie");

    let cinema = catalog
        .create_cinema(CreateCinemaRequest {
            cinema_name: format!("{} Cinema", CompanyName().fake::<String>()),
            address: StreetName().fake(),
            city: CityName().fake(),
        })
        .await
        .expect("create cinema");

    let total_seats = rows.len() as i32 * seats_per_row;
    let theater = catalog
        .create_theater(CreateTheaterRequest {
            cinema_id: cinema.cinema_id,
            theater_name: "Hall 1".to_string(),
            total_seats,
            theater_type: None,
        })
        .await
        .expect("create theater");

    catalog
        .bulk_create_seats(BulkCreateSeatsRequest {
            theater_id: theater.theater_id,
            rows: rows.iter().map(|r| r.to_string()).collect(),
            seats_per_row,
            seat_type: None,
        })
        .await
        .expect("create seats");

    let showtime = catalog
        .create_showtime(CreateShowtimeRequest {
            movie_id: movie.movie_id,
            theater_id: theater.theater_id,
            show_date: NaiveDate::from_ymd_opt(2030, 1, 15).expect("date"),
            show_time: NaiveTime::from_hms_opt(19, 0, 0).expect("time"),
            end_time: NaiveTime::from_hms_opt(21, 0, 0).expect("time"),
            price: TICKET_PRICE,
        })
        .await
        .expect("create showtime");

    let seat_ids = catalog
        .list_seats(&SeatFilter {
            theater_id: Some(theater.theater_id),
            is_active: None,
        })
        .await
        .expect("list seats")
        .into_iter()
        .map(|seat| seat.seat_id)
        .collect();

    Screen {
        movie_id: movie.movie_id,
        cinema_id: cinema.cinema_id,
        theater_id: theater.theater_id,
        showtime_id: showtime.showtime_id,
        seat_ids,
    }
}

pub async fn available_seats(pool: &PgPool, showtime_id: i64) -> i32 {
    sqlx::query_scalar("SELECT available_seats FROM showtimes WHERE showtime_id = $1")
        .bind(showtime_id)
        .fetch_one(pool)
        .await
        .expect("available_seats")
}

pub async fn seat_status_count(pool: &PgPool, showtime_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM seat_status WHERE showtime_id = $1")
        .bind(showtime_id)
        .fetch_one(pool)
        .await
        .expect("seat_status count")
}

/// Sends a request and returns the status with the parsed JSON body
/// (`Value::Null` for an empty or non-JSON body).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    };

    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
