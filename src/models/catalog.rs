use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub movie_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub subtitle: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "duration must be at least one minute"))]
    pub duration_minutes: i32,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(length(max = 50))]
    pub language: Option<String>,
    #[validate(length(max = 50))]
    pub subtitle: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateMovieRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 100))]
    pub genre: Option<String>,
    #[validate(length(max = 50))]
    pub language: Option<String>,
    #[validate(length(max = 50))]
    pub subtitle: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cinema {
    pub cinema_id: i64,
    pub cinema_name: String,
    pub address: String,
    pub city: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCinemaRequest {
    #[validate(length(min = 1, max = 255))]
    pub cinema_name: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateCinemaRequest {
    #[validate(length(min = 1, max = 255))]
    pub cinema_name: Option<String>,
    #[validate(length(min = 1))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Theater {
    pub theater_id: i64,
    pub cinema_id: i64,
    pub theater_name: String,
    pub total_seats: i32,
    pub theater_type: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTheaterRequest {
    #[validate(range(min = 1))]
    pub cinema_id: i64,
    #[validate(length(min = 1, max = 100))]
    pub theater_name: String,
    #[validate(range(min = 1, message = "a theater needs at least one seat"))]
    pub total_seats: i32,
    #[validate(length(max = 20))]
    pub theater_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTheaterRequest {
    #[validate(length(min = 1, max = 100))]
    pub theater_name: Option<String>,
    #[validate(length(max = 20))]
    pub theater_type: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovieFilter {
    pub is_active: Option<bool>,
    pub genre: Option<String>,
}

impl MovieFilter {
    pub fn is_empty(&self) -> bool {
        self.is_active.is_none() && self.genre.is_none()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CinemaFilter {
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TheaterFilter {
    pub cinema_id: Option<i64>,
    pub is_active: Option<bool>,
}
