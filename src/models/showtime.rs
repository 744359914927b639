use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Showtime {
    pub showtime_id: i64,
    pub movie_id: i64,
    pub theater_id: i64,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price: f64,
    pub available_seats: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Showtime joined with movie, theater and cinema names for listings.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShowtimeDetails {
    pub showtime_id: i64,
    pub movie_id: i64,
    pub movie_title: String,
    pub theater_id: i64,
    pub theater_name: String,
    pub cinema_id: i64,
    pub cinema_name: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub end_time: NaiveTime,
    pub price: f64,
    pub available_seats: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateShowtimeRequest {
    #[validate(range(min = 1))]
    pub movie_id: i64,
    #[validate(range(min = 1))]
    pub theater_id: i64,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub end_time: NaiveTime,
    #[validate(custom(function = "validate_price_value"))]
    pub price: f64,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateShowtimeRequest {
    pub show_date: Option<NaiveDate>,
    pub show_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    #[validate(custom(function = "validate_price_value"))]
    pub price: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShowtimeFilter {
    pub movie_id: Option<i64>,
    pub theater_id: Option<i64>,
    pub show_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

// validator 0.20 passes Copy fields by value to custom validators.
fn validate_price_value(price: f64) -> Result<(), ValidationError> {
    validate_price(&price)
}

fn validate_price(price: &f64) -> Result<(), ValidationError> {
    if price.is_finite() && *price >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("price").with_message("price must be a non-negative number".into()))
    }
}
