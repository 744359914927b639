use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::text_enum::text_enum;

text_enum! {
    /// Per-showtime state of a seat. `Available` is never stored: a seat with
    /// no `seat_status` row is available.
    pub enum SeatState {
        Available => "available",
        Reserved => "reserved",
        Booked => "booked",
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Seat {
    pub seat_id: i64,
    pub theater_id: i64,
    pub seat_row: String,
    pub seat_number: i32,
    pub seat_type: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// One cell of a showtime's seat map.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SeatMapEntry {
    pub seat_id: i64,
    pub seat_row: String,
    pub seat_number: i32,
    pub seat_type: String,
    pub status: SeatState,
    pub booking_id: Option<i64>,
    pub reserved_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSeatRequest {
    #[validate(range(min = 1))]
    pub theater_id: i64,
    #[validate(length(min = 1, max = 5))]
    pub seat_row: String,
    #[validate(range(min = 1))]
    pub seat_number: i32,
    #[validate(length(min = 1, max = 20))]
    pub seat_type: Option<String>,
}

/// Creates `seats_per_row` seats, numbered from 1, in each listed row.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkCreateSeatsRequest {
    #[validate(range(min = 1))]
    pub theater_id: i64,
    #[validate(length(min = 1, message = "at least one row is required"))]
    pub rows: Vec<String>,
    #[validate(range(min = 1, max = 200))]
    pub seats_per_row: i32,
    #[validate(length(min = 1, max = 20))]
    pub seat_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BulkCreateSeatsResult {
    pub created: u32,
    pub skipped: u32,
    pub total: u32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSeatRequest {
    #[validate(length(min = 1, max = 20))]
    pub seat_type: Option<String>,
    pub is_active: Option<bool>,
}

pub const DEFAULT_SEAT_TYPE: &str = "standard";

#[derive(Debug, Default, Deserialize)]
pub struct SeatFilter {
    pub theater_id: Option<i64>,
    pub is_active: Option<bool>,
}
