use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::text_enum::text_enum;

text_enum! {
    /// Lifecycle of a booking. `Cancelled` is terminal.
    pub enum BookingStatus {
        Pending => "pending",
        Confirmed => "confirmed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
        Refunded => "refunded",
    }
}

impl BookingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: i64,
    pub user_id: i64,
    pub showtime_id: i64,
    pub booking_date: DateTime<Utc>,
    pub total_amount: f64,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub booking_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A seat line item with the price locked in when the booking was made.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BookingSeat {
    pub seat_id: i64,
    pub seat_row: String,
    pub seat_number: i32,
    pub price: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(range(min = 1, message = "showtime_id must be positive"))]
    pub showtime_id: i64,
    #[validate(length(min = 1, message = "at least one seat is required"))]
    pub seat_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatedBooking {
    pub booking_id: i64,
    pub booking_code: String,
    pub total_amount: f64,
}

/// Booking joined with its showtime, movie, theater and cinema.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingDetails {
    pub booking_id: i64,
    pub booking_code: String,
    pub user_id: i64,
    pub showtime_id: i64,
    pub movie_title: String,
    pub cinema_name: String,
    pub theater_name: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub total_amount: f64,
    pub booking_status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub booking_date: DateTime<Utc>,
    #[sqlx(skip)]
    pub seats: Vec<BookingSeat>,
}
