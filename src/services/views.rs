//! Read-only booking and seat views. These run outside any writer's
//! transaction and may be momentarily stale.

use std::collections::BTreeMap;

use sqlx::FromRow;

use crate::cache::CacheService;
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::booking::BookingDetails;
use crate::models::{BookingSeat, SeatMapEntry};

const DETAILS_SELECT: &str = "
    SELECT b.booking_id, b.booking_code, b.user_id, b.showtime_id,
           m.title AS movie_title, c.cinema_name, t.theater_name,
           st.show_date, st.show_time,
           b.total_amount, b.booking_status, b.payment_status, b.booking_date
    FROM bookings b
    JOIN showtimes st ON st.showtime_id = b.showtime_id
    JOIN movies m ON m.movie_id = st.movie_id
    JOIN theaters t ON t.theater_id = st.theater_id
    JOIN cinemas c ON c.cinema_id = t.cinema_id";

#[derive(Debug, FromRow)]
struct SeatLine {
    booking_id: i64,
    #[sqlx(flatten)]
    seat: BookingSeat,
}

#[derive(Clone)]
pub struct ViewService {
    db: Database,
    cache: CacheService,
}

impl ViewService {
    pub fn new(db: Database, cache: CacheService) -> Self {
        Self { db, cache }
    }

    pub async fn booking_detail(&self, booking_id: i64) -> ServiceResult<BookingDetails> {
        let booking = sqlx::query_as::<_, BookingDetails>(&format!(
            "{DETAILS_SELECT} WHERE b.booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Booking", booking_id))?;

        let mut bookings = self.attach_seats(vec![booking]).await?;
        bookings
            .pop()
            .ok_or_else(|| ServiceError::Internal("booking vanished while loading seats".into()))
    }

    /// Every booking, newest first.
    pub async fn all_bookings(&self) -> ServiceResult<Vec<BookingDetails>> {
        let bookings = sqlx::query_as::<_, BookingDetails>(&format!(
            "{DETAILS_SELECT} ORDER BY b.booking_date DESC, b.booking_id DESC"
        ))
        .fetch_all(&self.db.pool)
        .await?;

        self.attach_seats(bookings).await
    }

    /// The user's live (pending or confirmed) bookings, newest first.
    pub async fn user_bookings(&self, user_id: i64) -> ServiceResult<Vec<BookingDetails>> {
        let bookings = sqlx::query_as::<_, BookingDetails>(&format!(
            "{DETAILS_SELECT}
             WHERE b.user_id = $1 AND b.booking_status IN ('pending', 'confirmed')
             ORDER BY b.booking_date DESC, b.booking_id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.db.pool)
        .await?;

        self.attach_seats(bookings).await
    }

    pub async fn seat_map(&self, showtime_id: i64) -> ServiceResult<Vec<SeatMapEntry>> {
        self.cache.seat_map(showtime_id).await
    }

    async fn attach_seats(
        &self,
        mut bookings: Vec<BookingDetails>,
    ) -> ServiceResult<Vec<BookingDetails>> {
        if bookings.is_empty() {
            return Ok(bookings);
        }

        let ids: Vec<i64> = bookings.iter().map(|b| b.booking_id).collect();
        let lines = sqlx::query_as::<_, SeatLine>(
            "SELECT bs.booking_id, s.seat_id, s.seat_row, s.seat_number, bs.price
             FROM booking_seats bs
             JOIN seats s ON s.seat_id = bs.seat_id
             WHERE bs.booking_id = ANY($1)
             ORDER BY s.seat_row, s.seat_number",
        )
        .bind(&ids)
        .fetch_all(&self.db.pool)
        .await?;

        let mut by_booking: BTreeMap<i64, Vec<BookingSeat>> = BTreeMap::new();
        for line in lines {
            by_booking.entry(line.booking_id).or_default().push(line.seat);
        }

        for booking in &mut bookings {
            booking.seats = by_booking.remove(&booking.booking_id).unwrap_or_default();
        }

        Ok(bookings)
    }
}
