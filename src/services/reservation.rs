use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::CacheService;
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::booking::CreatedBooking;
use crate::services::inventory;

const BOOKING_CODE_ATTEMPTS: usize = 5;

/// `BK` + UTC date + 8 uppercase hex characters.
pub fn generate_booking_code(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("BK{}{}", now.format("%Y%m%d"), random[..8].to_uppercase())
}

fn validate_seat_ids(seat_ids: &[i64]) -> ServiceResult<()> {
    if seat_ids.is_empty() {
        return Err(ServiceError::Validation("At least one seat is required".into()));
    }
    if let Some(bad) = seat_ids.iter().find(|&&id| id <= 0) {
        return Err(ServiceError::Validation(format!("Invalid seat id {bad}")));
    }
    let mut seen = HashSet::with_capacity(seat_ids.len());
    if let Some(dup) = seat_ids.iter().find(|&&id| !seen.insert(id)) {
        return Err(ServiceError::Validation(format!("Seat {dup} is listed more than once")));
    }
    Ok(())
}

/// Creates pending bookings that hold seats for a limited time.
#[derive(Clone)]
pub struct ReservationEngine {
    db: Database,
    cache: CacheService,
}

impl ReservationEngine {
    pub fn new(db: Database, cache: CacheService) -> Self {
        Self { db, cache }
    }

    pub async fn create_booking(
        &self,
        user_id: i64,
        showtime_id: i64,
        seat_ids: &[i64],
    ) -> ServiceResult<CreatedBooking> {
        self.create_booking_at(user_id, showtime_id, seat_ids, Utc::now())
            .await
    }

    /// Same as [`create_booking`](Self::create_booking) with an explicit clock.
    ///
    /// The whole check-and-hold runs under the showtime's row lock, so two
    /// requests for the same showtime are decided one after the other.
    pub async fn create_booking_at(
        &self,
        user_id: i64,
        showtime_id: i64,
        seat_ids: &[i64],
        now: DateTime<Utc>,
    ) -> ServiceResult<CreatedBooking> {
        validate_seat_ids(seat_ids)?;

        let mut tx = self.db.pool.begin().await?;

        let showtime = inventory::lock_showtime(&mut tx, showtime_id)
            .await?
            .filter(|showtime| showtime.is_active)
            .ok_or_else(|| ServiceError::not_found("Showtime", showtime_id))?;

        let requested = seat_ids.len();
        if requested > usize::try_from(showtime.available_seats).unwrap_or(0) {
            return Err(ServiceError::CapacityExceeded {
                requested,
                available: showtime.available_seats,
            });
        }

        if let Some(seat_id) =
            inventory::first_seat_confirmed_by_user(&mut tx, user_id, showtime_id, seat_ids).await?
        {
            return Err(ServiceError::DuplicateConfirmedBooking { seat_id });
        }

        inventory::ensure_seats_in_theater(&mut tx, showtime.theater_id, seat_ids).await?;

        if let Some(seat_id) = inventory::first_unavailable_seat(&mut tx, showtime_id, seat_ids).await? {
            return Err(ServiceError::SeatUnavailable { seat_id });
        }

        // Bounded by available_seats above, so it fits in i32.
        let count = requested as i32;
        let total_amount = showtime.price * f64::from(count);

        let (booking_id, booking_code) =
            insert_booking(&mut tx, user_id, showtime_id, total_amount, now).await?;

        sqlx::query(
            "INSERT INTO booking_seats (booking_id, seat_id, price)
             SELECT $1, seat_id, $2 FROM unnest($3::BIGINT[]) AS seat_id",
        )
        .bind(booking_id)
        .bind(showtime.price)
        .bind(seat_ids)
        .execute(&mut *tx)
        .await?;

        inventory::hold_seats(
            &mut tx,
            showtime_id,
            booking_id,
            seat_ids,
            inventory::hold_deadline(now),
        )
        .await?;
        inventory::adjust_available(&mut tx, showtime_id, -count).await?;

        tx.commit().await?;

        self.cache.invalidate_seat_map(showtime_id).await;
        info!(booking_id, %booking_code, showtime_id, user_id, seats = count, "Booking created");

        Ok(CreatedBooking {
            booking_id,
            booking_code,
            total_amount,
        })
    }
}

async fn insert_booking(
    conn: &mut PgConnection,
    user_id: i64,
    showtime_id: i64,
    total_amount: f64,
    now: DateTime<Utc>,
) -> ServiceResult<(i64, String)> {
    for attempt in 1..=BOOKING_CODE_ATTEMPTS {
        let code = generate_booking_code(now);
        let booking_id: Option<i64> = sqlx::query_scalar(
            "INSERT INTO bookings
                 (user_id, showtime_id, booking_date, total_amount,
                  booking_status, payment_status, booking_code)
             VALUES ($1, $2, $3, $4, 'pending', 'pending', $5)
             ON CONFLICT (booking_code) DO NOTHING
             RETURNING booking_id",
        )
        .bind(user_id)
        .bind(showtime_id)
        .bind(now)
        .bind(total_amount)
        .bind(&code)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(booking_id) = booking_id {
            return Ok((booking_id, code));
        }
        warn!(attempt, %code, "Booking code collision, retrying");
    }

    Err(ServiceError::Internal(
        "Could not generate a unique booking code".into(),
    ))
}
