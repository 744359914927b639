use sqlx::PgConnection;
use tracing::info;

use crate::cache::CacheService;
use crate::database::Database;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Booking, BookingStatus, PaymentStatus};
use crate::services::inventory;

pub(crate) const BOOKING_COLUMNS: &str = "booking_id, user_id, showtime_id, booking_date, total_amount, \
     booking_status, payment_status, booking_code, created_at, updated_at";

pub(crate) async fn lock_booking(conn: &mut PgConnection, booking_id: i64) -> ServiceResult<Booking> {
    sqlx::query_as::<_, Booking>(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = $1 FOR UPDATE"
    ))
    .bind(booking_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| ServiceError::not_found("Booking", booking_id))
}

/// Moves bookings from pending to confirmed or cancelled.
#[derive(Clone)]
pub struct LifecycleManager {
    db: Database,
    cache: CacheService,
}

impl LifecycleManager {
    pub fn new(db: Database, cache: CacheService) -> Self {
        Self { db, cache }
    }

    pub async fn get_booking(&self, booking_id: i64) -> ServiceResult<Booking> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.db.pool)
        .await?
        .ok_or_else(|| ServiceError::not_found("Booking", booking_id))
    }

    /// Marks the booking paid and confirmed and turns its holds into booked
    /// seats, in one transaction.
    pub async fn confirm_payment(&self, booking_id: i64) -> ServiceResult<Booking> {
        let mut tx = self.db.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id).await?;
        if booking.booking_status.is_terminal() {
            return Err(ServiceError::InvalidState(
                "Cannot confirm payment for a cancelled booking".into(),
            ));
        }
        if booking.payment_status == PaymentStatus::Paid {
            return Err(ServiceError::InvalidState("Booking is already paid".into()));
        }

        let confirmed = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings
             SET payment_status = 'paid', booking_status = 'confirmed', updated_at = NOW()
             WHERE booking_id = $1
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;

        let seats = inventory::mark_booked(&mut tx, booking_id).await?;

        tx.commit().await?;

        self.cache.invalidate_seat_map(confirmed.showtime_id).await;
        info!(booking_id, showtime_id = confirmed.showtime_id, seats, "Payment confirmed");

        Ok(confirmed)
    }

    /// Cancels a pending booking and returns its seats to the showtime.
    pub async fn cancel_booking(&self, booking_id: i64) -> ServiceResult<Booking> {
        let mut tx = self.db.pool.begin().await?;

        let booking = lock_booking(&mut tx, booking_id).await?;
        match booking.booking_status {
            BookingStatus::Pending => {}
            status => {
                return Err(ServiceError::InvalidState(format!(
                    "Cannot cancel a {status} booking"
                )));
            }
        }

        inventory::lock_showtime(&mut tx, booking.showtime_id).await?;

        let cancelled = sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings
             SET booking_status = 'cancelled', updated_at = NOW()
             WHERE booking_id = $1
             RETURNING {BOOKING_COLUMNS}"
        ))
        .bind(booking_id)
        .fetch_one(&mut *tx)
        .await?;

        let released = inventory::release_booking_seats(&mut tx, booking_id).await?;
        inventory::adjust_available(&mut tx, booking.showtime_id, released).await?;

        tx.commit().await?;

        self.cache.invalidate_seat_map(booking.showtime_id).await;
        info!(booking_id, showtime_id = booking.showtime_id, released, "Booking cancelled");

        Ok(cancelled)
    }
}
