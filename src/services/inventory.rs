//! Per-showtime seat inventory.
//!
//! Every mutating function here takes the caller's open transaction and
//! assumes the showtime row is already locked by [`lock_showtime`] (or
//! [`lock_showtimes`]). Nothing here commits.

use chrono::{DateTime, Duration, Utc};
use sqlx::{FromRow, PgConnection, PgPool};

use crate::error::{ServiceError, ServiceResult};
use crate::models::SeatMapEntry;

/// How long a pending booking holds its seats.
pub const HOLD_MINUTES: i64 = 15;

pub fn hold_deadline(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(HOLD_MINUTES)
}

#[derive(Debug, Clone, FromRow)]
pub struct LockedShowtime {
    pub showtime_id: i64,
    pub theater_id: i64,
    pub price: f64,
    pub available_seats: i32,
    pub is_active: bool,
}

#[derive(Debug, FromRow)]
struct SeatRef {
    seat_id: i64,
    theater_id: i64,
    is_active: bool,
}

/// Takes the row lock that serialises all writers for one showtime.
pub async fn lock_showtime(
    conn: &mut PgConnection,
    showtime_id: i64,
) -> ServiceResult<Option<LockedShowtime>> {
    let showtime = sqlx::query_as::<_, LockedShowtime>(
        "SELECT showtime_id, theater_id, price, available_seats, is_active
         FROM showtimes
         WHERE showtime_id = $1
         FOR UPDATE",
    )
    .bind(showtime_id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(showtime)
}

/// Locks several showtimes in ascending id order.
pub async fn lock_showtimes(conn: &mut PgConnection, showtime_ids: &[i64]) -> ServiceResult<()> {
    if showtime_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        "SELECT showtime_id FROM showtimes
         WHERE showtime_id = ANY($1)
         ORDER BY showtime_id
         FOR UPDATE",
    )
    .bind(showtime_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(())
}

/// Checks that every requested seat exists, is active, and sits in `theater_id`.
pub async fn ensure_seats_in_theater(
    conn: &mut PgConnection,
    theater_id: i64,
    seat_ids: &[i64],
) -> ServiceResult<()> {
    let seats = sqlx::query_as::<_, SeatRef>(
        "SELECT seat_id, theater_id, is_active FROM seats WHERE seat_id = ANY($1)",
    )
    .bind(seat_ids)
    .fetch_all(&mut *conn)
    .await?;

    for &seat_id in seat_ids {
        match seats.iter().find(|seat| seat.seat_id == seat_id) {
            None => {
                return Err(ServiceError::Validation(format!("Seat {seat_id} does not exist")));
            }
            Some(seat) if seat.theater_id != theater_id => {
                return Err(ServiceError::Validation(format!(
                    "Seat {seat_id} does not belong to this showtime's theater"
                )));
            }
            Some(seat) if !seat.is_active => {
                return Err(ServiceError::Validation(format!("Seat {seat_id} is not active")));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

/// First requested seat (in request order) that `user_id` already holds
/// through a confirmed booking for this showtime.
pub async fn first_seat_confirmed_by_user(
    conn: &mut PgConnection,
    user_id: i64,
    showtime_id: i64,
    seat_ids: &[i64],
) -> ServiceResult<Option<i64>> {
    let seat_id = sqlx::query_scalar::<_, i64>(
        "SELECT req.seat_id
         FROM unnest($3::BIGINT[]) WITH ORDINALITY AS req(seat_id, ord)
         WHERE EXISTS (
             SELECT 1
             FROM booking_seats bs
             JOIN bookings b ON b.booking_id = bs.booking_id
             WHERE b.user_id = $1
               AND b.showtime_id = $2
               AND b.booking_status = 'confirmed'
               AND bs.seat_id = req.seat_id
         )
         ORDER BY req.ord
         LIMIT 1",
    )
    .bind(user_id)
    .bind(showtime_id)
    .bind(seat_ids)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(seat_id)
}

/// First requested seat that is confirmed for anyone or has a live
/// `seat_status` row in this showtime.
///
/// A reserved row whose `reserved_until` has passed still counts until the
/// reaper removes it.
pub async fn first_unavailable_seat(
    conn: &mut PgConnection,
    showtime_id: i64,
    seat_ids: &[i64],
) -> ServiceResult<Option<i64>> {
    let seat_id = sqlx::query_scalar::<_, i64>(
        "SELECT req.seat_id
         FROM unnest($2::BIGINT[]) WITH ORDINALITY AS req(seat_id, ord)
         WHERE EXISTS (
                 SELECT 1
                 FROM booking_seats bs
                 JOIN bookings b ON b.booking_id = bs.booking_id
                 WHERE b.showtime_id = $1
                   AND b.booking_status = 'confirmed'
                   AND bs.seat_id = req.seat_id
             )
            OR EXISTS (
                 SELECT 1 FROM seat_status ss
                 WHERE ss.showtime_id = $1 AND ss.seat_id = req.seat_id
             )
         ORDER BY req.ord
         LIMIT 1",
    )
    .bind(showtime_id)
    .bind(seat_ids)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(seat_id)
}

/// Inserts `reserved` rows owned by `booking_id`.
///
/// The unique (showtime, seat) constraint backs up the showtime lock: a seat
/// that somehow already has a row is reported as unavailable.
pub async fn hold_seats(
    conn: &mut PgConnection,
    showtime_id: i64,
    booking_id: i64,
    seat_ids: &[i64],
    reserved_until: DateTime<Utc>,
) -> ServiceResult<()> {
    let held: Vec<i64> = sqlx::query_scalar(
        "INSERT INTO seat_status (showtime_id, seat_id, status, booking_id, reserved_until)
         SELECT $1, seat_id, 'reserved', $2, $3
         FROM unnest($4::BIGINT[]) AS seat_id
         ON CONFLICT (showtime_id, seat_id) DO NOTHING
         RETURNING seat_id",
    )
    .bind(showtime_id)
    .bind(booking_id)
    .bind(reserved_until)
    .bind(seat_ids)
    .fetch_all(&mut *conn)
    .await?;

    if let Some(&seat_id) = seat_ids.iter().find(|id| !held.contains(id)) {
        return Err(ServiceError::SeatUnavailable { seat_id });
    }

    Ok(())
}

/// Turns the booking's holds into permanent `booked` rows.
pub async fn mark_booked(conn: &mut PgConnection, booking_id: i64) -> ServiceResult<u64> {
    let result = sqlx::query(
        "UPDATE seat_status
         SET status = 'booked', reserved_until = NULL, updated_at = NOW()
         WHERE booking_id = $1",
    )
    .bind(booking_id)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Deletes the booking's seat_status rows and returns how many were released.
pub async fn release_booking_seats(conn: &mut PgConnection, booking_id: i64) -> ServiceResult<i32> {
    let result = sqlx::query("DELETE FROM seat_status WHERE booking_id = $1")
        .bind(booking_id)
        .execute(&mut *conn)
        .await?;

    i32::try_from(result.rows_affected())
        .map_err(|_| ServiceError::Internal(format!("released seat count overflow for booking {booking_id}")))
}

/// Applies `delta` to the showtime's available_seats counter.
pub async fn adjust_available(
    conn: &mut PgConnection,
    showtime_id: i64,
    delta: i32,
) -> ServiceResult<()> {
    if delta == 0 {
        return Ok(());
    }

    sqlx::query(
        "UPDATE showtimes
         SET available_seats = available_seats + $2, updated_at = NOW()
         WHERE showtime_id = $1",
    )
    .bind(showtime_id)
    .bind(delta)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Every active seat of the showtime's theater with its per-showtime state.
pub async fn load_seat_map(pool: &PgPool, showtime_id: i64) -> ServiceResult<Vec<SeatMapEntry>> {
    let theater_id: i64 =
        sqlx::query_scalar("SELECT theater_id FROM showtimes WHERE showtime_id = $1")
            .bind(showtime_id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Showtime", showtime_id))?;

    let seats = sqlx::query_as::<_, SeatMapEntry>(
        "SELECT s.seat_id, s.seat_row, s.seat_number, s.seat_type,
                COALESCE(ss.status, 'available') AS status,
                ss.booking_id, ss.reserved_until
         FROM seats s
         LEFT JOIN seat_status ss ON ss.seat_id = s.seat_id AND ss.showtime_id = $1
         WHERE s.theater_id = $2 AND s.is_active
         ORDER BY s.seat_row, s.seat_number",
    )
    .bind(showtime_id)
    .bind(theater_id)
    .fetch_all(pool)
    .await?;

    Ok(seats)
}
