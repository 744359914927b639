//! Background release of expired seat holds.
//!
//! A pending, unpaid booking whose hold deadline has passed is cancelled and
//! its seats go back to the showtime. The sweep runs once at startup and then
//! on a fixed interval until the handle is stopped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::cache::CacheService;
use crate::database::Database;
use crate::error::ServiceResult;
use crate::services::inventory;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Cancelled bookings older than this are purged by default.
pub const DEFAULT_PURGE_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub ran_at: DateTime<Utc>,
    pub cancelled: usize,
    pub booking_ids: Vec<i64>,
    pub released_seats: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReaperStatus {
    pub running: bool,
    pub last_run: Option<DateTime<Utc>>,
    pub last_cancelled: usize,
    /// Pending bookings still inside their hold window.
    pub held_reservations: i64,
    /// Pending bookings past their deadline that no sweep has handled yet.
    pub expired_reservations: i64,
}

#[derive(Debug, Default)]
struct LastRun {
    at: Option<DateTime<Utc>>,
    cancelled: usize,
}

#[derive(Debug, FromRow)]
struct ExpiredBooking {
    booking_id: i64,
    showtime_id: i64,
}

#[derive(Clone)]
pub struct ExpiryReaper {
    db: Database,
    cache: CacheService,
    running: Arc<AtomicBool>,
    last_run: Arc<RwLock<LastRun>>,
}

impl ExpiryReaper {
    pub fn new(db: Database, cache: CacheService) -> Self {
        Self {
            db,
            cache,
            running: Arc::new(AtomicBool::new(false)),
            last_run: Arc::new(RwLock::new(LastRun::default())),
        }
    }

    pub async fn sweep(&self) -> ServiceResult<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// One sweep cycle in a single transaction. Running it twice in a row
    /// cancels nothing the second time.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> ServiceResult<SweepReport> {
        let mut tx = self.db.pool.begin().await?;

        // Rows another transaction is working on (a confirm, a cancel) are
        // skipped and picked up next cycle if still expired.
        let expired = sqlx::query_as::<_, ExpiredBooking>(
            "SELECT b.booking_id, b.showtime_id
             FROM bookings b
             WHERE b.booking_status = 'pending'
               AND b.payment_status = 'pending'
               AND EXISTS (
                   SELECT 1 FROM seat_status ss
                   WHERE ss.booking_id = b.booking_id
                     AND ss.status = 'reserved'
                     AND ss.reserved_until < $1
               )
             ORDER BY b.showtime_id, b.booking_id
             FOR UPDATE OF b SKIP LOCKED",
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        let mut showtime_ids: Vec<i64> = expired.iter().map(|b| b.showtime_id).collect();
        showtime_ids.dedup();
        inventory::lock_showtimes(&mut tx, &showtime_ids).await?;

        let mut released_seats = 0i64;
        for booking in &expired {
            sqlx::query(
                "UPDATE bookings
                 SET booking_status = 'cancelled', updated_at = NOW()
                 WHERE booking_id = $1",
            )
            .bind(booking.booking_id)
            .execute(&mut *tx)
            .await?;

            let released = inventory::release_booking_seats(&mut tx, booking.booking_id).await?;
            inventory::adjust_available(&mut tx, booking.showtime_id, released).await?;
            released_seats += i64::from(released);
        }

        tx.commit().await?;

        self.cache.invalidate_seat_maps(&showtime_ids).await;

        let report = SweepReport {
            ran_at: now,
            cancelled: expired.len(),
            booking_ids: expired.iter().map(|b| b.booking_id).collect(),
            released_seats,
        };

        let mut last_run = self.last_run.write().await;
        last_run.at = Some(now);
        last_run.cancelled = report.cancelled;

        Ok(report)
    }

    pub async fn status(&self) -> ServiceResult<ReaperStatus> {
        self.status_at(Utc::now()).await
    }

    pub async fn status_at(&self, now: DateTime<Utc>) -> ServiceResult<ReaperStatus> {
        let (held_reservations, expired_reservations): (i64, i64) = sqlx::query_as(
            "SELECT
                 COUNT(DISTINCT b.booking_id) FILTER (WHERE ss.reserved_until >= $1),
                 COUNT(DISTINCT b.booking_id) FILTER (WHERE ss.reserved_until < $1)
             FROM bookings b
             JOIN seat_status ss ON ss.booking_id = b.booking_id
             WHERE b.booking_status = 'pending'
               AND b.payment_status = 'pending'
               AND ss.status = 'reserved'",
        )
        .bind(now)
        .fetch_one(&self.db.pool)
        .await?;

        let last_run = self.last_run.read().await;
        Ok(ReaperStatus {
            running: self.running.load(Ordering::Relaxed),
            last_run: last_run.at,
            last_cancelled: last_run.cancelled,
            held_reservations,
            expired_reservations,
        })
    }

    /// Deletes cancelled bookings created before `cutoff`, with their line
    /// items. Returns the number of bookings removed.
    pub async fn purge_cancelled_before(&self, cutoff: DateTime<Utc>) -> ServiceResult<u64> {
        let result = sqlx::query(
            "DELETE FROM bookings WHERE booking_status = 'cancelled' AND created_at < $1",
        )
        .bind(cutoff)
        .execute(&self.db.pool)
        .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            info!(purged, %cutoff, "Purged old cancelled bookings");
        }
        Ok(purged)
    }

    /// Starts the periodic sweep. The first tick fires immediately.
    pub fn spawn(&self, period: Duration) -> ReaperHandle {
        let cancel = CancellationToken::new();
        let reaper = self.clone();
        let token = cancel.clone();
        let join = tokio::spawn(async move { reaper.run(period, token).await });
        ReaperHandle { cancel, join }
    }

    async fn run(self, period: Duration, cancel: CancellationToken) {
        self.running.store(true, Ordering::Relaxed);
        info!(interval_secs = period.as_secs(), "Expiry reaper started");

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Expiry reaper stopping");
                    break;
                }
                _ = interval.tick() => {
                    match self.sweep().await {
                        Ok(report) if report.cancelled > 0 => {
                            info!(
                                cancelled = report.cancelled,
                                released_seats = report.released_seats,
                                "Expired bookings cancelled"
                            );
                        }
                        Ok(_) => debug!("No expired bookings"),
                        Err(e) => error!(error = %e, "Expiry sweep failed"),
                    }
                }
            }
        }

        self.running.store(false, Ordering::Relaxed);
    }
}

pub struct ReaperHandle {
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl ReaperHandle {
    /// Cancels the loop and waits for an in-flight sweep to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.join.await {
            error!(error = %e, "Expiry reaper task failed");
        }
    }
}
