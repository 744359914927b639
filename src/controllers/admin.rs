use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{cinemas, movies, seats, showtimes, theaters};
use crate::error::{AppError, AppResult};
use crate::extract::ApiQuery;
use crate::middleware::RequireAdmin;
use crate::models::booking::BookingDetails;
use crate::response::ApiResponse;
use crate::services::reaper::DEFAULT_PURGE_DAYS;
use crate::services::{ReaperStatus, SweepReport};
use crate::AppState;

/// Mounted at `/api/admin`; every handler takes [`RequireAdmin`].
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(movies::admin_routes())
        .merge(cinemas::admin_routes())
        .merge(theaters::admin_routes())
        .merge(showtimes::admin_routes())
        .merge(seats::admin_routes())
        .route("/bookings", get(list_all_bookings))
        .route("/cron/status", get(cron_status))
        .route("/cron/cancel-expired", post(cancel_expired))
        .route("/cron/purge-cancelled", post(purge_cancelled))
}

async fn list_all_bookings(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> AppResult<Json<ApiResponse<Vec<BookingDetails>>>> {
    let bookings = state.views.all_bookings().await?;
    Ok(Json(ApiResponse::data(bookings)))
}

async fn cron_status(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> AppResult<Json<ApiResponse<ReaperStatus>>> {
    let status = state.reaper.status().await?;
    Ok(Json(ApiResponse::data(status)))
}

// POST /api/admin/cron/cancel-expired
async fn cancel_expired(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
) -> AppResult<Json<ApiResponse<SweepReport>>> {
    let report = state.reaper.sweep().await?;
    let message = format!("Cancelled {} expired bookings", report.cancelled);
    Ok(Json(ApiResponse::with_message(message, report)))
}

#[derive(Debug, Deserialize)]
struct PurgeQuery {
    days: Option<i64>,
}

#[derive(Debug, Serialize)]
struct PurgeReport {
    days: i64,
    purged: u64,
}

// POST /api/admin/cron/purge-cancelled?days=N
async fn purge_cancelled(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiQuery(query): ApiQuery<PurgeQuery>,
) -> AppResult<Json<ApiResponse<PurgeReport>>> {
    let days = query.days.unwrap_or(DEFAULT_PURGE_DAYS);
    if !(1..=3650).contains(&days) {
        return Err(AppError::BadRequest("days must be between 1 and 3650".into()));
    }

    let purged = state
        .reaper
        .purge_cancelled_before(Utc::now() - Duration::days(days))
        .await?;

    Ok(Json(ApiResponse::with_message(
        format!("Purged {purged} cancelled bookings"),
        PurgeReport { days, purged },
    )))
}
