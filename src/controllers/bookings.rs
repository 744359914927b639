use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::AuthUser;
use crate::models::booking::{BookingDetails, CreateBookingRequest, CreatedBooking};
use crate::models::Booking;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", post(create_booking))
        .route("/bookings/my-bookings", get(get_my_bookings))
        .route("/bookings/{id}", get(get_booking).delete(cancel_booking))
        .route("/bookings/{id}/confirm-payment", put(confirm_payment))
}

/* ---------- helpers ---------- */

fn ensure_owner_or_admin(user: &AuthUser, owner_id: i64) -> AppResult<()> {
    if user.user_id() == owner_id || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("You do not have access to this booking".into()))
    }
}

async fn authorize_booking(state: &AppState, user: &AuthUser, booking_id: i64) -> AppResult<()> {
    let booking = state.lifecycle.get_booking(booking_id).await?;
    ensure_owner_or_admin(user, booking.user_id)
}

/* ---------- handlers ---------- */

// POST /api/bookings
async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedBooking>>)> {
    req.validate()?;

    let created = state
        .reservations
        .create_booking(user.user_id(), req.showtime_id, &req.seat_ids)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Booking created successfully", created)),
    ))
}

// GET /api/bookings/my-bookings
async fn get_my_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<BookingDetails>>>> {
    let bookings = state.views.user_bookings(user.user_id()).await?;
    Ok(Json(ApiResponse::data(bookings)))
}

// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(booking_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<BookingDetails>>> {
    let booking = state.views.booking_detail(booking_id).await?;
    ensure_owner_or_admin(&user, booking.user_id)?;
    Ok(Json(ApiResponse::data(booking)))
}

// DELETE /api/bookings/{id}
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(booking_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    authorize_booking(&state, &user, booking_id).await?;
    let booking = state.lifecycle.cancel_booking(booking_id).await?;
    Ok(Json(ApiResponse::with_message("Booking cancelled successfully", booking)))
}

// PUT /api/bookings/{id}/confirm-payment
async fn confirm_payment(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(booking_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    authorize_booking(&state, &user, booking_id).await?;
    let booking = state.lifecycle.confirm_payment(booking_id).await?;
    Ok(Json(ApiResponse::with_message("Payment confirmed successfully", booking)))
}
