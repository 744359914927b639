use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::RequireAdmin;
use crate::models::seat::{
    BulkCreateSeatsRequest, BulkCreateSeatsResult, CreateSeatRequest, SeatFilter, UpdateSeatRequest,
};
use crate::models::Seat;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", get(list_seats))
        .route("/seats/{id}", get(get_seat))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/seats", post(create_seat))
        .route("/seats/bulk", post(bulk_create_seats))
        .route("/seats/{id}", put(update_seat).delete(delete_seat))
}

// GET /api/seats?theater_id=
async fn list_seats(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<SeatFilter>,
) -> AppResult<Json<ApiResponse<Vec<Seat>>>> {
    let seats = state.catalog.list_seats(&filter).await?;
    Ok(Json(ApiResponse::data(seats)))
}

async fn get_seat(
    State(state): State<Arc<AppState>>,
    ApiPath(seat_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Seat>>> {
    let seat = state.catalog.get_seat(seat_id).await?;
    Ok(Json(ApiResponse::data(seat)))
}

async fn create_seat(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiJson(req): ApiJson<CreateSeatRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Seat>>)> {
    let seat = state.catalog.create_seat(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Seat created successfully", seat)),
    ))
}

async fn bulk_create_seats(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiJson(req): ApiJson<BulkCreateSeatsRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BulkCreateSeatsResult>>)> {
    let result = state.catalog.bulk_create_seats(req).await?;
    let message = format!("{} seats created, {} skipped", result.created, result.skipped);
    Ok((StatusCode::CREATED, Json(ApiResponse::with_message(message, result))))
}

async fn update_seat(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(seat_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateSeatRequest>,
) -> AppResult<Json<ApiResponse<Seat>>> {
    let seat = state.catalog.update_seat(seat_id, req).await?;
    Ok(Json(ApiResponse::with_message("Seat updated successfully", seat)))
}

async fn delete_seat(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(seat_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete_seat(seat_id).await?;
    Ok(Json(ApiResponse::message("Seat deleted successfully")))
}
