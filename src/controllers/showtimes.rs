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
use crate::models::showtime::{CreateShowtimeRequest, ShowtimeFilter, UpdateShowtimeRequest};
use crate::models::{SeatMapEntry, Showtime, ShowtimeDetails};
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showtimes", get(list_showtimes))
        .route("/showtimes/{id}", get(get_showtime))
        .route("/showtimes/{id}/seats", get(get_seat_map))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showtimes", post(create_showtime))
        .route("/showtimes/{id}", put(update_showtime).delete(delete_showtime))
}

async fn list_showtimes(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<ShowtimeFilter>,
) -> AppResult<Json<ApiResponse<Vec<ShowtimeDetails>>>> {
    let showtimes = state.catalog.list_showtimes(&filter).await?;
    Ok(Json(ApiResponse::data(showtimes)))
}

async fn get_showtime(
    State(state): State<Arc<AppState>>,
    ApiPath(showtime_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<ShowtimeDetails>>> {
    let showtime = state.catalog.get_showtime(showtime_id).await?;
    Ok(Json(ApiResponse::data(showtime)))
}

// GET /api/showtimes/{id}/seats
async fn get_seat_map(
    State(state): State<Arc<AppState>>,
    ApiPath(showtime_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Vec<SeatMapEntry>>>> {
    let seats = state.views.seat_map(showtime_id).await?;
    Ok(Json(ApiResponse::data(seats)))
}

async fn create_showtime(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiJson(req): ApiJson<CreateShowtimeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Showtime>>)> {
    let showtime = state.catalog.create_showtime(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Showtime created successfully", showtime)),
    ))
}

async fn update_showtime(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(showtime_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateShowtimeRequest>,
) -> AppResult<Json<ApiResponse<Showtime>>> {
    let showtime = state.catalog.update_showtime(showtime_id, req).await?;
    Ok(Json(ApiResponse::with_message("Showtime updated successfully", showtime)))
}

async fn delete_showtime(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(showtime_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete_showtime(showtime_id).await?;
    Ok(Json(ApiResponse::message("Showtime deleted successfully")))
}
