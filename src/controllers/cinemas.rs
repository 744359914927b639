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
use crate::models::catalog::{CinemaFilter, CreateCinemaRequest, UpdateCinemaRequest};
use crate::models::Cinema;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cinemas", get(list_cinemas))
        .route("/cinemas/{id}", get(get_cinema))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/cinemas", post(create_cinema))
        .route("/cinemas/{id}", put(update_cinema).delete(delete_cinema))
}

async fn list_cinemas(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<CinemaFilter>,
) -> AppResult<Json<ApiResponse<Vec<Cinema>>>> {
    let cinemas = state.catalog.list_cinemas(&filter).await?;
    Ok(Json(ApiResponse::data(cinemas)))
}

async fn get_cinema(
    State(state): State<Arc<AppState>>,
    ApiPath(cinema_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Cinema>>> {
    let cinema = state.catalog.get_cinema(cinema_id).await?;
    Ok(Json(ApiResponse::data(cinema)))
}

async fn create_cinema(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiJson(req): ApiJson<CreateCinemaRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Cinema>>)> {
    let cinema = state.catalog.create_cinema(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Cinema created successfully", cinema)),
    ))
}

async fn update_cinema(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(cinema_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateCinemaRequest>,
) -> AppResult<Json<ApiResponse<Cinema>>> {
    let cinema = state.catalog.update_cinema(cinema_id, req).await?;
    Ok(Json(ApiResponse::with_message("Cinema updated successfully", cinema)))
}

async fn delete_cinema(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(cinema_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete_cinema(cinema_id).await?;
    Ok(Json(ApiResponse::message("Cinema deleted successfully")))
}
