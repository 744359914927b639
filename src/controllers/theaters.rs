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
use crate::models::catalog::{CreateTheaterRequest, TheaterFilter, UpdateTheaterRequest};
use crate::models::Theater;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/theaters", get(list_theaters))
        .route("/theaters/{id}", get(get_theater))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/theaters", post(create_theater))
        .route("/theaters/{id}", put(update_theater).delete(delete_theater))
}

async fn list_theaters(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<TheaterFilter>,
) -> AppResult<Json<ApiResponse<Vec<Theater>>>> {
    let theaters = state.catalog.list_theaters(&filter).await?;
    Ok(Json(ApiResponse::data(theaters)))
}

async fn get_theater(
    State(state): State<Arc<AppState>>,
    ApiPath(theater_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Theater>>> {
    let theater = state.catalog.get_theater(theater_id).await?;
    Ok(Json(ApiResponse::data(theater)))
}

async fn create_theater(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiJson(req): ApiJson<CreateTheaterRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Theater>>)> {
    let theater = state.catalog.create_theater(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Theater created successfully", theater)),
    ))
}

async fn update_theater(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(theater_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTheaterRequest>,
) -> AppResult<Json<ApiResponse<Theater>>> {
    let theater = state.catalog.update_theater(theater_id, req).await?;
    Ok(Json(ApiResponse::with_message("Theater updated successfully", theater)))
}

async fn delete_theater(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(theater_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete_theater(theater_id).await?;
    Ok(Json(ApiResponse::message("Theater deleted successfully")))
}
