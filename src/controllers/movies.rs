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
use crate::models::catalog::{CreateMovieRequest, MovieFilter, UpdateMovieRequest};
use crate::models::Movie;
use crate::response::ApiResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies))
        .route("/movies/{id}", get(get_movie))
}

pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", post(create_movie))
        .route("/movies/{id}", put(update_movie).delete(delete_movie))
}

async fn list_movies(
    State(state): State<Arc<AppState>>,
    ApiQuery(filter): ApiQuery<MovieFilter>,
) -> AppResult<Json<ApiResponse<Vec<Movie>>>> {
    let movies = state.catalog.list_movies(&filter).await?;
    Ok(Json(ApiResponse::data(movies)))
}

async fn get_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(movie_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let movie = state.catalog.get_movie(movie_id).await?;
    Ok(Json(ApiResponse::data(movie)))
}

async fn create_movie(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiJson(req): ApiJson<CreateMovieRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Movie>>)> {
    let movie = state.catalog.create_movie(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Movie created successfully", movie)),
    ))
}

async fn update_movie(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(movie_id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateMovieRequest>,
) -> AppResult<Json<ApiResponse<Movie>>> {
    let movie = state.catalog.update_movie(movie_id, req).await?;
    Ok(Json(ApiResponse::with_message("Movie updated successfully", movie)))
}

async fn delete_movie(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    ApiPath(movie_id): ApiPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.catalog.delete_movie(movie_id).await?;
    Ok(Json(ApiResponse::message("Movie deleted successfully")))
}
