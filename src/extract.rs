//! Request extractors whose rejections use the `ApiResponse` envelope.
//!
//! axum's own `Json`, `Path` and `Query` reject with plain-text bodies (and
//! 422 for bodies that parse but do not deserialize). These wrappers route
//! every rejection through `AppError::BadRequest`.

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
