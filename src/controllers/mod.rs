pub mod admin;
pub mod bookings;
pub mod cinemas;
pub mod movies;
pub mod seats;
pub mod showtimes;
pub mod theaters;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Everything mounted under `/api`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(movies::routes())
        .merge(cinemas::routes())
        .merge(theaters::routes())
        .merge(showtimes::routes())
        .merge(seats::routes())
        .merge(bookings::routes())
        .nest("/admin", admin::routes())
}
