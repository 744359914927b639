pub mod auth;
pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use auth::Authenticator;
use cache::CacheService;
use database::Database;
use services::{CatalogService, ExpiryReaper, LifecycleManager, ReservationEngine, ViewService};

/// Shared state for every handler and the background reaper.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: CacheService,
    pub config: config::Config,
    pub auth: Arc<dyn Authenticator>,
    pub reservations: ReservationEngine,
    pub lifecycle: LifecycleManager,
    pub reaper: ExpiryReaper,
    pub views: ViewService,
    pub catalog: CatalogService,
}

impl AppState {
    pub fn new(
        config: config::Config,
        db: Database,
        cache: CacheService,
        auth: Arc<dyn Authenticator>,
    ) -> Arc<Self> {
        Arc::new(Self {
            reservations: ReservationEngine::new(db.clone(), cache.clone()),
            lifecycle: LifecycleManager::new(db.clone(), cache.clone()),
            reaper: ExpiryReaper::new(db.clone(), cache.clone()),
            views: ViewService::new(db.clone(), cache.clone()),
            catalog: CatalogService::new(db.clone(), cache.clone()),
            db,
            cache,
            config,
            auth,
        })
    }
}

/// The full HTTP application: root probes plus the API under `/api`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(health))
        .nest("/api", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.db.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy" }))),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy" })),
            )
        }
    }
}
