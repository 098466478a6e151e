//! Farm Ledger Platform - Backend
//!
//! HTTP API over the farm's fields, lots, warehouse bins and the inventory
//! ledger. The ledger rules (no mixing per bin, no negative stock, atomic
//! sales) are enforced here inside database transactions.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

pub use config::Config;

use services::master_data::MasterDataCache;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
    pub master_data: Arc<MasterDataCache>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, config: Config) -> Self {
        let ttl = Duration::from_secs(config.cache.master_data_ttl_secs);
        Self {
            db,
            config: Arc::new(config),
            master_data: Arc::new(MasterDataCache::new(ttl)),
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farm Ledger API v1"
}
