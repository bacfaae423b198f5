//! # Vending API
//!
//! REST server for vending route management.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Routes                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  Inventory     │  │  Operations    │  │  Reports                   ││
//! │  │                │  │                │  │                            ││
//! │  │ • /maquinas    │  │ • /recolec-    │  │ • /rentabilidad            ││
//! │  │ • /lugares     │  │   ciones       │  │ • /notificaciones-         ││
//! │  │                │  │ • /costos      │  │   recoleccion              ││
//! │  │                │  │                │  │ • /dashboard               ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │  Auth          │  │  System        │                                │
//! │  │                │  │                │                                │
//! │  │ • signup       │  │ • /health      │                                │
//! │  │ • login        │  │ • /debug/      │                                │
//! │  │ • verify       │  │   storage      │                                │
//! │  │                │  │ • farcaster    │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │                                                                   │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │ vending-store│  │ vending-core │  │    JWT Auth              ││  │
//! │  │  │              │  │              │  │                          ││  │
//! │  │  │ Redis or     │  │ Aggregations │  │ Bearer tokens, 30 days   ││  │
//! │  │  │ memory       │  │ Validation   │  │                          ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - HTTP port (default: 3000)
//! - `BIND_ADDR` - Interface to bind (default: 0.0.0.0)
//! - `REDIS_URL` - Redis connection string (memory store when unset)
//! - `KEY_PREFIX` - Key namespace (default: vending)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 2592000)
//! - `APP_URL`, `APP_NAME`, `APP_BUTTON_TITLE`, `APP_SPLASH_BACKGROUND_COLOR`,
//!   `APP_WEBHOOK_URL` - mini-app manifest

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use vending_store::Store;

// Re-exports
pub use auth::{AuthUser, JwtManager};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub jwt: Arc<JwtManager>,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    pub fn new(store: Store, config: ApiConfig) -> Self {
        AppState {
            store,
            jwt: Arc::new(JwtManager::new(&config.jwt_secret, config.jwt_lifetime_secs)),
            config: Arc::new(config),
        }
    }
}

/// Builds the full application: routes plus CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
