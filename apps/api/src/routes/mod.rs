//! # HTTP Routes
//!
//! One module per resource. Every `/api/*` route except the auth ones takes
//! an [`AuthUser`](crate::AuthUser) and only ever touches that user's keys.
//!
//! ## Envelopes
//! Responses wrap payloads in a named key, the shape the web client expects:
//! `{maquinas: [...]}`, `{maquina: {...}}`, `{success: true}`.

use axum::{routing::get, routing::post, Router};

use crate::AppState;

pub mod auth;
pub mod costos;
pub mod dashboard;
pub mod lugares;
pub mod manifest;
pub mod maquinas;
pub mod notificaciones;
pub mod recolecciones;
pub mod rentabilidad;
pub mod system;

/// All routes, before state and middleware are attached.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/maquinas",
            get(maquinas::list)
                .post(maquinas::create)
                .put(maquinas::update)
                .delete(maquinas::remove),
        )
        .route(
            "/api/lugares",
            get(lugares::list)
                .post(lugares::create)
                .put(lugares::update)
                .delete(lugares::remove),
        )
        .route(
            "/api/recolecciones",
            get(recolecciones::list).post(recolecciones::create),
        )
        .route("/api/costos", get(costos::list).post(costos::create))
        .route("/api/rentabilidad", get(rentabilidad::report))
        .route(
            "/api/notificaciones-recoleccion",
            get(notificaciones::list).post(notificaciones::notify),
        )
        .route("/api/dashboard", get(dashboard::summary))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/verify", post(auth::verify))
        .route("/api/debug/storage", get(system::debug_storage))
        .route("/health", get(system::health))
        .route("/.well-known/farcaster.json", get(manifest::farcaster))
}

// =============================================================================
// Test Helpers
// =============================================================================
