//! HTTP route handlers for the SRP tracker API.
//!
//! - `auth`: login
//! - `libraries`: branch listing and creation
//! - `users`: user management and password changes
//! - `inventory`: box counts, history feed, map and summary aggregates
//! - `admin`: bulk library import
//! - `health`: liveness, readiness and metrics

pub mod admin;
pub mod auth;
pub mod health;
pub mod inventory;
pub mod libraries;
pub mod users;

use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::middleware::{require_admin, require_auth, security_headers::security_headers_middleware};
use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let admin_only = Router::new()
        .route("/api/libraries", post(libraries::create_library))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/admin/import-libraries", post(admin::import_libraries))
        .route_layer(from_fn(require_admin));

    let protected = Router::new()
        .route("/api/libraries", get(libraries::list_libraries))
        .route("/api/users/change-password", put(users::change_password))
        .route("/api/inventory", get(inventory::list_all))
        .route("/api/inventory/library/{library_id}", get(inventory::list_for_library))
        .route("/api/inventory/update", put(inventory::update))
        .route("/api/inventory/history", get(inventory::history_all))
        .route("/api/inventory/history/{library_id}", get(inventory::history_for_library))
        .route("/api/inventory/map", get(inventory::map))
        .route("/api/inventory/summary", get(inventory::summary))
        .merge(admin_only)
        .route_layer(from_fn_with_state(state.clone(), require_auth));

    let mut app = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/health", get(health::health))
        .route("/api/ready", get(health::ready))
        .route("/api/metrics", get(health::metrics))
        .merge(protected);

    // Serve the built dashboard with SPA fallback when configured
    if let Some(dir) = state.config.server.static_dir.as_deref() {
        let root = PathBuf::from(dir);
        let index = root.join("index.html");
        app = app.fallback_service(
            ServeDir::new(root).append_index_html_on_directories(true).not_found_service(ServeFile::new(index)),
        );
    }

    let cfg = state.config.clone();
    app.with_state(state)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(cfg, security_headers_middleware))
        .layer(CorsLayer::permissive())
}
