//! Route definitions for the crab farm management API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Protected routes - cage management
        .nest("/cages", cage_routes())
        // Protected routes - harvested records
        .nest("/harvested", harvested_routes())
        // Protected routes - financial reporting
        .nest("/financial", financial_routes())
        // Protected routes - notifications
        .nest("/notifications", notification_routes())
        // Protected routes - AI advisor
        .nest("/advisor", advisor_routes())
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Cage management routes (protected)
fn cage_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_cages).post(handlers::create_cage))
        .route("/bulk/feed", post(handlers::bulk_feed_cages))
        .route(
            "/:cage_id",
            get(handlers::get_cage)
                .put(handlers::update_cage)
                .delete(handlers::delete_cage),
        )
        .route("/:cage_id/alert", put(handlers::set_cage_alert))
        .route("/:cage_id/harvest", post(handlers::harvest_cage))
        .route("/:cage_id/health-check", post(handlers::cage_health_check))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Harvested record routes (protected)
fn harvested_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_harvested))
        .route("/:cage_id", get(handlers::get_harvested_cage))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Financial reporting routes (protected)
fn financial_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_financial_summary))
        .route("/export", get(handlers::export_harvested_csv))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Notification routes (protected)
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_notifications))
        .route("/unread-count", get(handlers::get_unread_count))
        .route("/sync", post(handlers::sync_notifications))
        .route("/mark-all-read", post(handlers::mark_all_read))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// AI advisor routes (protected)
fn advisor_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/sessions", post(handlers::start_chat_session))
        .route(
            "/chat/sessions/:session_id/messages",
            post(handlers::send_chat_message),
        )
        .route("/reports", post(handlers::generate_report))
        .route_layer(middleware::from_fn(auth_middleware))
}
