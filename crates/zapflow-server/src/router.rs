//! Router assembly for the zapflow HTTP API.
//!
//! [`build_router`] wires all handler functions to their routes with
//! CORS and tracing middleware layers.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Builds the complete axum router with all API routes under `/api`.
///
/// Routes use axum 0.8 `/{param}` path syntax.
/// CORS is permissive (the editor frontend is served from another origin).
/// TraceLayer provides request-level logging via tracing.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Flow management
        .route(
            "/flows",
            get(handlers::flows::list_flows).post(handlers::flows::create_flow),
        )
        .route(
            "/flows/{id}",
            get(handlers::flows::get_flow)
                .put(handlers::flows::update_flow)
                .delete(handlers::flows::delete_flow),
        )
        .route("/flows/{id}/execute", post(handlers::flows::execute_flow))
        // Operational records
        .route(
            "/flows/{id}/executions",
            get(handlers::records::list_executions),
        )
        .route("/flows/{id}/logs", get(handlers::records::list_logs))
        .route("/flows/{id}/messages", get(handlers::records::list_messages))
        // Evolution instances
        .route(
            "/evolution/instances",
            get(handlers::instances::list_instances).post(handlers::instances::create_instance),
        )
        .route(
            "/evolution/instances/{name}/qr",
            get(handlers::instances::instance_qr),
        )
        .route("/evolution/webhook", post(handlers::instances::webhook))
        // AI assistant settings
        .route(
            "/ai/settings",
            get(handlers::settings::get_settings).post(handlers::settings::save_settings),
        )
        // Media upload
        .route("/upload", post(handlers::upload::upload))
        .with_state(state);

    Router::new()
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
