//! Binary entrypoint for the zapflow HTTP server.
//!
//! Reads configuration from environment variables:
//! - `ZAPFLOW_DB_PATH`: SQLite database file path (default: "zapflow.db")
//! - `ZAPFLOW_PORT`: Server listen port (default: "8001")
//! - `EVOLUTION_API_URL`: Evolution API base URL (default: "http://localhost:8080")
//! - `EVOLUTION_API_KEY`: Evolution API key (default: empty)

use std::sync::Arc;

use zapflow_server::evolution::HttpEvolutionClient;
use zapflow_server::router::build_router;
use zapflow_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let db_path = std::env::var("ZAPFLOW_DB_PATH")
        .unwrap_or_else(|_| "zapflow.db".to_string());
    let port = std::env::var("ZAPFLOW_PORT")
        .unwrap_or_else(|_| "8001".to_string());
    let evolution_url = std::env::var("EVOLUTION_API_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let evolution_key = std::env::var("EVOLUTION_API_KEY").unwrap_or_default();

    let evolution = Arc::new(HttpEvolutionClient::new(&evolution_url, &evolution_key));
    let state = AppState::new(&db_path, evolution)
        .expect("Failed to initialize application state");

    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("zapflow server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
