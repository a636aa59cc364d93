mod error;
mod metrics;
mod routes;
mod state;

use axum::routing::{get, post};
use axum::Router;
use state::{AppState, SharedState};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use trellis_core::{CollectionIndex, Config};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port: u16 = std::env::args()
        .position(|a| a == "--port")
        .and_then(|i| std::env::args().nth(i + 1))
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let bind: String = std::env::args()
        .position(|a| a == "--bind")
        .and_then(|i| std::env::args().nth(i + 1))
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let root: PathBuf = std::env::args()
        .position(|a| a == "--root")
        .and_then(|i| std::env::args().nth(i + 1))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./wiki"));

    let config = Config::load_for_root(&root);
    // The first query pays for the initial walk; startup never blocks on it.
    let index = CollectionIndex::new(root, config);
    let state: SharedState = Arc::new(AppState::new(index));

    let app = Router::new()
        .route("/resolve", post(routes::resolve))
        .route("/complete", post(routes::complete))
        .route("/status", get(routes::status))
        .route("/metrics", get(metrics::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("{}:{}", bind, port);
    tracing::info!(%addr, "trellis-service listening");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
