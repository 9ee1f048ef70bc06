//! Keep-alive HTTP endpoint for the hosting platform's uptime checks.

use axum::Router;
use axum::routing::get;
use tracing::{error, info};

/// Address the keep-alive server binds to in production.
pub const BIND_ADDR: &str = "0.0.0.0:8080";

/// Body returned by the liveness endpoint.
pub const ALIVE_BODY: &str = "Hello, I am alive!";

async fn alive() -> &'static str {
    ALIVE_BODY
}

/// Router with the single liveness route.
pub fn router() -> Router {
    Router::new().route("/", get(alive))
}

/// Bind `addr` and serve the liveness endpoint until the task is dropped.
pub async fn serve(addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Liveness server listening on {addr}");
    axum::serve(listener, router()).await
}

/// Run the liveness server on its own task. A bind or serve failure is
/// logged and ends only this task; the bot loop keeps running.
pub fn spawn(addr: String) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(&addr).await {
            error!("Liveness server failed: {e}");
        }
    })
}
