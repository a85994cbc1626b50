//! Fixture HTTP server hosting the `/sse` endpoint the harness connects to.

use log::info;
use service::AppState;
use tokio::net::TcpListener;

mod controller;
pub mod router;
mod sse;

/// Bind the configured interface and port, then serve until the process exits.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let addr = format!(
        "{}:{}",
        app_state.config.interface(),
        app_state.config.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Server starting... listening for connections on http://{addr}");

    serve(listener, app_state).await
}

/// Serve on an already bound listener. Tests bind port 0 and pass it here.
pub async fn serve(listener: TcpListener, app_state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router::define_routes(app_state)).await
}
