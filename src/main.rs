use log::{error, info};
use service::{config::Config, logging::Logger, AppState};

#[tokio::main]
async fn main() {
    let config = Config::new();
    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
    }

    info!(
        "Starting SSE fixture server (feed_size={}, feed_interval_ms={})",
        config.feed_size, config.feed_interval_ms
    );

    let app_state = AppState::new(config);

    if let Err(e) = web::init_server(app_state).await {
        error!("Fixture server exited with an error: {e}");
        std::process::exit(1);
    }
}
