use prompt_relay_gateway::Gateway;
use prompt_relay_server::config::ServerConfig;
use prompt_relay_server::routes;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration from environment
    let config = ServerConfig::from_env().expect("failed to load configuration");
    if config.relay.upstream.api_key.is_none() {
        tracing::warn!("no upstream credential configured; invocations will fail");
    }
    tracing::info!("Loaded configuration");

    let gateway = Arc::new(Gateway::new(config.relay));
    let app = routes::router(gateway);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind to address");

    tracing::info!("listening on http://{}", config.listen_addr);

    axum::serve(listener, app.into_make_service())
        .await
        .expect("server error");
}
