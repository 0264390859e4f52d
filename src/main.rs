use std::sync::Arc;

use devconnector_api::{app, config, github::GithubClient, store::PgStore, store::Store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting DevConnector API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = Arc::new(PgStore::connect(&config.database).await?);
    let state = AppState {
        store: store.clone(),
        github: GithubClient::new(&config.github),
    };

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("server listening on http://{}", bind_addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Explicit lifecycle: the pool opened at startup is released here
    store.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
