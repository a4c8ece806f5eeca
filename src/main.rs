use anyhow::{Context, Result};
use tracing::info;
use vailite_site::config::Config;
use vailite_site::server::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vailite_site=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let port = config.port;

    info!(
        locales_dir = %config.locales_dir.display(),
        publish_repo = %config.publish_repo_dir.display(),
        ai_enabled = config.openai_api_key.is_some(),
        "Starting Vailite site server"
    );

    let app = build_router(AppState::from_config(config));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
