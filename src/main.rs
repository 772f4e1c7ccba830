use anyhow::Context;

use edubot::config::{AppConfig, StoreLocation};
use edubot::context::AppContext;
use edubot::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().context("Invalid configuration")?;

    eprintln!("🤖 EduBot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {} ({:?})", config.llm.model, config.llm.backend);
    match &config.store {
        StoreLocation::Local(path) => eprintln!("   Database: {}", path),
        StoreLocation::Remote { url, .. } => eprintln!("   Database: {}", url),
    }
    eprintln!(
        "   Graph API: {}/{}",
        config.whatsapp.api_base, config.whatsapp.api_version
    );
    eprintln!(
        "   Signature check: {}",
        if config.whatsapp.app_secret.is_some() {
            "on"
        } else {
            "off"
        }
    );
    eprintln!("   Webhook: http://0.0.0.0:{}/webhook\n", config.port);

    let ctx = AppContext::from_config(&config)
        .await
        .context("Failed to initialize services")?;

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, "EduBot listening");

    axum::serve(listener, server::router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("EduBot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
