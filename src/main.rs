use anyhow::Result;
use invoice_search_ws::{
    config::Config,
    observability,
    state::AppState,
    tasks::start_top_selling_days_scheduler,
};
use std::sync::Arc;
use tracing::{error, info};

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Carga las variables de entorno desde el archivo .env. Falla silenciosamente si no existe.
    dotenvy::dotenv().ok();

    observability::init_tracing();

    let config = Config::from_env()?;

    let app_state = AppState::new(&config).await?;
    info!("🚀 Application state initialized");

    match config.report.recipient.as_deref() {
        Some(recipient) => info!("📧 Top selling days report recipient: {}", recipient),
        None => info!("ℹ️ TOP_SELLING_DAYS_RECIPIENT not set. Report will only be logged."),
    }

    let mut scheduler = start_top_selling_days_scheduler(Arc::clone(&app_state.report), &config.report.cron).await?;
    info!("⏰ Top selling days report scheduled ({})", config.report.cron);

    shutdown_signal().await;

    info!("Shutting down scheduled jobs...");
    scheduler.shutdown().await?;
    app_state.db_pool.close().await;

    Ok(())
}
