#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use sports_hub::{
    mailer::SmtpMailer,
    server,
    store::MongoStore,
    BookingApp, Config,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{debug, error, info};
use tracing_subscriber::filter::EnvFilter;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let config = Config::from_env()?;

    info!("Starting server");

    let store = MongoStore::connect(&config.mongo_uri, config.mongo_db.as_deref())
        .await
        .inspect_err(|e| error!("MongoDB connection error: {}", e))
        .context("connecting to MongoDB")?;

    let mailer = SmtpMailer::new(&config.smtp_host, &config.email_user, &config.email_pass)
        .context("configuring the SMTP transport")?;
    mailer.verify().await;

    let booker = Arc::new(BookingApp::new(Arc::new(store), Arc::new(mailer)));
    let app = server::router(booker, &config.cors_origin)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("Server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // the router owned the store and mail handles, both are dropped by now
    info!("Server stopped");
    Ok(())
}
