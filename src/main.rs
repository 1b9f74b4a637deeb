//! Wiring & DI. Entry point: bootstrap adapters, inject into the scheduler, run until Ctrl-C.
//! No business logic here.

use dotenv::dotenv;
use remindly::adapters::TracingObserver;
use remindly::adapters::mail::{HttpMailer, LogMailer};
use remindly::adapters::persistence::SqliteRepo;
use remindly::ports::{DispatchObserver, EventStore, NotificationSender, UserDirectory};
use remindly::shared::config::AppConfig;
use remindly::usecases::ReminderScheduler;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let repo = Arc::new(
        SqliteRepo::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );
    let store: Arc<dyn EventStore> = Arc::clone(&repo) as Arc<dyn EventStore>;
    let users: Arc<dyn UserDirectory> = Arc::clone(&repo) as Arc<dyn UserDirectory>;

    let sender: Arc<dyn NotificationSender> = if cfg.is_mail_configured() {
        let url = cfg.mail_api_url.clone().unwrap_or_default();
        info!(url = %url, from = %cfg.mail_from_or_default(), "mail relay enabled");
        Arc::new(HttpMailer::new(
            url,
            cfg.mail_api_key_or_default(),
            cfg.mail_from_or_default(),
        ))
    } else {
        warn!("REMINDLY_MAIL_API_URL not set, reminders will only be logged");
        Arc::new(LogMailer::new())
    };
    let observer: Arc<dyn DispatchObserver> = Arc::new(TracingObserver);

    let scheduler = Arc::new(ReminderScheduler::new(store, users, sender, observer));

    // --- Scan loop: stopped by Ctrl-C; an in-flight pass completes first ---
    let interval = Duration::from_secs(cfg.scan_interval_secs_or_default());
    let shutdown = CancellationToken::new();
    let scan_loop = {
        let scheduler = Arc::clone(&scheduler);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { scheduler.run_loop(interval, shutdown).await })
    };

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("signal handler: {}", e))?;
    info!("shutdown requested");
    shutdown.cancel();
    scan_loop
        .await
        .map_err(|e| anyhow::anyhow!("scan loop panicked: {}", e))?;

    Ok(())
}
