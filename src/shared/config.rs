//! Application configuration. Storage path, scan cadence, mail relay.

use serde::Deserialize;

/// Seconds between scan passes when REMINDLY_SCAN_INTERVAL_SECS is unset.
pub const DEFAULT_SCAN_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_MAIL_FROM: &str = "noreply@eventplanner.com";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding events.db. Read from REMINDLY_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Seconds between scan passes. Read from REMINDLY_SCAN_INTERVAL_SECS.
    #[serde(default)]
    pub scan_interval_secs: Option<u64>,

    // ─────────────────────────────────────────────────────────────────────────
    // Mail relay
    // ─────────────────────────────────────────────────────────────────────────
    /// Relay endpoint. Read from REMINDLY_MAIL_API_URL.
    #[serde(default)]
    pub mail_api_url: Option<String>,

    /// Relay bearer token. Read from REMINDLY_MAIL_API_KEY.
    #[serde(default)]
    pub mail_api_key: Option<String>,

    /// Sender address. Read from REMINDLY_MAIL_FROM (or EMAIL_FROM).
    #[serde(default)]
    pub mail_from: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("REMINDLY").try_parsing(true));
        if let Ok(path) = std::env::var("REMINDLY_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // EMAIL_FROM is read directly (no prefix) so an existing .env keeps working
        if cfg.mail_from.is_none() {
            cfg.mail_from = std::env::var("EMAIL_FROM").ok();
        }
        Ok(cfg)
    }

    /// Returns the data directory. Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Returns scan interval in seconds. Defaults to DEFAULT_SCAN_INTERVAL_SECS; zero is treated as unset.
    pub fn scan_interval_secs_or_default(&self) -> u64 {
        self.scan_interval_secs
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_SCAN_INTERVAL_SECS)
    }

    /// Returns the sender address. Defaults to DEFAULT_MAIL_FROM.
    pub fn mail_from_or_default(&self) -> String {
        self.mail_from
            .clone()
            .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string())
    }

    /// Returns the relay key, empty if unset.
    pub fn mail_api_key_or_default(&self) -> String {
        self.mail_api_key.clone().unwrap_or_default()
    }

    /// Returns true if a mail relay is configured (URL present and non-empty).
    pub fn is_mail_configured(&self) -> bool {
        self.mail_api_url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}
