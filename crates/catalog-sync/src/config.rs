//! # Sync Configuration
//!
//! Configuration management for the sync engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     WOO_API_URL=https://shop.example                                   │
//! │     WOO_API_KEY=ck_...   WOO_API_SECRET=cs_...                         │
//! │     CATALOG_DB_PATH=/var/lib/catalog/catalog.db                        │
//! │     CATALOG_PAGE_SIZE=50                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/catalog-sync/catalog.toml (Linux)                        │
//! │     ~/Library/Application Support/com.catalog.catalog-sync/... (macOS) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Credentials are read once, here. The remote client receives them through
//! its constructor and never looks at the environment itself.
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! url = "https://shop.example"
//! key = "ck_..."
//! secret = "cs_..."
//!
//! [sync]
//! page_size = 50
//! queue_capacity = 100
//! dequeue_timeout_secs = 5
//! enqueue_poll_ms = 250
//! progress_interval_ms = 100
//! request_timeout_secs = 30
//!
//! [database]
//! path = "/home/me/.local/share/catalog-sync/catalog.db"
//!
//! [display]
//! show_tax = true
//! tax_rate_percent = 19
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{SyncError, SyncResult};
use crate::pipeline::PipelineSettings;

/// Largest page the store's REST API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Highest accepted display tax rate.
pub const MAX_TAX_RATE_PERCENT: u32 = 100;

// =============================================================================
// Store Credentials
// =============================================================================

/// Remote store location and REST API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Base URL of the shop, without the `/wp-json` suffix.
    #[serde(default)]
    pub url: String,

    /// REST API consumer key.
    #[serde(default)]
    pub key: String,

    /// REST API consumer secret.
    #[serde(default)]
    pub secret: String,
}

impl std::fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSettings")
            .field("url", &self.url)
            .field("key", &mask(&self.key))
            .field("secret", &mask(&self.secret))
            .finish()
    }
}

impl StoreSettings {
    /// Checks that all three values are present and the URL is http(s).
    ///
    /// Not part of [`SyncConfig::validate`]: local-only commands such as
    /// search and edit work without credentials.
    pub fn require_credentials(&self) -> SyncResult<Url> {
        if self.url.trim().is_empty() {
            return Err(SyncError::MissingCredential("store URL (WOO_API_URL)"));
        }
        if self.key.trim().is_empty() {
            return Err(SyncError::MissingCredential("API key (WOO_API_KEY)"));
        }
        if self.secret.trim().is_empty() {
            return Err(SyncError::MissingCredential("API secret (WOO_API_SECRET)"));
        }

        let url = Url::parse(self.url.trim())?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::InvalidUrl(format!(
                "Store URL must start with http:// or https://, got: {}",
                self.url
            )));
        }
        Ok(url)
    }
}

/// Shows only the last four characters of a credential.
pub fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{}", "*".repeat(chars.len() - 4), tail)
}

// =============================================================================
// Sync Settings
// =============================================================================

/// Pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Records requested per page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Bounded queue capacity between producer and consumer.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Consumer wait on an empty queue before re-checking cancellation (seconds).
    #[serde(default = "default_dequeue_timeout")]
    pub dequeue_timeout_secs: u64,

    /// Producer wait on a full queue before re-checking cancellation (milliseconds).
    #[serde(default = "default_enqueue_poll")]
    pub enqueue_poll_ms: u64,

    /// How often the supervising loop reports progress (milliseconds).
    #[serde(default = "default_progress_interval")]
    pub progress_interval_ms: u64,

    /// Per-request HTTP timeout (seconds).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_page_size() -> u32 {
    50
}
fn default_queue_capacity() -> usize {
    100
}
fn default_dequeue_timeout() -> u64 {
    5
}
fn default_enqueue_poll() -> u64 {
    250
}
fn default_progress_interval() -> u64 {
    100
}
fn default_request_timeout() -> u64 {
    30
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            page_size: default_page_size(),
            queue_capacity: default_queue_capacity(),
            dequeue_timeout_secs: default_dequeue_timeout(),
            enqueue_poll_ms: default_enqueue_poll(),
            progress_interval_ms: default_progress_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl SyncSettings {
    /// Converts the file-level knobs into pipeline settings.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            page_size: self.page_size,
            queue_capacity: self.queue_capacity,
            dequeue_timeout: Duration::from_secs(self.dequeue_timeout_secs),
            enqueue_poll: Duration::from_millis(self.enqueue_poll_ms),
            progress_interval: Duration::from_millis(self.progress_interval_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// =============================================================================
// Database Settings
// =============================================================================

/// Where the local record store lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "catalog", "catalog-sync")
        .map(|dirs| dirs.data_dir().join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("catalog.db"))
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

/// How prices are shown in listings. Stored prices are always net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Show listing prices with tax added.
    #[serde(default = "default_show_tax")]
    pub show_tax: bool,

    #[serde(default = "default_tax_rate")]
    pub tax_rate_percent: u32,
}

fn default_show_tax() -> bool {
    true
}
fn default_tax_rate() -> u32 {
    19
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            show_tax: default_show_tax(),
            tax_rate_percent: default_tax_rate(),
        }
    }
}

impl DisplaySettings {
    /// The rate to add to listed prices, if tax display is on.
    pub fn listing_tax_rate(&self) -> Option<u32> {
        self.show_tax.then_some(self.tax_rate_percent)
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete configuration for the catalog sync tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Remote store connection.
    #[serde(default)]
    pub store: StoreSettings,

    /// Pipeline tuning.
    #[serde(default)]
    pub sync: SyncSettings,

    /// Local database.
    #[serde(default)]
    pub database: DatabaseSettings,

    /// Listing preferences.
    #[serde(default)]
    pub display: DisplaySettings,
}

impl SyncConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (catalog.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::from_file(config_path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Reads the config file over defaults, without environment overrides
    /// or validation. A missing file yields the defaults.
    pub fn from_file(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let Some(path) = config_path.or_else(Self::default_config_path) else {
            return Ok(Self::default());
        };

        if !path.exists() {
            debug!(?path, "Config file not found, using defaults");
            return Ok(Self::default());
        }

        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the pipeline settings.
    pub fn validate(&self) -> SyncResult<()> {
        let sync = &self.sync;

        if sync.page_size == 0 || sync.page_size > MAX_PAGE_SIZE {
            return Err(SyncError::InvalidConfig(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, sync.page_size
            )));
        }
        if sync.queue_capacity == 0 {
            return Err(SyncError::InvalidConfig(
                "queue_capacity must be greater than 0".into(),
            ));
        }
        if sync.dequeue_timeout_secs == 0 || sync.enqueue_poll_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "queue wait timeouts must be greater than 0".into(),
            ));
        }
        if sync.progress_interval_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "progress_interval_ms must be greater than 0".into(),
            ));
        }
        if sync.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        if self.display.tax_rate_percent > MAX_TAX_RATE_PERCENT {
            return Err(SyncError::InvalidConfig(format!(
                "tax_rate_percent must be at most {}, got {}",
                MAX_TAX_RATE_PERCENT, self.display.tax_rate_percent
            )));
        }
        if !self.store.url.trim().is_empty() {
            Url::parse(self.store.url.trim())?;
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any variable lookup.
    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("WOO_API_URL") {
            debug!(url = %url, "Overriding store URL from environment");
            self.store.url = url;
        }
        if let Some(key) = lookup("WOO_API_KEY") {
            self.store.key = key;
        }
        if let Some(secret) = lookup("WOO_API_SECRET") {
            self.store.secret = secret;
        }
        if let Some(path) = lookup("CATALOG_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }
        if let Some(size) = lookup("CATALOG_PAGE_SIZE") {
            match size.parse::<u32>() {
                Ok(n) => self.sync.page_size = n,
                Err(_) => warn!(value = %size, "Ignoring non-numeric CATALOG_PAGE_SIZE"),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "catalog", "catalog-sync")
            .map(|dirs| dirs.config_dir().join("catalog.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.sync.page_size, 50);
        assert_eq!(config.sync.queue_capacity, 100);
        assert_eq!(config.sync.dequeue_timeout_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();

        config.sync.page_size = 0;
        assert!(config.validate().is_err());

        config.sync.page_size = 101;
        assert!(config.validate().is_err());

        config.sync.page_size = 100;
        assert!(config.validate().is_ok());

        config.sync.queue_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_credentials() {
        let mut store = StoreSettings::default();
        assert!(matches!(
            store.require_credentials(),
            Err(SyncError::MissingCredential(_))
        ));

        store.url = "ftp://shop.example".into();
        store.key = "ck_123".into();
        store.secret = "cs_456".into();
        assert!(matches!(
            store.require_credentials(),
            Err(SyncError::InvalidUrl(_))
        ));

        store.url = "https://shop.example".into();
        let url = store.require_credentials().unwrap();
        assert_eq!(url.host_str(), Some("shop.example"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("WOO_API_URL", "https://env.example"),
            ("WOO_API_KEY", "ck_env"),
            ("CATALOG_DB_PATH", "/tmp/env.db"),
            ("CATALOG_PAGE_SIZE", "20"),
        ]
        .into_iter()
        .collect();

        let mut config = SyncConfig::default();
        config.store.secret = "cs_file".into();
        config.apply_overrides_from(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.store.url, "https://env.example");
        assert_eq!(config.store.key, "ck_env");
        assert_eq!(config.store.secret, "cs_file");
        assert_eq!(config.database.path, PathBuf::from("/tmp/env.db"));
        assert_eq!(config.sync.page_size, 20);
    }

    #[test]
    fn test_bad_page_size_override_ignored() {
        let mut config = SyncConfig::default();
        config.apply_overrides_from(|name| {
            (name == "CATALOG_PAGE_SIZE").then(|| "lots".to_string())
        });
        assert_eq!(config.sync.page_size, 50);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SyncConfig = toml::from_str(
            r#"
            [store]
            url = "https://shop.example"

            [sync]
            page_size = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.store.url, "https://shop.example");
        assert_eq!(config.sync.page_size, 25);
        assert_eq!(config.sync.queue_capacity, 100);
        assert_eq!(config.display, DisplaySettings::default());
    }

    #[test]
    fn test_display_settings() {
        let mut config: SyncConfig = toml::from_str(
            r#"
            [display]
            show_tax = false
            "#,
        )
        .unwrap();
        assert_eq!(config.display.tax_rate_percent, 19);
        assert_eq!(config.display.listing_tax_rate(), None);

        config.display.show_tax = true;
        assert_eq!(config.display.listing_tax_rate(), Some(19));

        config.display.tax_rate_percent = 101;
        assert!(matches!(config.validate(), Err(SyncError::InvalidConfig(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir().join(format!(
            "catalog-sync-config-{}.toml",
            std::process::id()
        ));

        let mut config = SyncConfig::default();
        config.store.url = "https://shop.example".into();
        config.sync.page_size = 30;
        config.display.show_tax = false;
        let written = config.save(Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let reloaded = SyncConfig::from_file(Some(path.clone())).unwrap();
        assert_eq!(reloaded.store.url, "https://shop.example");
        assert_eq!(reloaded.sync.page_size, 30);
        assert!(!reloaded.display.show_tax);

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("catalog-sync-does-not-exist.toml");
        let config = SyncConfig::from_file(Some(path)).unwrap();
        assert_eq!(config.sync.page_size, 50);
    }

    #[test]
    fn test_toml_serialization() {
        let config = SyncConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[sync]"));
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[display]"));
    }

    #[test]
    fn test_pipeline_settings() {
        let settings = SyncSettings::default().pipeline_settings();
        assert_eq!(settings.page_size, 50);
        assert_eq!(settings.dequeue_timeout, Duration::from_secs(5));
        assert_eq!(settings.enqueue_poll, Duration::from_millis(250));
    }

    #[test]
    fn test_debug_masks_secrets() {
        let store = StoreSettings {
            url: "https://shop.example".into(),
            key: "ck_abcdef123".into(),
            secret: "cs_zyxw9876".into(),
        };
        let shown = format!("{store:?}");
        assert!(!shown.contains("ck_abcdef123"));
        assert!(shown.contains("9876"));
        assert_eq!(mask("abc"), "***");
    }
}
