//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │     Remote      │  │       Database          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Http {status}  │  │  Database(DbError)      │ │
//! │  │  MissingCreds   │  │  Network        │  │                         │ │
//! │  │  InvalidUrl     │  │  Timeout        │  │                         │ │
//! │  │  ConfigLoad/Save│  │  Decode         │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐                              │
//! │  │    Catalog      │  │    Pipeline     │                              │
//! │  │                 │  │                 │                              │
//! │  │  ProductNotFound│  │  AlreadyRunning │                              │
//! │  │  InvalidValue   │  │  TaskFailed     │                              │
//! │  └─────────────────┘  └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Inside a Full Sync
//! Remote errors stop the producer and end the run normally with a partial
//! count. Database errors on one record are logged against that record and
//! the run continues. Only setup errors (config, first remote call, opening
//! the store) reach the caller as `Err`.

use catalog_core::ValidationError;
use catalog_db::DbError;
use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// A required credential is not configured.
    #[error("Missing {0}. Set it in the config file or environment.")]
    MissingCredential(&'static str),

    /// Invalid store URL.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Remote Errors
    // =========================================================================
    /// The remote answered with a non-2xx status.
    #[error("Remote returned HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// The request never got an answer (DNS, TLS, connection reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The response body was not the JSON we expected.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    // =========================================================================
    // Database Errors
    // =========================================================================
    /// Record store failure.
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// No local product with this remote id.
    #[error("Product {0} not found in local database")]
    ProductNotFound(i64),

    /// A user-supplied field name or value was rejected.
    #[error("Invalid value: {0}")]
    InvalidValue(#[from] ValidationError),

    // =========================================================================
    // Pipeline Errors
    // =========================================================================
    /// A full sync is already in progress on this service.
    #[error("A full sync is already running")]
    AlreadyRunning,

    /// A pipeline task panicked or was aborted.
    #[error("Sync task failed: {0}")]
    TaskFailed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();

        if let Some(status) = err.status() {
            SyncError::Http {
                status: status.as_u16(),
                url,
            }
        } else if err.is_timeout() {
            SyncError::Timeout(err.to_string())
        } else if err.is_decode() {
            SyncError::Decode(err.to_string())
        } else {
            SyncError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        SyncError::TaskFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if trying again later may succeed.
    ///
    /// ## Retryable Errors
    /// - Network failures and timeouts
    /// - 5xx and 429 responses
    ///
    /// Nothing in this crate retries automatically; this is for callers.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Network(_) | SyncError::Timeout(_) => true,
            SyncError::Http { status, .. } => *status >= 500 || *status == 429,
            SyncError::Database(DbError::PoolExhausted) => true,
            _ => false,
        }
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::MissingCredential(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoadFailed(_)
                | SyncError::ConfigSaveFailed(_)
        ) || matches!(self, SyncError::Http { status: 401 | 403, .. })
    }

    /// Returns true if the error came from talking to the remote store.
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            SyncError::Http { .. }
                | SyncError::Network(_)
                | SyncError::Timeout(_)
                | SyncError::Decode(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(SyncError::Network("reset".into()).is_retryable());
        assert!(SyncError::Timeout("30s".into()).is_retryable());
        assert!(SyncError::Http {
            status: 503,
            url: String::new()
        }
        .is_retryable());

        assert!(!SyncError::Http {
            status: 404,
            url: String::new()
        }
        .is_retryable());
        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
        assert!(!SyncError::ProductNotFound(1).is_retryable());
    }

    #[test]
    fn test_config_errors() {
        assert!(SyncError::MissingCredential("api key").is_config_error());
        assert!(SyncError::Http {
            status: 401,
            url: String::new()
        }
        .is_config_error());
        assert!(!SyncError::Network("x".into()).is_config_error());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::Http {
            status: 500,
            url: "https://shop.example/wp-json/wc/v3/products".into(),
        };
        assert!(err.to_string().contains("HTTP 500"));
        assert_eq!(
            SyncError::ProductNotFound(42).to_string(),
            "Product 42 not found in local database"
        );
    }

    #[test]
    fn test_db_error_converts() {
        let err: SyncError = DbError::PoolExhausted.into();
        assert!(matches!(err, SyncError::Database(_)));
        assert!(err.is_retryable());
    }
}
