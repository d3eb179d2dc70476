//! Storefront configuration.
//!
//! Values come from environment variables, with a default for each:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `STOREFRONT_CATALOG` | bundled catalog | Path to a products JSON file |
//! | `STOREFRONT_API_LATENCY_MS` | `0` | Simulated latency of the mock remote store |
//! | `STOREFRONT_BROADCAST_CAPACITY` | `16` | Actions buffered per observer |
//! | `STOREFRONT_CHECKOUT_TIMEOUT_MS` | `5000` | How long `checkout_and_wait` waits |
//! | `STOREFRONT_LOG` | `storefront_cart=info,storefront_runtime=info` | `tracing` filter |
//!
//! # Example
//!
//! ```
//! use storefront_cart::config::StorefrontConfig;
//!
//! let config = StorefrontConfig::from_lookup(|key| match key {
//!     "STOREFRONT_API_LATENCY_MS" => Some("250".to_string()),
//!     _ => None,
//! })?;
//!
//! assert_eq!(config.api_latency_ms, 250);
//! assert_eq!(config.broadcast_capacity, 16);
//! # Ok::<(), storefront_cart::config::ConfigError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use storefront_runtime::StoreConfig;
use thiserror::Error;

/// Catalog file variable
pub const CATALOG_VAR: &str = "STOREFRONT_CATALOG";
/// Mock latency variable
pub const API_LATENCY_VAR: &str = "STOREFRONT_API_LATENCY_MS";
/// Broadcast capacity variable
pub const BROADCAST_CAPACITY_VAR: &str = "STOREFRONT_BROADCAST_CAPACITY";
/// Checkout wait variable
pub const CHECKOUT_TIMEOUT_VAR: &str = "STOREFRONT_CHECKOUT_TIMEOUT_MS";
/// Log filter variable
pub const LOG_VAR: &str = "STOREFRONT_LOG";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable holds a value that does not parse
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// Configuration validation failed
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Products JSON file; `None` uses the bundled catalog
    pub catalog_path: Option<PathBuf>,
    /// Simulated latency of the mock remote store, in milliseconds
    pub api_latency_ms: u64,
    /// Actions buffered per observer before it lags
    pub broadcast_capacity: usize,
    /// How long `checkout_and_wait` waits for the outcome, in milliseconds
    pub checkout_timeout_ms: u64,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            api_latency_ms: 0,
            broadcast_capacity: 16,
            checkout_timeout_ms: 5_000,
            log_filter: "storefront_cart=info,storefront_runtime=info".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable does not parse or the result is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through `lookup`, which maps a variable name to its value
    ///
    /// Unset and empty variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable does not parse or the result is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(path) = get(CATALOG_VAR) {
            config.catalog_path = Some(PathBuf::from(path));
        }
        if let Some(value) = get(API_LATENCY_VAR) {
            config.api_latency_ms = parse(API_LATENCY_VAR, &value)?;
        }
        if let Some(value) = get(BROADCAST_CAPACITY_VAR) {
            config.broadcast_capacity = parse(BROADCAST_CAPACITY_VAR, &value)?;
        }
        if let Some(value) = get(CHECKOUT_TIMEOUT_VAR) {
            config.checkout_timeout_ms = parse(CHECKOUT_TIMEOUT_VAR, &value)?;
        }
        if let Some(filter) = get(LOG_VAR) {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] for a zero broadcast capacity or a
    /// zero checkout timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Validation(
                "broadcast_capacity must be > 0".to_string(),
            ));
        }
        if self.checkout_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "checkout_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Mock latency as a `Duration`
    #[must_use]
    pub const fn api_latency(&self) -> Duration {
        Duration::from_millis(self.api_latency_ms)
    }

    /// Checkout wait as a `Duration`
    #[must_use]
    pub const fn checkout_timeout(&self) -> Duration {
        Duration::from_millis(self.checkout_timeout_ms)
    }

    /// Store runtime settings derived from this configuration
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::default().with_broadcast_capacity(self.broadcast_capacity)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
