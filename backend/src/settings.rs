//! Service settings loaded via OrthoConfig.
//!
//! Values layer defaults, an optional configuration file, `SIEVE_*`
//! environment variables and command-line flags. Unset fields fall back to the
//! locator and server defaults.

use std::net::{SocketAddr, ToSocketAddrs};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::primes::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_UPPER_BOUND, DEFAULT_SAFETY_MARGIN, DEFAULT_WINDOW_SIZE,
    LocatorConfig, LocatorConfigError,
};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

/// Default number of primes retained by the shared cache.
pub const DEFAULT_CACHE_CAPACITY: usize = 1_000_000;

/// Failures turning raw settings into runtime configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Host and port did not resolve to a socket address.
    #[error("invalid bind address {addr}: {reason}")]
    InvalidBindAddress { addr: String, reason: String },
    /// Locator tunables were rejected.
    #[error(transparent)]
    Locator(#[from] LocatorConfigError),
}

/// Configuration values for the prime service.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SIEVE")]
pub struct SieveSettings {
    /// Interface the HTTP server binds to.
    pub host: Option<String>,
    /// Port the HTTP server binds to.
    pub port: Option<u16>,
    /// Width, in integers, of one sieve segment.
    pub window_size: Option<usize>,
    /// Multiplier applied to the upper-bound estimate.
    pub safety_margin: Option<f64>,
    /// Scan attempts before a lookup gives up.
    pub max_attempts: Option<u32>,
    /// Number of primes kept in the shared cache; zero disables caching.
    pub cache_capacity: Option<usize>,
    /// Largest search range one lookup may sieve.
    pub max_upper_bound: Option<u64>,
    /// Comma-separated origins allowed to call the API from a browser.
    pub cors_origins: Option<String>,
}

impl SieveSettings {
    /// Return the configured host, falling back to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Return the configured port, falling back to 8080.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    /// Return the configured cache capacity.
    pub fn cache_capacity(&self) -> usize {
        self.cache_capacity.unwrap_or(DEFAULT_CACHE_CAPACITY)
    }

    /// Return the configured CORS origins, trimmed, with blanks dropped.
    ///
    /// An empty list keeps cross-origin browser requests disabled.
    pub fn cors_origins(&self) -> Vec<&str> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    /// Resolve host and port to the first matching socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let addr = format!("{}:{}", self.host(), self.port());
        let invalid = |reason: String| SettingsError::InvalidBindAddress {
            addr: addr.clone(),
            reason,
        };
        addr.to_socket_addrs()
            .map_err(|err| invalid(err.to_string()))?
            .next()
            .ok_or_else(|| invalid("no addresses resolved".to_owned()))
    }

    /// Build validated locator tunables.
    pub fn locator_config(&self) -> Result<LocatorConfig, SettingsError> {
        Ok(LocatorConfig::new(
            self.window_size.unwrap_or(DEFAULT_WINDOW_SIZE),
            self.safety_margin.unwrap_or(DEFAULT_SAFETY_MARGIN),
            self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
        )?
        .with_max_upper_bound(self.max_upper_bound.unwrap_or(DEFAULT_MAX_UPPER_BOUND))?)
    }
}
