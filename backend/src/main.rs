//! Service entry-point: loads settings, wires the prime locator, and serves
//! the HTTP API.

mod server;

#[cfg(feature = "metrics")]
use std::fmt::Display;
use std::sync::Arc;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use sieve::domain::PrimeLocatorService;
use sieve::domain::primes::{PrimeCache, PrimeLocator};
use sieve::inbound::http::health::HealthState;
use sieve::inbound::http::state::HttpState;
use sieve::settings::SieveSettings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = SieveSettings::load().map_err(|e| std::io::Error::other(e.to_string()))?;
    let locator_config = settings.locator_config().map_err(std::io::Error::other)?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;

    let mut locator = PrimeLocator::new(locator_config);
    let cache_capacity = settings.cache_capacity();
    if cache_capacity > 0 {
        locator = locator.with_cache(Arc::new(PrimeCache::new(cache_capacity)));
    }
    info!(
        window_size = locator_config.window_size(),
        safety_margin = locator_config.safety_margin(),
        max_attempts = locator_config.max_attempts(),
        max_upper_bound = locator_config.max_upper_bound(),
        cache_capacity,
        "prime locator configured"
    );

    let primes = PrimeLocatorService::new(Arc::new(locator));
    let http_state = web::Data::new(HttpState::new(Arc::new(primes)));
    let health_state = web::Data::new(HealthState::new());

    let config = ServerConfig::new(bind_addr).with_cors_origins(settings.cors_origins());
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(initialize_metrics(|| {
        PrometheusMetricsBuilder::new("sieve")
            .endpoint("/metrics")
            .build()
    }));

    info!(bind_addr = %config.bind_addr(), "starting prime service");
    create_server(health_state, http_state, config)?.await
}

/// Build Prometheus middleware, logging and continuing without it on failure.
#[cfg(feature = "metrics")]
fn initialize_metrics<F, E>(build: F) -> Option<PrometheusMetrics>
where
    F: FnOnce() -> Result<PrometheusMetrics, E>,
    E: Display,
{
    match build() {
        Ok(metrics) => Some(metrics),
        Err(error) => {
            warn!(error = %error, "failed to initialise Prometheus metrics; continuing without them");
            None
        }
    }
}
