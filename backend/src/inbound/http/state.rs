//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without a real sieve.

use std::sync::Arc;

use crate::domain::ports::PrimeQuery;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub primes: Arc<dyn PrimeQuery>,
}

impl HttpState {
    /// Construct state from the prime lookup port.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use sieve::domain::ports::FixturePrimeQuery;
    /// use sieve::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixturePrimeQuery));
    /// let _ = state.primes.clone();
    /// ```
    pub fn new(primes: Arc<dyn PrimeQuery>) -> Self {
        Self { primes }
    }
}
