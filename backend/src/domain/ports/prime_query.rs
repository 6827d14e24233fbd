//! Driving port for n-th prime lookups.
//!
//! Inbound adapters depend on this port rather than on the sieve itself, so
//! handlers stay testable without burning CPU on real lookups.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::primes::LocateError;

/// Domain use-case port answering "which prime sits at index `n`".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PrimeQuery: Send + Sync {
    /// Return the prime at the 0-based `index`.
    ///
    /// Negative indices are rejected with an `invalid_request` error.
    async fn nth_prime(&self, index: i64) -> Result<i64, Error>;
}

/// Fixture query backed by a small literal table.
///
/// Answers the first few indices only; anything beyond the table is reported
/// as not found so tests notice when they outgrow it.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePrimeQuery;

const FIXTURE_PRIMES: [i64; 10] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29];

#[async_trait]
impl PrimeQuery for FixturePrimeQuery {
    async fn nth_prime(&self, index: i64) -> Result<i64, Error> {
        if index < 0 {
            return Err(LocateError::invalid_index(index).into());
        }
        usize::try_from(index)
            .ok()
            .and_then(|position| FIXTURE_PRIMES.get(position).copied())
            .ok_or_else(|| Error::not_found(format!("fixture has no prime at index {index}")))
    }
}
