//! Async use-case service backing the [`PrimeQuery`] port.
//!
//! Lookups are CPU-bound, so each one runs on Tokio's blocking pool. The
//! awaiting future holds a [`CancelOnDrop`] guard: if the request is dropped
//! mid-flight, the worker stops at its next segment boundary.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{Instrument as _, error, field, info_span};

use crate::domain::Error;
use crate::domain::TraceId;
use crate::domain::ports::PrimeQuery;
use crate::domain::primes::{CancelFlag, CancelOnDrop, LocateError, PrimeLocator};

/// Message returned to clients for negative indices.
pub const NEGATIVE_INDEX_MESSAGE: &str = "Negative Indexed Prime Numbers are not Allowed.";

/// Prime lookups on the blocking pool.
#[derive(Debug, Clone)]
pub struct PrimeLocatorService {
    locator: Arc<PrimeLocator>,
}

impl PrimeLocatorService {
    /// Wrap a locator for async callers.
    pub fn new(locator: Arc<PrimeLocator>) -> Self {
        Self { locator }
    }
}

#[async_trait]
impl PrimeQuery for PrimeLocatorService {
    async fn nth_prime(&self, index: i64) -> Result<i64, Error> {
        if index < 0 {
            return Err(LocateError::invalid_index(index).into());
        }

        let span = info_span!("nth_prime", index, trace_id = field::Empty);
        let trace_id = TraceId::current();
        if let Some(id) = trace_id {
            span.record("trace_id", field::display(id));
        }

        let locator = Arc::clone(&self.locator);
        let cancel = CancelFlag::new();
        let guard = CancelOnDrop::new(cancel.clone());
        let worker_span = span.clone();
        let joined = tokio::task::spawn_blocking(move || {
            let _entered = worker_span.enter();
            let run = || locator.nth_prime_with_cancel(index, &cancel);
            match trace_id {
                Some(id) => TraceId::sync_scope(id, run),
                None => run(),
            }
        })
        .instrument(span)
        .await;
        guard.disarm();

        match joined {
            Ok(result) => result.map_err(Error::from),
            Err(join_error) => {
                error!(index, error = %join_error, "prime lookup worker failed");
                Err(Error::internal("prime lookup worker failed"))
            }
        }
    }
}

impl From<LocateError> for Error {
    fn from(err: LocateError) -> Self {
        let details = match &err {
            LocateError::InvalidIndex { index } => {
                return Error::invalid_request(NEGATIVE_INDEX_MESSAGE).with_details(json!({
                    "field": "n",
                    "code": "negative_index",
                    "value": index,
                }));
            }
            LocateError::ResourceLimit {
                index,
                bound,
                limit,
            } => {
                return Error::invalid_request(err.to_string()).with_details(json!({
                    "field": "n",
                    "code": "index_too_large",
                    "value": index,
                    "bound": bound,
                    "limit": limit,
                }));
            }
            LocateError::BoundExceeded {
                bound, attempts, ..
            } => json!({ "code": err.kind(), "bound": bound, "attempts": attempts }),
            LocateError::OutOfMemory { bound, .. } => json!({ "code": err.kind(), "bound": bound }),
            LocateError::Overflow { .. } | LocateError::Cancelled => json!({ "code": err.kind() }),
        };

        if matches!(err, LocateError::Cancelled | LocateError::OutOfMemory { .. }) {
            return Error::service_unavailable(err.to_string()).with_details(details);
        }
        error!(error = %err, kind = err.kind(), "prime lookup failed");
        Error::internal(err.to_string()).with_details(details)
    }
}
