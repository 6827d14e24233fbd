//! Prime location by bounded segmented sieve.
//!
//! Purpose: answer "which prime sits at 0-based index `n`" without holding
//! the whole range in memory. A lookup runs three stages:
//!
//! 1. [`estimate_upper_bound`] sizes the search range from the prime number
//!    theorem plus a safety margin.
//! 2. [`seed_primes`] sieves every prime up to the square root of that bound.
//! 3. [`scan_segments`] walks the odd numbers window by window, crossing out
//!    multiples of the seeds and counting survivors.
//!
//! An undersized bound is detected (the scan runs dry) and the pipeline is
//! re-run with a doubled bound, up to a fixed number of attempts and never past
//! a configured ceiling on the search range. Everything
//! here is synchronous and CPU-bound; async callers offload it to a blocking
//! worker.

mod bound;
mod cache;
mod cancel;
mod locator;
mod seed;
mod segment;

pub use bound::{
    DEFAULT_MAX_UPPER_BOUND, DEFAULT_SAFETY_MARGIN, MAX_UPPER_BOUND, MIN_UPPER_BOUND, escalate_bound,
    estimate_upper_bound,
};
pub use cache::{CacheLookup, PrimeCache};
pub use cancel::{CancelFlag, CancelOnDrop};
pub use locator::{
    DEFAULT_MAX_ATTEMPTS, LocateError, LocatorConfig, LocatorConfigError, PrimeLocator, nth_prime,
};
pub use seed::{SeedError, seed_primes};
pub use segment::{DEFAULT_WINDOW_SIZE, ResumePoint, ScanOutcome, ScanRequest, scan_segments};
