//! The prime locator: bound, seed, scan, escalate.

use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::ports::define_port_error;

use super::{
    CacheLookup, CancelFlag, DEFAULT_MAX_UPPER_BOUND, DEFAULT_SAFETY_MARGIN, DEFAULT_WINDOW_SIZE,
    MAX_UPPER_BOUND, MIN_UPPER_BOUND, PrimeCache, ResumePoint, ScanOutcome, ScanRequest, SeedError,
    escalate_bound, estimate_upper_bound, scan_segments, seed_primes,
};

/// Default number of scan attempts, counting the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

define_port_error! {
    /// Failures surfaced by a prime lookup.
    pub enum LocateError {
        /// The index was negative.
        InvalidIndex { index: i64 } => "index {index} is negative",
        /// Every attempt ran out of range before reaching the index.
        BoundExceeded { index: i64, bound: u64, attempts: u32 } =>
            "prime at index {index} not found below {bound} after {attempts} attempt(s)",
        /// The answer or an intermediate value does not fit in `i64`.
        Overflow { index: i64 } => "prime at index {index} exceeds the 64-bit range",
        /// The search range needed for the index is above the configured ceiling.
        ResourceLimit { index: i64, bound: u64, limit: u64 } =>
            "prime at index {index} needs a search bound of {bound}, above the limit of {limit}",
        /// Working memory for the seed table could not be reserved.
        OutOfMemory { index: i64, bound: u64 } =>
            "not enough memory to search for the prime at index {index} below {bound}",
        /// The caller abandoned the lookup.
        Cancelled => "prime lookup was cancelled",
    }
}

define_port_error! {
    /// Rejections raised while validating [`LocatorConfig`] values.
    pub enum LocatorConfigError {
        /// Window width must be positive.
        ZeroWindow => "window size must be greater than zero",
        /// Margin must be a positive, finite multiplier.
        InvalidMargin { margin: String } => "safety margin {margin} must be finite and positive",
        /// At least one attempt is required.
        ZeroAttempts => "max attempts must be at least one",
        /// The search ceiling must admit the smallest bound and fit in `i64`.
        InvalidMaxBound { bound: u64 } =>
            "max upper bound {bound} must be at least 3 and at most 2^63 - 1",
    }
}

/// Tunables for the locator.
///
/// The margin and window are empirical; the retry budget covers the cases
/// where the margin is not enough.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocatorConfig {
    window_size: NonZeroUsize,
    safety_margin: f64,
    max_attempts: NonZeroU32,
    max_upper_bound: u64,
}

impl LocatorConfig {
    /// Validate and build a configuration.
    ///
    /// # Examples
    /// ```
    /// use sieve::domain::primes::{LocatorConfig, LocatorConfigError};
    ///
    /// let config = LocatorConfig::new(4_096, 1.2, 5).expect("valid config");
    /// assert_eq!(config.window_size(), 4_096);
    /// assert_eq!(
    ///     LocatorConfig::new(0, 1.2, 5),
    ///     Err(LocatorConfigError::ZeroWindow)
    /// );
    /// ```
    pub fn new(
        window_size: usize,
        safety_margin: f64,
        max_attempts: u32,
    ) -> Result<Self, LocatorConfigError> {
        let window_size = NonZeroUsize::new(window_size).ok_or(LocatorConfigError::ZeroWindow)?;
        if !safety_margin.is_finite() || safety_margin <= 0.0 {
            return Err(LocatorConfigError::invalid_margin(safety_margin.to_string()));
        }
        let max_attempts = NonZeroU32::new(max_attempts).ok_or(LocatorConfigError::ZeroAttempts)?;
        Ok(Self {
            window_size,
            safety_margin,
            max_attempts,
            max_upper_bound: DEFAULT_MAX_UPPER_BOUND,
        })
    }

    /// Replace the ceiling on the search range of one lookup.
    ///
    /// # Examples
    /// ```
    /// use sieve::domain::primes::{LocatorConfig, LocatorConfigError};
    ///
    /// let config = LocatorConfig::default()
    ///     .with_max_upper_bound(1 << 20)
    ///     .expect("valid ceiling");
    /// assert_eq!(config.max_upper_bound(), 1 << 20);
    /// assert_eq!(
    ///     LocatorConfig::default().with_max_upper_bound(2),
    ///     Err(LocatorConfigError::invalid_max_bound(2_u64))
    /// );
    /// ```
    pub fn with_max_upper_bound(mut self, bound: u64) -> Result<Self, LocatorConfigError> {
        if !(MIN_UPPER_BOUND..=MAX_UPPER_BOUND).contains(&bound) {
            return Err(LocatorConfigError::invalid_max_bound(bound));
        }
        self.max_upper_bound = bound;
        Ok(self)
    }

    /// Window width, in integers, of one scan segment.
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size.get()
    }

    /// Multiplier applied to the asymptotic estimate.
    #[must_use]
    pub fn safety_margin(&self) -> f64 {
        self.safety_margin
    }

    /// Total scan attempts before giving up.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// Largest search range a single lookup may sieve.
    #[must_use]
    pub fn max_upper_bound(&self) -> u64 {
        self.max_upper_bound
    }
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            window_size: NonZeroUsize::new(DEFAULT_WINDOW_SIZE).unwrap_or(NonZeroUsize::MIN),
            safety_margin: DEFAULT_SAFETY_MARGIN,
            max_attempts: NonZeroU32::new(DEFAULT_MAX_ATTEMPTS).unwrap_or(NonZeroU32::MIN),
            max_upper_bound: DEFAULT_MAX_UPPER_BOUND,
        }
    }
}

/// Finds the prime at a given index.
///
/// Stateless apart from the optional shared [`PrimeCache`]; one locator can
/// serve concurrent lookups from many threads.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use sieve::domain::primes::{LocatorConfig, PrimeCache, PrimeLocator};
///
/// let locator = PrimeLocator::new(LocatorConfig::default())
///     .with_cache(Arc::new(PrimeCache::new(1_024)));
/// assert_eq!(locator.nth_prime(99), Ok(541));
/// assert_eq!(locator.nth_prime(5), Ok(13));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrimeLocator {
    config: LocatorConfig,
    cache: Option<Arc<PrimeCache>>,
}

impl PrimeLocator {
    /// Build a locator without a cache.
    #[must_use]
    pub fn new(config: LocatorConfig) -> Self {
        Self {
            config,
            cache: None,
        }
    }

    /// Share `cache` between this locator and its other holders.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PrimeCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Locate the prime at the 0-based `index`.
    pub fn nth_prime(&self, index: i64) -> Result<i64, LocateError> {
        self.nth_prime_with_cancel(index, &CancelFlag::new())
    }

    /// Locate the prime at `index`, polling `cancel` while seeding and between
    /// segments.
    ///
    /// Indices whose estimated range exceeds
    /// [`LocatorConfig::max_upper_bound`] are rejected before any memory is
    /// reserved. Escalation stops at that ceiling.
    pub fn nth_prime_with_cancel(&self, index: i64, cancel: &CancelFlag) -> Result<i64, LocateError> {
        let target = u64::try_from(index).map_err(|_| LocateError::invalid_index(index))?;

        if let Some(CacheLookup::Hit(prime)) = self.cache.as_deref().map(|c| c.lookup(target)) {
            debug!(index, prime, source = "cache", "prime located");
            return to_i64(prime, index);
        }
        if target == 0 {
            return Ok(2);
        }

        let attempts = self.config.max_attempts();
        let limit = self.config.max_upper_bound();
        let mut bound = estimate_upper_bound(target, self.config.safety_margin())
            .ok_or_else(|| LocateError::overflow(index))?;
        if bound > limit {
            warn!(index, bound, limit, "estimated bound above the configured ceiling");
            return Err(LocateError::resource_limit(index, bound, limit));
        }

        for attempt in 1..=attempts {
            if let Some(prime) = self.attempt(target, bound, cancel, index)? {
                debug!(index, prime, bound, attempt, source = "sieve", "prime located");
                return to_i64(prime, index);
            }
            if attempt == attempts {
                break;
            }
            if bound >= limit {
                warn!(index, bound, limit, attempt, "ceiling exhausted before the index");
                return Err(LocateError::resource_limit(index, bound.saturating_mul(2), limit));
            }
            let next = escalate_bound(bound)
                .ok_or_else(|| LocateError::overflow(index))?
                .min(limit);
            warn!(index, bound, next_bound = next, attempt, "upper bound exhausted; escalating");
            bound = next;
        }

        Err(LocateError::bound_exceeded(index, bound, attempts))
    }

    fn attempt(
        &self,
        target: u64,
        bound: u64,
        cancel: &CancelFlag,
        index: i64,
    ) -> Result<Option<u64>, LocateError> {
        let resume = match self.cache.as_deref().map(|c| c.lookup(target)) {
            Some(CacheLookup::Hit(prime)) => return Ok(Some(prime)),
            Some(CacheLookup::Resume(point)) => point,
            None => ResumePoint::ORIGIN,
        };
        if cancel.is_cancelled() {
            return Err(LocateError::cancelled());
        }
        let limit = usize::try_from(bound.isqrt() + 1).map_err(|_| LocateError::overflow(index))?;
        let seeds = seed_primes(limit, cancel).map_err(|err| match err {
            SeedError::Allocation { .. } => {
                warn!(index, bound, error = %err, "seed table allocation failed");
                LocateError::out_of_memory(index, bound)
            }
            SeedError::Cancelled => {
                debug!(index, bound, "prime lookup cancelled while seeding");
                LocateError::cancelled()
            }
        })?;

        let request = ScanRequest {
            seeds: &seeds,
            upper_bound: bound,
            window_size: self.config.window_size,
            resume,
            target_index: target,
            collect_limit: self
                .cache
                .as_deref()
                .map_or(0, PrimeCache::remaining_capacity),
        };

        match scan_segments(&request, cancel) {
            ScanOutcome::Found { prime, discovered } => {
                self.remember(resume, &discovered);
                Ok(Some(prime))
            }
            ScanOutcome::Exhausted { discovered } => {
                self.remember(resume, &discovered);
                Ok(None)
            }
            ScanOutcome::Cancelled => {
                debug!(index, bound, "prime lookup cancelled between segments");
                Err(LocateError::cancelled())
            }
        }
    }

    fn remember(&self, resume: ResumePoint, discovered: &[u64]) {
        let Some(cache) = self.cache.as_deref() else {
            return;
        };
        if !discovered.is_empty() {
            let appended = cache.extend_from(resume.index + 1, discovered);
            debug!(appended, cached = cache.len(), "prime cache extended");
        }
    }
}

fn to_i64(prime: u64, index: i64) -> Result<i64, LocateError> {
    i64::try_from(prime).map_err(|_| LocateError::overflow(index))
}

/// Locate the prime at `index` with the default configuration and no cache.
///
/// # Examples
/// ```
/// use sieve::domain::primes::{LocateError, nth_prime};
///
/// assert_eq!(nth_prime(0), Ok(2));
/// assert_eq!(nth_prime(2_000), Ok(17_393));
/// assert_eq!(nth_prime(-1), Err(LocateError::invalid_index(-1)));
/// ```
pub fn nth_prime(index: i64) -> Result<i64, LocateError> {
    PrimeLocator::default().nth_prime(index)
}
