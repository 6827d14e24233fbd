//! Segmented sieve scan over the odd numbers up to an upper bound.
//!
//! The number line is cut into windows of a fixed width. Each window gets its
//! own marker array over its odd members; seed primes cross out their odd
//! multiples, and the survivors are counted in ascending order until the
//! target index is reached.

use std::num::NonZeroUsize;

use super::CancelFlag;

/// Default window width, in integers, of one scan segment.
pub const DEFAULT_WINDOW_SIZE: usize = 100_000;

/// A known prime and its 0-based index, from which a scan continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumePoint {
    /// 0-based index of `prime`.
    pub index: u64,
    /// The prime at `index`.
    pub prime: u64,
}

impl ResumePoint {
    /// Start of the sequence: index 0 is the prime 2.
    pub const ORIGIN: Self = Self { index: 0, prime: 2 };

    fn first_candidate(self) -> u64 {
        if self.prime < 3 {
            3
        } else {
            self.prime.saturating_add(2)
        }
    }
}

/// Inputs for one scan pass.
#[derive(Debug, Clone, Copy)]
pub struct ScanRequest<'a> {
    /// Ascending primes up to at least `isqrt(upper_bound)`.
    pub seeds: &'a [u64],
    /// Inclusive end of the search range.
    pub upper_bound: u64,
    /// Window width in integers.
    pub window_size: NonZeroUsize,
    /// Last known prime; the scan starts at the next odd number.
    pub resume: ResumePoint,
    /// 0-based index of the prime being located. Must exceed `resume.index`.
    pub target_index: u64,
    /// How many discovered primes to hand back for caching.
    pub collect_limit: usize,
}

/// Result of a scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The target prime was reached.
    Found {
        prime: u64,
        /// Primes following the resume point, ascending, capped at
        /// `collect_limit`. Includes `prime` when under the cap.
        discovered: Vec<u64>,
    },
    /// The range ran out before the running count reached zero.
    Exhausted { discovered: Vec<u64> },
    /// The cancel flag was observed between segments.
    Cancelled,
}

/// Scan `[resume + 1, upper_bound]` for the prime at `target_index`.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
///
/// use sieve::domain::primes::{
///     CancelFlag, ResumePoint, ScanOutcome, ScanRequest, scan_segments, seed_primes,
/// };
///
/// let seeds = seed_primes(24, &CancelFlag::new()).expect("seed table");
/// let request = ScanRequest {
///     seeds: &seeds,
///     upper_bound: 600,
///     window_size: NonZeroUsize::new(64).expect("non-zero"),
///     resume: ResumePoint::ORIGIN,
///     target_index: 99,
///     collect_limit: 0,
/// };
/// let outcome = scan_segments(&request, &CancelFlag::new());
/// assert!(matches!(outcome, ScanOutcome::Found { prime: 541, .. }));
/// ```
#[must_use]
pub fn scan_segments(request: &ScanRequest<'_>, cancel: &CancelFlag) -> ScanOutcome {
    let mut remaining = request.target_index.saturating_sub(request.resume.index);
    let mut discovered = Vec::new();
    if remaining == 0 {
        return ScanOutcome::Found {
            prime: request.resume.prime,
            discovered,
        };
    }
    let Some(last_odd) = last_odd_at_most(request.upper_bound) else {
        return ScanOutcome::Exhausted { discovered };
    };

    // Odd slots per window; a width of 1 still advances one odd number.
    let slots = u64::try_from(request.window_size.get().div_ceil(2)).unwrap_or(u64::MAX);
    let span = slots.saturating_sub(1).saturating_mul(2);
    let mut low = request.resume.first_candidate();

    while low <= last_odd {
        if cancel.is_cancelled() {
            return ScanOutcome::Cancelled;
        }

        let high = low.saturating_add(span).min(last_odd);
        let mut composite = vec![false; saturating_usize(((high - low) >> 1) + 1)];
        mark_composites(&mut composite, low, high, request.seeds);

        let survivors = composite
            .iter()
            .zip((low..=high).step_by(2))
            .filter(|(marked, _)| !**marked)
            .map(|(_, candidate)| candidate);
        for prime in survivors {
            if discovered.len() < request.collect_limit {
                discovered.push(prime);
            }
            remaining -= 1;
            if remaining == 0 {
                return ScanOutcome::Found { prime, discovered };
            }
        }

        match high.checked_add(2) {
            Some(next) => low = next,
            None => break,
        }
    }

    ScanOutcome::Exhausted { discovered }
}

/// Cross out odd multiples of each seed within `[low, high]`.
///
/// `composite[i]` stands for `low + 2i`; `low` is odd.
fn mark_composites(composite: &mut [bool], low: u64, high: u64, seeds: &[u64]) {
    for &prime in seeds.iter().skip_while(|&&p| p < 3) {
        let Some(square) = prime.checked_mul(prime) else {
            break;
        };
        // Seeds ascend, so every later seed also starts past this window.
        if square > high {
            break;
        }

        let mut first = square.max(low.div_ceil(prime).saturating_mul(prime));
        if first & 1 == 0 {
            first += prime;
        }
        if first > high {
            continue;
        }

        // Consecutive odd multiples are 2p apart, i.e. p slots.
        for slot in composite
            .iter_mut()
            .skip(saturating_usize((first - low) >> 1))
            .step_by(saturating_usize(prime))
        {
            *slot = true;
        }
    }
}

fn last_odd_at_most(bound: u64) -> Option<u64> {
    let odd = if bound & 1 == 0 { bound.checked_sub(1)? } else { bound };
    (odd >= 3).then_some(odd)
}

/// Offsets and strides beyond `usize` cannot land inside an in-memory window,
/// so saturating keeps the iteration correct on narrow targets.
fn saturating_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
