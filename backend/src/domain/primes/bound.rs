//! Asymptotic upper bound for the n-th prime.
//!
//! Uses `p_n < n (ln n + ln ln n)` (Rosser's bound, valid for n ≥ 6) on the
//! 1-based rank, scaled by a configurable safety margin. Small ranks can still
//! undershoot; the locator detects that from an exhausted scan and escalates.

/// Default multiplier applied to the asymptotic estimate.
pub const DEFAULT_SAFETY_MARGIN: f64 = 1.15;

/// Smallest bound handed to the scanner: the first odd candidate.
pub const MIN_UPPER_BOUND: u64 = 3;

/// Largest bound representable at all; every answer must fit in `i64`.
pub const MAX_UPPER_BOUND: u64 = i64::MAX.unsigned_abs();

/// Default ceiling on the search range of a single lookup.
///
/// Seeds for a bound `b` take `isqrt(b)` bytes and the scan touches every odd
/// number below `b`, so the ceiling caps both memory and running time. At
/// 2^40 the seed table is about 1 MiB and, with the default margin, indices
/// up to roughly 3.4e10 fit.
pub const DEFAULT_MAX_UPPER_BOUND: u64 = 1 << 40;

/// Estimate an upper bound for the prime at the 0-based `index`.
///
/// Returns `None` when the estimate is not representable: for index 0 (where
/// `ln(ln(1))` is undefined), or when it would exceed [`MAX_UPPER_BOUND`].
///
/// # Examples
/// ```
/// use sieve::domain::primes::{DEFAULT_SAFETY_MARGIN, estimate_upper_bound};
///
/// let bound = estimate_upper_bound(99, DEFAULT_SAFETY_MARGIN).expect("finite bound");
/// assert!(bound >= 541);
/// assert_eq!(estimate_upper_bound(0, DEFAULT_SAFETY_MARGIN), None);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "the estimate is an f64 formula; rounding only moves the bound by a few units"
)]
pub fn estimate_upper_bound(index: u64, margin: f64) -> Option<u64> {
    if index == 0 {
        return None;
    }
    let rank = index as f64 + 1.0;
    let ln_rank = rank.ln();
    let estimate = (rank * (ln_rank + ln_rank.ln()) * margin).ceil();
    if !estimate.is_finite() || estimate.is_sign_negative() || estimate >= MAX_UPPER_BOUND as f64 {
        return None;
    }
    Some(float_to_bound(estimate).max(MIN_UPPER_BOUND))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "callers pass a finite, non-negative, integral value below MAX_UPPER_BOUND"
)]
fn float_to_bound(estimate: f64) -> u64 {
    estimate as u64
}

/// Double a bound after an exhausted scan, saturating at [`MAX_UPPER_BOUND`].
///
/// Returns `None` once the bound is already at the ceiling: there is nowhere
/// left to search without leaving the `i64` range.
#[must_use]
pub fn escalate_bound(bound: u64) -> Option<u64> {
    if bound >= MAX_UPPER_BOUND {
        return None;
    }
    Some(bound.saturating_mul(2).min(MAX_UPPER_BOUND))
}
