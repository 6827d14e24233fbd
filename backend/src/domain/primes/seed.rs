//! Seed primes for the segmented scan.

use crate::domain::ports::define_port_error;

use super::CancelFlag;

define_port_error! {
    /// Reasons a seed table could not be built.
    pub enum SeedError {
        /// The table for `limit` could not be allocated.
        Allocation { limit: usize } => "cannot allocate a seed table up to {limit}",
        /// The flag was raised while crossing out multiples.
        Cancelled => "seed sieve was cancelled",
    }
}

/// Return every prime `≤ limit`, ascending, via a plain sieve of Eratosthenes.
///
/// The result depends only on `limit`. Callers size `limit` as
/// `isqrt(upper_bound) + 1`, so the table stays small for any bound the
/// locator accepts. The table is reserved fallibly, and `cancel` is polled
/// before each crossing-out pass.
///
/// # Errors
///
/// [`SeedError::Allocation`] when the table cannot be reserved, and
/// [`SeedError::Cancelled`] once `cancel` is raised.
///
/// # Examples
/// ```
/// use sieve::domain::primes::{CancelFlag, seed_primes};
///
/// let cancel = CancelFlag::new();
/// assert_eq!(
///     seed_primes(20, &cancel),
///     Ok(vec![2, 3, 5, 7, 11, 13, 17, 19])
/// );
/// assert_eq!(seed_primes(1, &cancel), Ok(Vec::new()));
/// ```
pub fn seed_primes(limit: usize, cancel: &CancelFlag) -> Result<Vec<u64>, SeedError> {
    let len = limit.saturating_add(1);
    let mut composite = Vec::new();
    composite
        .try_reserve_exact(len)
        .map_err(|_| SeedError::allocation(limit))?;
    composite.resize(len, false);

    let root = limit.isqrt();
    for candidate in 2..=root {
        if composite.get(candidate).copied().unwrap_or(true) {
            continue;
        }
        if cancel.is_cancelled() {
            return Err(SeedError::cancelled());
        }
        for slot in composite
            .iter_mut()
            .skip(candidate.saturating_mul(candidate))
            .step_by(candidate)
        {
            *slot = true;
        }
    }

    Ok((2..=limit)
        .zip(0_u64..)
        .filter(|&(candidate, _)| !composite.get(candidate).copied().unwrap_or(true))
        .map(|(_, offset)| offset + 2)
        .collect())
}
