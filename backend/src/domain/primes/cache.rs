//! Process-wide memo of the leading primes.
//!
//! The cache holds the first `len` primes, contiguous from index 0. It only
//! ever grows, up to a fixed capacity. Readers share a read lock; appends take
//! the write lock for the whole extension, so no reader sees half of one.

use std::sync::{PoisonError, RwLock};

use super::ResumePoint;

/// Answer from [`PrimeCache::lookup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// The requested index is cached.
    Hit(u64),
    /// Not cached; a scan may continue from the last cached prime.
    Resume(ResumePoint),
}

/// Shared, append-only, ascending list of the first primes.
///
/// # Examples
/// ```
/// use sieve::domain::primes::{CacheLookup, PrimeCache, ResumePoint};
///
/// let cache = PrimeCache::new(8);
/// cache.extend_from(1, &[3, 5, 7]);
/// assert_eq!(cache.lookup(2), CacheLookup::Hit(5));
/// assert_eq!(
///     cache.lookup(10),
///     CacheLookup::Resume(ResumePoint { index: 3, prime: 7 })
/// );
/// ```
#[derive(Debug)]
pub struct PrimeCache {
    capacity: usize,
    primes: RwLock<Vec<u64>>,
}

impl PrimeCache {
    /// Create a cache holding at most `capacity` primes, seeded with 2.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut primes = Vec::with_capacity(capacity.min(1 << 16));
        primes.push(2);
        Self {
            capacity,
            primes: RwLock::new(primes),
        }
    }

    /// Maximum number of primes retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of primes currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read(<[u64]>::len)
    }

    /// Always false: the cache is seeded with 2.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read(<[u64]>::is_empty)
    }

    /// How many more primes the cache will accept.
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Return the prime at `index`, or where to resume scanning for it.
    #[must_use]
    pub fn lookup(&self, index: u64) -> CacheLookup {
        self.read(|primes| {
            let cached = usize::try_from(index)
                .ok()
                .and_then(|position| primes.get(position).copied());
            match (cached, primes.last()) {
                (Some(prime), _) => CacheLookup::Hit(prime),
                (None, Some(&last)) => CacheLookup::Resume(ResumePoint {
                    index: u64::try_from(primes.len().saturating_sub(1)).unwrap_or(u64::MAX),
                    prime: last,
                }),
                (None, None) => CacheLookup::Resume(ResumePoint::ORIGIN),
            }
        })
    }

    /// Append `primes`, whose first element sits at `first_index`.
    ///
    /// Entries already cached (another writer got there first) are skipped,
    /// a batch that would leave a gap is ignored, and anything beyond
    /// capacity is dropped. Returns how many primes were appended.
    pub fn extend_from(&self, first_index: u64, primes: &[u64]) -> usize {
        let Ok(first_index) = usize::try_from(first_index) else {
            return 0;
        };
        let mut cached = self.primes.write().unwrap_or_else(PoisonError::into_inner);
        let len = cached.len();
        if first_index > len {
            return 0;
        }
        let fresh = primes
            .iter()
            .skip(len - first_index)
            .take(self.capacity.saturating_sub(len));
        cached.extend(fresh);
        cached.len() - len
    }

    fn read<T>(&self, f: impl FnOnce(&[u64]) -> T) -> T {
        let primes = self.primes.read().unwrap_or_else(PoisonError::into_inner);
        f(primes.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn cache() -> PrimeCache {
        PrimeCache::new(6)
    }

    #[rstest]
    fn starts_with_two(cache: PrimeCache) {
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
        assert_eq!(cache.lookup(0), CacheLookup::Hit(2));
        assert_eq!(cache.lookup(1), CacheLookup::Resume(ResumePoint::ORIGIN));
    }

    #[rstest]
    fn truncates_at_capacity(cache: PrimeCache) {
        let appended = cache.extend_from(1, &[3, 5, 7, 11, 13, 17, 19]);
        assert_eq!(appended, 5);
        assert_eq!(cache.len(), 6);
        assert_eq!(cache.remaining_capacity(), 0);
        assert_eq!(cache.lookup(5), CacheLookup::Hit(13));
        assert_eq!(
            cache.lookup(6),
            CacheLookup::Resume(ResumePoint { index: 5, prime: 13 })
        );
    }

    #[rstest]
    fn skips_entries_already_present(cache: PrimeCache) {
        cache.extend_from(1, &[3, 5]);
        let appended = cache.extend_from(1, &[3, 5, 7]);
        assert_eq!(appended, 1);
        assert_eq!(cache.lookup(3), CacheLookup::Hit(7));
    }

    #[rstest]
    fn ignores_batches_that_leave_gaps(cache: PrimeCache) {
        assert_eq!(cache.extend_from(3, &[7, 11]), 0);
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn zero_capacity_still_answers_index_zero() {
        let cache = PrimeCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.lookup(0), CacheLookup::Hit(2));
        assert_eq!(cache.extend_from(1, &[3]), 0);
    }

    #[rstest]
    fn concurrent_writers_keep_prefix_contiguous() {
        let cache = Arc::new(PrimeCache::new(1_000));
        let batch: Vec<u64> = vec![3, 5, 7, 11, 13, 17, 19, 23, 29, 31];
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let cache = Arc::clone(&cache);
                let batch = batch.clone();
                std::thread::spawn(move || {
                    let split = worker % batch.len();
                    cache.extend_from(1, &batch[..split]);
                    cache.extend_from(1, &batch);
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("writer thread");
        }

        assert_eq!(cache.len(), 11);
        for (index, prime) in std::iter::once(2).chain(batch).enumerate() {
            assert_eq!(cache.lookup(index as u64), CacheLookup::Hit(prime));
        }
    }
}
