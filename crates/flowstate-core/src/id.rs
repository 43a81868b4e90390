//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`TrajectoryKey`] allocation.
static TRAJECTORY_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identity of one simulated entity across all of its snapshots.
///
/// Allocated from a monotonic atomic counter via [`TrajectoryKey::next`].
/// Every state snapshot derived from another (by stepping or by copying
/// with changed attributes) carries the same key, so the key names the
/// *trajectory* rather than any single value. Keys are never reused within
/// a process; equality is identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrajectoryKey(u64);

impl TrajectoryKey {
    /// Allocate a fresh, unique trajectory key.
    ///
    /// Each call returns a key that has never been returned before
    /// within this process. Thread-safe.
    pub fn next() -> Self {
        Self(TRAJECTORY_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value, for diagnostics and display layers.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrajectoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies an observer registered on a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ObserverId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<TrajectoryKey> = (0..1000).map(|_| TrajectoryKey::next()).collect();
        assert_eq!(keys.len(), 1000);
    }

    #[test]
    fn keys_are_monotonic() {
        let a = TrajectoryKey::next();
        let b = TrajectoryKey::next();
        assert!(b > a);
    }

    #[test]
    fn copied_key_is_equal() {
        let a = TrajectoryKey::next();
        let b = a;
        assert_eq!(a, b);
        assert_eq!(format!("{a}"), format!("#{}", a.raw()));
    }
}
