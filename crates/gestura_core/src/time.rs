//! Virtual time
//!
//! Recognizers never read a clock. The host stamps every input event and
//! every `advance` call with a [`Timestamp`], which makes replays and tests
//! fully deterministic.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Default animation-frame cadence in milliseconds (~60fps)
pub const FRAME_INTERVAL_MS: u64 = 16;

/// A point in virtual time, in milliseconds since an arbitrary host epoch.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn saturating_since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Timestamp {
    type Output = Timestamp;

    fn add(self, ms: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(ms))
    }
}

impl AddAssign<u64> for Timestamp {
    fn add_assign(&mut self, ms: u64) {
        self.0 = self.0.saturating_add(ms);
    }
}

impl From<u64> for Timestamp {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_since() {
        let a = Timestamp::from_millis(100);
        let b = Timestamp::from_millis(350);
        assert_eq!(b.saturating_since(a), 250);
        assert_eq!(a.saturating_since(b), 0);
    }

    #[test]
    fn test_add() {
        let mut t = Timestamp::from_millis(10) + 5;
        assert_eq!(t.as_millis(), 15);
        t += 16;
        assert_eq!(t, Timestamp::from_millis(31));
        assert_eq!(Timestamp::from_millis(u64::MAX) + 1, Timestamp::from_millis(u64::MAX));
    }
}
