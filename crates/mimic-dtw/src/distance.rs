//! Distance newtype shared by frame and warped distances.

use std::cmp::Ordering;
use std::fmt;

/// A non-negative dissimilarity. Lower means more similar; there is no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    /// Zero distance, produced by identical inputs.
    pub const ZERO: Self = Self(0.0);

    /// The distance sentinel: maximally dissimilar, used when no reliable comparison exists.
    pub const INFINITY: Self = Self(f64::INFINITY);

    /// Create a new distance from a raw value.
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Return the raw distance value.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Return true if this is the distance sentinel.
    #[must_use]
    pub fn is_sentinel(self) -> bool {
        self.0.is_infinite()
    }

    /// Total ordering comparison using [`f64::total_cmp`].
    #[must_use]
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_sentinel() {
            f.write_str("inf")
        } else {
            write!(f, "{:.6}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_prints_as_inf() {
        assert_eq!(Distance::new(2.5).to_string(), "2.500000");
        assert_eq!(Distance::INFINITY.to_string(), "inf");
    }

    #[test]
    fn sentinel_sorts_last() {
        let mut scores = vec![Distance::INFINITY, Distance::new(3.0), Distance::ZERO];
        scores.sort_by(Distance::total_cmp);
        assert_eq!(scores, [Distance::ZERO, Distance::new(3.0), Distance::INFINITY]);
        assert_eq!(Distance::new(1.0).total_cmp(&Distance::new(1.0)), Ordering::Equal);
    }

    #[test]
    fn sentinel_detection() {
        assert!(Distance::INFINITY.is_sentinel());
        assert!(!Distance::ZERO.is_sentinel());
        assert!(!Distance::new(1e300).is_sentinel());
    }
}
