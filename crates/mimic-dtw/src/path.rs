//! Optimal frame alignment between two timeseries.

/// One aligned frame pair: frame `a` of the first series with frame `b` of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarpingStep {
    /// Frame index in the first series.
    pub a: usize,
    /// Frame index in the second series.
    pub b: usize,
}

/// Monotone, continuous sequence of aligned frame pairs from `(0, 0)` to `(m-1, n-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpingPath(Vec<WarpingStep>);

impl WarpingPath {
    pub(crate) fn new(steps: Vec<WarpingStep>) -> Self {
        Self(steps)
    }

    /// Return the steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpingStep] {
        &self.0
    }

    /// Return the number of aligned pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if the path contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest `|a - b|` over the path: how far the alignment strays from the diagonal.
    #[must_use]
    pub fn max_deviation(&self) -> usize {
        self.0.iter().map(|s| s.a.abs_diff(s.b)).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a WarpingPath {
    type Item = &'a WarpingStep;
    type IntoIter = std::slice::Iter<'a, WarpingStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
