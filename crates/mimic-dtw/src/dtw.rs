//! Warped distance between two heatmap timeseries.

use std::borrow::Cow;

use tracing::instrument;

use crate::constraint::BandConstraint;
use crate::distance::Distance;
use crate::error::DtwError;
use crate::frame::FrameMetric;
use crate::path::{WarpingPath, WarpingStep};
use crate::series::Timeseries;

/// Immutable DTW configuration: a band constraint plus the per-frame metric.
///
/// The cost matrix follows the classic recurrence. `cost[0][0]` is the frame
/// distance of the first pair; the whole first row and first column accumulate
/// along the matrix edge; every other cell inside the band adds its frame
/// distance to the cheapest of its upper, left and upper-left neighbours.
/// Neighbours outside the band read as [`Distance::INFINITY`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dtw {
    constraint: BandConstraint,
    metric: FrameMetric,
}

impl Dtw {
    /// Create a DTW calculator from a band constraint and the default frame metric.
    #[must_use]
    pub fn new(constraint: BandConstraint) -> Self {
        Self {
            constraint,
            metric: FrameMetric::default(),
        }
    }

    /// Create an unconstrained DTW calculator.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::new(BandConstraint::Unconstrained)
    }

    /// Create a DTW calculator with a Sakoe-Chiba warping window.
    #[must_use]
    pub fn with_sakoe_chiba(radius: usize) -> Self {
        Self::new(BandConstraint::SakoeChibaRadius(radius))
    }

    /// Replace the per-frame metric.
    #[must_use]
    pub fn with_metric(mut self, metric: FrameMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Return the band constraint configuration.
    #[must_use]
    pub fn constraint(&self) -> BandConstraint {
        self.constraint
    }

    /// Return the per-frame metric.
    #[must_use]
    pub fn metric(&self) -> &FrameMetric {
        &self.metric
    }

    /// Compute the warped distance between two timeseries.
    ///
    /// Uses a rolling two-row buffer, so memory is O(n) in the length of `b`.
    /// The result is only meaningful for ranking candidates against each other.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ShapeMismatch`] | Series differ in part count or grid resolution |
    /// | [`DtwError::PartOutOfRange`] | A selected body part does not exist |
    /// | [`DtwError::BandTooNarrow`] | `abs(a.len() - b.len())` exceeds the warping window |
    /// | [`DtwError::LowConfidence`] | Every selected part is unreliable over a whole series |
    #[instrument(level = "debug", skip_all, fields(a = a.label(), b = b.label()))]
    pub fn distance(&self, a: &Timeseries, b: &Timeseries) -> Result<Distance, DtwError> {
        let metric = self.prepare(a, b)?;
        Ok(Distance::new(self.dtw_rolling(&metric, a, b)))
    }

    /// Compute the warped distance and the optimal warping path.
    ///
    /// Allocates the full `m x n` cost matrix and a direction array for
    /// traceback. Use [`distance`][Dtw::distance] when only the score is needed.
    ///
    /// # Errors
    ///
    /// Same conditions as [`distance`][Dtw::distance].
    #[instrument(level = "debug", skip_all, fields(a = a.label(), b = b.label()))]
    pub fn distance_and_path(
        &self,
        a: &Timeseries,
        b: &Timeseries,
    ) -> Result<(Distance, WarpingPath), DtwError> {
        let metric = self.prepare(a, b)?;
        let (dist, steps) = self.dtw_full(&metric, a, b);
        Ok((Distance::new(dist), WarpingPath::new(steps)))
    }

    /// Validate the pair and resolve the metric used for it.
    fn prepare(&self, a: &Timeseries, b: &Timeseries) -> Result<Cow<'_, FrameMetric>, DtwError> {
        self.metric.check_shapes(a.shape(), b.shape())?;
        self.constraint.check_reachable(a.len(), b.len())?;
        self.metric.for_series(a, b)
    }

    /// Rolling two-row DTW, distance only.
    ///
    /// Both rows are `n` wide and reset to INF before each row, so cells the
    /// band skips read as INF for the next row.
    fn dtw_rolling(&self, metric: &FrameMetric, a: &Timeseries, b: &Timeseries) -> f64 {
        let m = a.len();
        let n = b.len();

        let mut prev = vec![f64::INFINITY; n];
        let mut curr = vec![f64::INFINITY; n];

        for i in 0..m {
            curr.fill(f64::INFINITY);
            let pa = a.frame_peaks(i);

            for j in self.constraint.filled_columns(i, n) {
                let cost = metric.peak_distance(pa, b.frame_peaks(j));
                let best = match (i, j) {
                    (0, 0) => 0.0,
                    (0, _) => curr[j - 1],
                    (_, 0) => prev[0],
                    _ => prev[j - 1].min(curr[j - 1]).min(prev[j]),
                };
                curr[j] = cost + best;
            }

            std::mem::swap(&mut prev, &mut curr);
        }

        // After the final swap, `prev` holds the last completed row.
        prev[n - 1]
    }

    /// Full cost matrix DTW, returning the distance and the warping path.
    ///
    /// Direction bits: 0 = diagonal, 1 = above, 2 = left. Cell `(i, j)` lives at
    /// flat index `i * n + j`.
    fn dtw_full(
        &self,
        metric: &FrameMetric,
        a: &Timeseries,
        b: &Timeseries,
    ) -> (f64, Vec<WarpingStep>) {
        let m = a.len();
        let n = b.len();

        let mut cost = vec![f64::INFINITY; m * n];
        let mut dirs = vec![0u8; m * n];

        for i in 0..m {
            let pa = a.frame_peaks(i);
            for j in self.constraint.filled_columns(i, n) {
                let c = metric.peak_distance(pa, b.frame_peaks(j));
                let idx = i * n + j;

                let (best, dir) = match (i, j) {
                    (0, 0) => (0.0, 0u8),
                    (0, _) => (cost[idx - 1], 2u8),
                    (_, 0) => (cost[idx - n], 1u8),
                    _ => {
                        let diag = cost[idx - n - 1];
                        let above = cost[idx - n];
                        let left = cost[idx - 1];
                        if diag <= above && diag <= left {
                            (diag, 0u8)
                        } else if above <= left {
                            (above, 1u8)
                        } else {
                            (left, 2u8)
                        }
                    }
                };

                cost[idx] = c + best;
                dirs[idx] = dir;
            }
        }

        // Traceback from (m-1, n-1) to (0, 0). The matrix edges only move one way.
        let mut path = Vec::with_capacity(m + n);
        let mut i = m - 1;
        let mut j = n - 1;

        loop {
            path.push(WarpingStep { a: i, b: j });
            if i == 0 && j == 0 {
                break;
            }
            if i == 0 {
                j -= 1;
            } else if j == 0 {
                i -= 1;
            } else {
                match dirs[i * n + j] {
                    0 => {
                        i -= 1;
                        j -= 1;
                    }
                    1 => i -= 1,
                    _ => j -= 1,
                }
            }
        }

        path.reverse();
        (cost[m * n - 1], path)
    }
}
