//! Warping window around the diagonal of the DTW cost matrix.

use std::ops::Range;

use crate::error::DtwError;

/// How far an alignment may stray from the diagonal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandConstraint {
    /// Every frame of one series may align with every frame of the other.
    #[default]
    Unconstrained,

    /// Sakoe-Chiba band: interior cell `(i, j)` is filled only if `|i - j| <= radius`.
    /// The band is symmetric and inclusive, so radius 0 is the lock-step diagonal.
    SakoeChibaRadius(usize),
}

impl BandConstraint {
    /// Columns of the band for `row`, clipped to `0..n_cols`.
    fn band(&self, row: usize, n_cols: usize) -> Range<usize> {
        match *self {
            Self::Unconstrained => 0..n_cols,
            Self::SakoeChibaRadius(r) => {
                let lo = row.saturating_sub(r);
                let hi = row.saturating_add(r).saturating_add(1).min(n_cols);
                lo..hi
            }
        }
    }

    /// Columns the cost matrix fills in `row`.
    ///
    /// Row 0 is filled in full and column 0 is filled in every row, so the
    /// edges of the matrix accumulate along a single series regardless of the
    /// radius. Interior cells follow the band.
    pub fn filled_columns(&self, row: usize, n_cols: usize) -> impl Iterator<Item = usize> {
        let (edge, interior) = if row == 0 {
            (None, 0..n_cols)
        } else {
            let band = self.band(row, n_cols);
            (Some(0), band.start.max(1)..band.end)
        };
        edge.into_iter().chain(interior)
    }

    /// Check that the far corner `(m-1, n-1)` lies inside the band.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::BandTooNarrow`] when `|m - n|` exceeds the radius.
    pub fn check_reachable(&self, m: usize, n: usize) -> Result<(), DtwError> {
        match *self {
            Self::SakoeChibaRadius(window) if m.abs_diff(n) > window => {
                Err(DtwError::BandTooNarrow {
                    len_a: m,
                    len_b: n,
                    window,
                })
            }
            _ => Ok(()),
        }
    }

    /// Return the radius, or `None` when unconstrained.
    #[must_use]
    pub fn radius(&self) -> Option<usize> {
        match self {
            Self::Unconstrained => None,
            Self::SakoeChibaRadius(r) => Some(*r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(c: BandConstraint, row: usize, n: usize) -> Vec<usize> {
        c.filled_columns(row, n).collect()
    }

    #[test]
    fn unconstrained_fills_every_column() {
        for row in [0, 3, 9] {
            assert_eq!(cols(BandConstraint::Unconstrained, row, 6), [0, 1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn first_row_ignores_the_band() {
        assert_eq!(cols(BandConstraint::SakoeChibaRadius(0), 0, 4), [0, 1, 2, 3]);
    }

    #[test]
    fn interior_rows_keep_column_zero() {
        let c = BandConstraint::SakoeChibaRadius(1);
        assert_eq!(cols(c, 1, 6), [0, 1, 2]);
        assert_eq!(cols(c, 4, 6), [0, 3, 4, 5]);
        assert_eq!(cols(c, 5, 6), [0, 4, 5]);
    }

    #[test]
    fn radius_zero_is_the_diagonal_plus_edge() {
        let c = BandConstraint::SakoeChibaRadius(0);
        assert_eq!(cols(c, 3, 8), [0, 3]);
        // Rows past the last column keep only the edge.
        assert_eq!(cols(c, 9, 4), [0]);
    }

    #[test]
    fn band_end_is_inclusive() {
        // |i - j| <= r on both sides: row 3 with radius 2 reaches column 5.
        assert_eq!(cols(BandConstraint::SakoeChibaRadius(2), 3, 8), [0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn oversized_radius_saturates() {
        assert_eq!(cols(BandConstraint::SakoeChibaRadius(usize::MAX), 2, 3), [0, 1, 2]);
    }

    #[test]
    fn reachability_depends_on_length_difference() {
        assert!(matches!(
            BandConstraint::SakoeChibaRadius(1).check_reachable(2, 6),
            Err(DtwError::BandTooNarrow { len_a: 2, len_b: 6, window: 1 })
        ));
        assert!(BandConstraint::SakoeChibaRadius(4).check_reachable(6, 2).is_ok());
        assert!(BandConstraint::SakoeChibaRadius(0).check_reachable(7, 7).is_ok());
        assert!(BandConstraint::Unconstrained.check_reachable(1, 900).is_ok());
    }

    #[test]
    fn radius_accessor() {
        assert_eq!(BandConstraint::default().radius(), None);
        assert_eq!(BandConstraint::SakoeChibaRadius(100).radius(), Some(100));
    }
}
