//! Confidence grids, their peaks, and frames of per-body-part grids.

use std::fmt;
use std::ops::Index;

use crate::error::HeatmapError;

/// Confidence values below this floor are raised to it when a peak is taken.
pub const CONFIDENCE_FLOOR: f64 = 1e-3;

/// Spatial resolution of a confidence grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridShape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Body part count and grid resolution shared by every frame of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameShape {
    /// Number of body part grids per frame.
    pub parts: usize,
    /// Resolution of every grid.
    pub grid: GridShape,
}

impl fmt::Display for FrameShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} parts of {}", self.parts, self.grid)
    }
}

/// Location and confidence of the strongest cell of a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Row of the maximum cell.
    pub row: usize,
    /// Column of the maximum cell.
    pub col: usize,
    /// Maximum value, floored to [`CONFIDENCE_FLOOR`].
    pub confidence: f64,
}

impl Peak {
    /// Euclidean distance between two peak locations, in grid cells.
    #[must_use]
    pub fn distance_to(&self, other: &Peak) -> f64 {
        let dr = self.row as f64 - other.row as f64;
        let dc = self.col as f64 - other.col as f64;
        (dr * dr + dc * dc).sqrt()
    }
}

/// Row-major 2-D field of location likelihoods for one body part in one frame.
///
/// Values need not sum to one; larger means more confident.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceGrid {
    shape: GridShape,
    values: Vec<f64>,
}

impl ConfidenceGrid {
    /// Create a grid from row-major values.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`HeatmapError::EmptyGrid`] | `rows` or `cols` is zero |
    /// | [`HeatmapError::GridSizeMismatch`] | `values.len() != rows * cols` |
    /// | [`HeatmapError::NonFiniteValue`] | Any value is NaN or infinite |
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, HeatmapError> {
        if rows == 0 || cols == 0 {
            return Err(HeatmapError::EmptyGrid { rows, cols });
        }
        let shape = GridShape { rows, cols };
        if values.len() != rows * cols {
            return Err(HeatmapError::GridSizeMismatch {
                shape,
                expected: rows * cols,
                got: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(HeatmapError::NonFiniteValue { index });
        }
        Ok(Self { shape, values })
    }

    /// Create an all-zero grid.
    ///
    /// # Errors
    ///
    /// Returns [`HeatmapError::EmptyGrid`] if `rows` or `cols` is zero.
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, HeatmapError> {
        Self::new(rows, cols, vec![0.0; rows * cols])
    }

    /// Return the grid resolution.
    #[must_use]
    pub fn shape(&self) -> GridShape {
        self.shape
    }

    /// Return the row-major values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Return the value at `(row, col)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.shape.rows && col < self.shape.cols {
            Some(self.values[row * self.shape.cols + col])
        } else {
            None
        }
    }

    /// Locate the maximum cell. Ties resolve to the first cell in row-major order.
    #[must_use]
    pub fn peak(&self) -> Peak {
        let (index, max) = self
            .values
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, v)| {
                if v > bv { (i, v) } else { (bi, bv) }
            });
        Peak {
            row: index / self.shape.cols,
            col: index % self.shape.cols,
            confidence: max.max(CONFIDENCE_FLOOR),
        }
    }

    /// Return a copy flipped horizontally (each row reversed).
    #[must_use]
    pub fn mirrored(&self) -> Self {
        let values = self
            .values
            .chunks_exact(self.shape.cols)
            .flat_map(|row| row.iter().rev().copied())
            .collect();
        Self {
            shape: self.shape,
            values,
        }
    }
}

/// The confidence grids of every tracked body part at one instant.
///
/// Index `i` denotes the same body part in every frame that is compared.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame(Vec<ConfidenceGrid>);

impl Frame {
    /// Create a frame from one grid per body part.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`HeatmapError::EmptyFrame`] | `grids` is empty |
    /// | [`HeatmapError::FrameGridMismatch`] | A grid's shape differs from grid 0 |
    pub fn new(grids: Vec<ConfidenceGrid>) -> Result<Self, HeatmapError> {
        let Some(first) = grids.first() else {
            return Err(HeatmapError::EmptyFrame);
        };
        let expected = first.shape();
        if let Some((part, grid)) = grids
            .iter()
            .enumerate()
            .find(|(_, g)| g.shape() != expected)
        {
            return Err(HeatmapError::FrameGridMismatch {
                part,
                expected,
                got: grid.shape(),
            });
        }
        Ok(Self(grids))
    }

    /// Return the body part count and grid resolution.
    #[must_use]
    pub fn shape(&self) -> FrameShape {
        FrameShape {
            parts: self.0.len(),
            grid: self.0[0].shape(),
        }
    }

    /// Return the number of body part grids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false` for frames built through [`Frame::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the grids as a slice.
    #[must_use]
    pub fn grids(&self) -> &[ConfidenceGrid] {
        &self.0
    }

    /// Return the peak of every body part grid, in part order.
    #[must_use]
    pub fn peaks(&self) -> Vec<Peak> {
        self.0.iter().map(ConfidenceGrid::peak).collect()
    }

    /// Return a copy with every grid flipped horizontally.
    #[must_use]
    pub fn mirrored(&self) -> Self {
        Self(self.0.iter().map(ConfidenceGrid::mirrored).collect())
    }
}

impl Index<usize> for Frame {
    type Output = ConfidenceGrid;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
