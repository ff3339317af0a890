//! Error types for heatmap construction and distance computation.

use crate::heatmap::{FrameShape, GridShape};

/// Errors from building confidence grids, frames and timeseries.
#[derive(Debug, thiserror::Error)]
pub enum HeatmapError {
    /// Returned when a grid has zero rows or zero columns.
    #[error("confidence grid must be non-empty, got {rows}x{cols}")]
    EmptyGrid {
        /// Requested row count.
        rows: usize,
        /// Requested column count.
        cols: usize,
    },

    /// Returned when the value buffer does not hold exactly `rows * cols` cells.
    #[error("confidence grid {shape} needs {expected} values, got {got}")]
    GridSizeMismatch {
        /// Requested grid shape.
        shape: GridShape,
        /// `rows * cols`.
        expected: usize,
        /// Length of the value buffer.
        got: usize,
    },

    /// Returned when a grid cell holds NaN or an infinity.
    #[error("confidence grid contains non-finite value at cell {index}")]
    NonFiniteValue {
        /// Row-major index of the first offending cell.
        index: usize,
    },

    /// Returned when a frame is built from zero grids.
    #[error("frame must contain at least one body part grid")]
    EmptyFrame,

    /// Returned when the grids of one frame do not share a resolution.
    #[error("grid for body part {part} is {got}, expected {expected}")]
    FrameGridMismatch {
        /// Body part index of the offending grid.
        part: usize,
        /// Shape of body part 0.
        expected: GridShape,
        /// Shape of the offending grid.
        got: GridShape,
    },

    /// Returned when a timeseries is built from zero frames.
    #[error("timeseries \"{label}\" must contain at least one frame")]
    EmptySeries {
        /// Label of the rejected series.
        label: String,
    },

    /// Returned when a frame of a timeseries differs in shape from frame 0.
    #[error("frame {index} of timeseries \"{label}\" is {got}, expected {expected}")]
    SeriesFrameMismatch {
        /// Label of the rejected series.
        label: String,
        /// Position of the offending frame.
        index: usize,
        /// Shape of frame 0.
        expected: FrameShape,
        /// Shape of the offending frame.
        got: FrameShape,
    },

    /// Returned when a body part name is not recognized.
    #[error("unknown body part \"{name}\"")]
    UnknownBodyPart {
        /// The name that failed to parse.
        name: String,
    },
}

/// Errors from frame distance and warped distance computation.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when two frames or series differ in body part count or grid resolution.
    #[error("shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch {
        /// Shape of the left-hand operand.
        expected: FrameShape,
        /// Shape of the right-hand operand.
        got: FrameShape,
    },

    /// Returned when the warping window cannot connect `(0, 0)` to `(m-1, n-1)`.
    #[error("warping window {window} is narrower than the length difference of {len_a} and {len_b} frames")]
    BandTooNarrow {
        /// Frame count of the first series.
        len_a: usize,
        /// Frame count of the second series.
        len_b: usize,
        /// Configured Sakoe-Chiba radius.
        window: usize,
    },

    /// Returned when a body part selection is empty.
    #[error("body part selection must not be empty")]
    NoBodyParts,

    /// Returned when a selected body part does not exist in the compared frames.
    #[error("body part {index} is out of range for frames with {parts} parts")]
    PartOutOfRange {
        /// The selected body part index.
        index: usize,
        /// Number of body parts per frame.
        parts: usize,
    },

    /// Returned when every selected body part falls below the average-confidence
    /// threshold in at least one of the two series.
    #[error("no body part of \"{a}\" and \"{b}\" reaches average confidence {threshold}")]
    LowConfidence {
        /// Label of the first series.
        a: String,
        /// Label of the second series.
        b: String,
        /// Configured series-level threshold.
        threshold: f64,
    },

    /// Returned when the confidence threshold is negative or non-finite.
    #[error("minimum confidence must be finite and non-negative, got {value}")]
    InvalidMinConfidence {
        /// The rejected threshold.
        value: f64,
    },
}
