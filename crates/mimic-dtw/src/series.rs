//! Labeled heatmap timeseries with precomputed per-frame peaks.

use std::ops::Index;

use crate::error::HeatmapError;
use crate::heatmap::{Frame, FrameShape, Peak};

/// Owned, validated sequence of frames for one recorded movement.
///
/// Guaranteed non-empty, with every frame sharing the same body part count and
/// grid resolution. Peaks are computed once at construction; a series is
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeseries {
    label: String,
    frames: Vec<Frame>,
    shape: FrameShape,
    /// Peaks of all frames, `shape.parts` per frame.
    peaks: Vec<Peak>,
}

impl Timeseries {
    /// Assemble a labeled series from frames in temporal order.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`HeatmapError::EmptySeries`] | `frames` is empty |
    /// | [`HeatmapError::SeriesFrameMismatch`] | A frame's shape differs from frame 0 |
    pub fn new(label: impl Into<String>, frames: Vec<Frame>) -> Result<Self, HeatmapError> {
        let label = label.into();
        let Some(first) = frames.first() else {
            return Err(HeatmapError::EmptySeries { label });
        };
        let shape = first.shape();
        if let Some((index, frame)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.shape() != shape)
        {
            return Err(HeatmapError::SeriesFrameMismatch {
                label,
                index,
                expected: shape,
                got: frame.shape(),
            });
        }
        let peaks = frames.iter().flat_map(Frame::peaks).collect();
        Ok(Self {
            label,
            frames,
            shape,
            peaks,
        })
    }

    /// Return the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Return the shape shared by every frame.
    #[must_use]
    pub fn shape(&self) -> FrameShape {
        self.shape
    }

    /// Return the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false` for series built through [`Timeseries::new`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Return the frames in temporal order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Return the per-part peaks of frame `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn frame_peaks(&self, index: usize) -> &[Peak] {
        let k = self.shape.parts;
        &self.peaks[index * k..(index + 1) * k]
    }

    /// Mean peak confidence of each body part over all frames.
    #[must_use]
    pub fn average_confidences(&self) -> Vec<f64> {
        let k = self.shape.parts;
        let mut sums = vec![0.0; k];
        for (i, peak) in self.peaks.iter().enumerate() {
            sums[i % k] += peak.confidence;
        }
        let n = self.frames.len() as f64;
        sums.into_iter().map(|s| s / n).collect()
    }

    /// Return a horizontally mirrored copy under a new label.
    ///
    /// Every grid of every frame is flipped; frame order is unchanged.
    #[must_use]
    pub fn mirrored(&self, label: impl Into<String>) -> Self {
        let frames: Vec<Frame> = self.frames.iter().map(Frame::mirrored).collect();
        let peaks = frames.iter().flat_map(Frame::peaks).collect();
        Self {
            label: label.into(),
            frames,
            shape: self.shape,
            peaks,
        }
    }

    /// Return a copy of this series under a different label.
    #[must_use]
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }
}

impl Index<usize> for Timeseries {
    type Output = Frame;

    fn index(&self, index: usize) -> &Self::Output {
        &self.frames[index]
    }
}
