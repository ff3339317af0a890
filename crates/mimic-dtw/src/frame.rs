//! Confidence-gated distance between two frames.

use std::borrow::Cow;

use tracing::{debug, trace};

use crate::body::BodyPart;
use crate::distance::Distance;
use crate::error::DtwError;
use crate::heatmap::{Frame, FrameShape, Peak};
use crate::series::Timeseries;

/// Default confidence both peaks must reach for a body part to be compared.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.2;

/// Immutable per-frame distance policy.
///
/// For every selected body part the Euclidean distance between the two grid
/// peaks is taken when both peaks reach `min_confidence`. Parts that fail the
/// gate are filled with the largest distance among the parts that passed; if
/// no part passed, the frame pair scores [`Distance::INFINITY`].
///
/// An optional series-level threshold drops, per pair of series, every part
/// whose mean peak confidence over either series falls below it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMetric {
    min_confidence: f64,
    /// Sorted, deduplicated part indices. `None` selects every part.
    parts: Option<Vec<usize>>,
    min_average_confidence: Option<f64>,
}

impl Default for FrameMetric {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            parts: None,
            min_average_confidence: None,
        }
    }
}

fn check_threshold(value: f64) -> Result<f64, DtwError> {
    if !value.is_finite() || value < 0.0 {
        return Err(DtwError::InvalidMinConfidence { value });
    }
    Ok(value)
}

impl FrameMetric {
    /// Create a metric with the given confidence threshold, comparing every body part.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidMinConfidence`] if the threshold is negative or non-finite.
    pub fn new(min_confidence: f64) -> Result<Self, DtwError> {
        Ok(Self {
            min_confidence: check_threshold(min_confidence)?,
            ..Self::default()
        })
    }

    /// Restrict comparisons to the given body part indices.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::NoBodyParts`] if `parts` is empty.
    pub fn with_parts(mut self, parts: impl IntoIterator<Item = usize>) -> Result<Self, DtwError> {
        let mut parts: Vec<usize> = parts.into_iter().collect();
        if parts.is_empty() {
            return Err(DtwError::NoBodyParts);
        }
        parts.sort_unstable();
        parts.dedup();
        self.parts = Some(parts);
        Ok(self)
    }

    /// Restrict comparisons to the given named body parts.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::NoBodyParts`] if `parts` is empty.
    pub fn with_body_parts(self, parts: &[BodyPart]) -> Result<Self, DtwError> {
        self.with_parts(parts.iter().map(|p| p.index()))
    }

    /// Drop body parts whose mean peak confidence over a whole series is below
    /// `threshold`, in either operand of a comparison.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::InvalidMinConfidence`] if the threshold is negative or non-finite.
    pub fn with_min_average_confidence(mut self, threshold: f64) -> Result<Self, DtwError> {
        self.min_average_confidence = Some(check_threshold(threshold)?);
        Ok(self)
    }

    /// Return the series-level threshold, if any.
    #[must_use]
    pub fn min_average_confidence(&self) -> Option<f64> {
        self.min_average_confidence
    }

    /// Return the confidence threshold.
    #[must_use]
    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Return the selected part indices, or `None` when every part is compared.
    #[must_use]
    pub fn parts(&self) -> Option<&[usize]> {
        self.parts.as_deref()
    }

    /// Check that two operands share a shape and that every selected part exists.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ShapeMismatch`] | `a != b` |
    /// | [`DtwError::PartOutOfRange`] | A selected part index is `>= a.parts` |
    pub fn check_shapes(&self, a: FrameShape, b: FrameShape) -> Result<(), DtwError> {
        if a != b {
            return Err(DtwError::ShapeMismatch {
                expected: a,
                got: b,
            });
        }
        if let Some(&index) = self.parts().and_then(|p| p.last())
            && index >= a.parts
        {
            return Err(DtwError::PartOutOfRange {
                index,
                parts: a.parts,
            });
        }
        Ok(())
    }

    /// Compute the distance between two frames.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ShapeMismatch`] | Frames differ in part count or grid resolution |
    /// | [`DtwError::PartOutOfRange`] | A selected part does not exist in the frames |
    pub fn distance(&self, a: &Frame, b: &Frame) -> Result<Distance, DtwError> {
        self.check_shapes(a.shape(), b.shape())?;
        Ok(Distance::new(self.peak_distance(&a.peaks(), &b.peaks())))
    }

    /// The metric to use for one pair of shape-checked series.
    ///
    /// Without a series-level threshold this is `self`. Otherwise the part
    /// selection is narrowed to the parts both series track reliably.
    ///
    /// # Errors
    ///
    /// Returns [`DtwError::LowConfidence`] if no selected part survives.
    pub(crate) fn for_series(
        &self,
        a: &Timeseries,
        b: &Timeseries,
    ) -> Result<Cow<'_, Self>, DtwError> {
        let Some(threshold) = self.min_average_confidence else {
            return Ok(Cow::Borrowed(self));
        };
        let avg_a = a.average_confidences();
        let avg_b = b.average_confidences();
        let candidates: Vec<usize> = match &self.parts {
            Some(parts) => parts.clone(),
            None => (0..avg_a.len()).collect(),
        };
        let kept: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&i| avg_a[i] >= threshold && avg_b[i] >= threshold)
            .collect();
        if kept.is_empty() {
            return Err(DtwError::LowConfidence {
                a: a.label().to_owned(),
                b: b.label().to_owned(),
                threshold,
            });
        }
        if kept.len() < candidates.len() {
            debug!(
                a = a.label(),
                b = b.label(),
                dropped = candidates.len() - kept.len(),
                "dropped unreliable body parts"
            );
        }
        Ok(Cow::Owned(Self {
            parts: Some(kept),
            ..self.clone()
        }))
    }

    /// Distance between two pre-validated peak slices of equal length.
    pub(crate) fn peak_distance(&self, a: &[Peak], b: &[Peak]) -> f64 {
        match &self.parts {
            Some(parts) => self.accumulate(parts.iter().map(|&i| (&a[i], &b[i]))),
            None => self.accumulate(a.iter().zip(b)),
        }
    }

    fn accumulate<'p>(&self, pairs: impl Iterator<Item = (&'p Peak, &'p Peak)>) -> f64 {
        let mut sum = 0.0;
        let mut widest: Option<f64> = None;
        let mut undefined = 0usize;

        for (pa, pb) in pairs {
            match self.part_distance(pa, pb) {
                Some(d) => {
                    sum += d;
                    widest = Some(widest.map_or(d, |w| w.max(d)));
                }
                None => undefined += 1,
            }
        }

        match widest {
            Some(fill) => sum + fill * undefined as f64,
            None => {
                trace!("no body part passed the confidence gate");
                f64::INFINITY
            }
        }
    }

    /// `None` when either peak falls below the confidence threshold.
    fn part_distance(&self, a: &Peak, b: &Peak) -> Option<f64> {
        (a.confidence >= self.min_confidence && b.confidence >= self.min_confidence)
            .then(|| a.distance_to(b))
    }
}
