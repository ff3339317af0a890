//! Warped distance between body-part confidence heatmap sequences.
//!
//! Pure math library, zero I/O. Provides validated confidence grids, frames and
//! labeled timeseries, a confidence-gated frame metric, and Dynamic Time Warping
//! with an optional Sakoe-Chiba band and warping path extraction.

mod body;
mod constraint;
mod distance;
mod dtw;
mod error;
mod frame;
mod heatmap;
mod path;
mod series;

pub use body::BodyPart;
pub use constraint::BandConstraint;
pub use distance::Distance;
pub use dtw::Dtw;
pub use error::{DtwError, HeatmapError};
pub use frame::{DEFAULT_MIN_CONFIDENCE, FrameMetric};
pub use heatmap::{CONFIDENCE_FLOOR, ConfidenceGrid, Frame, FrameShape, GridShape, Peak};
pub use path::{WarpingPath, WarpingStep};
pub use series::Timeseries;
