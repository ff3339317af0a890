//! File I/O for the mimic pipeline: frame extraction, the timeseries cache,
//! and JSON result artifacts.

mod cache;
mod domain;
mod error;
mod extractor;
mod writer;

pub use cache::{CACHE_EXTENSION, TimeseriesCache};
pub use domain::ExperimentName;
pub use error::{ExtractError, IoError};
pub use extractor::{HeatmapExtractor, SequenceBuilder, frame_images};
pub use writer::{ResultWriter, RunParameters, score_value};
