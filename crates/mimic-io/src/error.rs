//! I/O error types for mimic-io.

use std::path::PathBuf;

use mimic_dtw::HeatmapError;

/// Errors raised by a [`HeatmapExtractor`](crate::HeatmapExtractor) for one image.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// Returned when the image cannot be read.
    #[error("cannot read image {path}")]
    ReadImage {
        /// Path to the image.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the pose model fails on an image.
    #[error("pose model failed: {reason}")]
    Model {
        /// Human-readable description from the model backend.
        reason: String,
    },

    /// Returned when the model output is not a valid frame.
    #[error("model produced invalid heatmaps")]
    Heatmap(#[from] HeatmapError),

    /// Returned when the extractor is used after shutdown.
    #[error("extractor has been shut down")]
    ShutDown,
}

/// Errors from frame extraction, the timeseries cache, and result serialization.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when an input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a directory cannot be listed.
    #[error("cannot read directory {path}")]
    ReadDir {
        /// Directory that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a frame directory contains no images.
    #[error("no frame images in {path}")]
    NoFrames {
        /// The frame directory.
        path: PathBuf,
    },

    /// Returned when an image name carries no trailing frame number.
    #[error("cannot determine frame number of {path}: expected frame_<n>.<ext>")]
    InvalidFrameName {
        /// The offending image.
        path: PathBuf,
    },

    /// Returned when the extractor fails on an image.
    #[error("feature extraction failed for {path}")]
    Extract {
        /// The image being processed.
        path: PathBuf,
        /// Underlying extractor error.
        source: ExtractError,
    },

    /// Returned when extracted or decoded heatmaps do not form a valid timeseries.
    #[error("invalid timeseries from {path}")]
    InvalidSeries {
        /// Frame directory or cache file the data came from.
        path: PathBuf,
        /// Underlying validation error.
        source: HeatmapError,
    },

    /// Returned when a label cannot be used as a cache file name.
    #[error("label \"{label}\" cannot be used as a cache file name")]
    InvalidLabel {
        /// The rejected label.
        label: String,
    },

    /// Returned when a series cannot be encoded.
    #[error("failed to encode timeseries \"{label}\"")]
    Encode {
        /// Label of the series.
        label: String,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when a cache file cannot be decoded.
    #[error("failed to decode cache file {path}")]
    Decode {
        /// Path to the cache file.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when a cache file was written by an incompatible format version.
    #[error("cache file {path} has format version {found}, expected {expected}")]
    VersionMismatch {
        /// Path to the cache file.
        path: PathBuf,
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Returned when a cache file's value count disagrees with its declared
    /// dimensions, or the dimensions are zero or overflow.
    #[error("cache file {path} declares {expected} values but holds {got}")]
    CorruptCache {
        /// Path to the cache file.
        path: PathBuf,
        /// Values implied by frames, parts, rows and columns; 0 when they are unusable.
        expected: usize,
        /// Values actually stored.
        got: usize,
    },

    /// Returned when the experiment name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("invalid experiment name \"{name}\": must match [a-zA-Z0-9_-]+")]
    InvalidExperimentName {
        /// The invalid name.
        name: String,
    },

    /// Returned when an output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a result artifact cannot be serialized.
    #[error("failed to serialize {path}")]
    SerializeJson {
        /// Destination of the artifact.
        path: PathBuf,
        /// Underlying serde_json error.
        source: serde_json::Error,
    },

    /// Returned when a file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
