//! On-disk cache of extracted timeseries, one bincode file per label.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use mimic_dtw::{ConfidenceGrid, Frame, HeatmapError, Timeseries};

use crate::IoError;
use crate::domain::validate_label;

/// Current binary format version.
const FORMAT_VERSION: u32 = 1;

/// File extension of cached series.
pub const CACHE_EXTENSION: &str = "hts";

/// Versioned envelope for one serialized timeseries.
///
/// Grid values are stored flat: frame-major, then part, then row-major cells.
#[derive(Serialize, Deserialize)]
struct SeriesEnvelope {
    format_version: u32,
    label: String,
    n_frames: usize,
    parts: usize,
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl SeriesEnvelope {
    fn from_series(series: &Timeseries) -> Self {
        let shape = series.shape();
        let values = series
            .frames()
            .iter()
            .flat_map(Frame::grids)
            .flat_map(|g| g.values().iter().copied())
            .collect();
        Self {
            format_version: FORMAT_VERSION,
            label: series.label().to_owned(),
            n_frames: series.len(),
            parts: shape.parts,
            rows: shape.grid.rows,
            cols: shape.grid.cols,
            values,
        }
    }

    /// Cells per grid and values in total, or `None` if a dimension is zero
    /// or the product overflows.
    fn checked_len(&self) -> Option<(usize, usize)> {
        let cells = self.rows.checked_mul(self.cols)?;
        let total = cells
            .checked_mul(self.parts)?
            .checked_mul(self.n_frames)?;
        (total > 0).then_some((cells, total))
    }

    /// Rebuild through the validating constructors. `cells` must come from
    /// [`checked_len`][Self::checked_len].
    fn into_series(self, cells: usize) -> Result<Timeseries, HeatmapError> {
        let frames = self
            .values
            .chunks(cells * self.parts)
            .map(|frame| {
                let grids = frame
                    .chunks(cells)
                    .map(|g| ConfidenceGrid::new(self.rows, self.cols, g.to_vec()))
                    .collect::<Result<Vec<_>, _>>()?;
                Frame::new(grids)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Timeseries::new(self.label, frames)
    }
}

/// A directory of cached timeseries, stored as `<label>.hts`.
#[derive(Debug, Clone)]
pub struct TimeseriesCache {
    dir: PathBuf,
}

impl TimeseriesCache {
    /// Open an existing cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ReadDir`] if `dir` is not a readable directory.
    pub fn open(dir: &Path) -> Result<Self, IoError> {
        fs::read_dir(dir).map_err(|e| IoError::ReadDir {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Open a cache directory, creating it if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    pub fn create(dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(dir).map_err(|e| IoError::OutputDirCreate {
            path: dir.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    /// Return the cache directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Return the file a label is cached in.
    #[must_use]
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{label}.{CACHE_EXTENSION}"))
    }

    /// Return true if a cache file exists for `label`.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        validate_label(label).is_ok() && self.path_for(label).is_file()
    }

    /// Write `series` to `<label>.hts`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidLabel`] | Label is not a plain file name |
    /// | [`IoError::Encode`] | bincode encoding failed |
    /// | [`IoError::WriteFile`] | File write failed |
    #[instrument(skip(self, series), fields(label = series.label()))]
    pub fn store(&self, series: &Timeseries) -> Result<PathBuf, IoError> {
        validate_label(series.label())?;
        let path = self.path_for(series.label());

        let envelope = SeriesEnvelope::from_series(series);
        let bytes = bincode::serialize(&envelope).map_err(|e| IoError::Encode {
            label: series.label().to_owned(),
            source: e,
        })?;

        fs::write(&path, &bytes).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;

        debug!(
            size_bytes = bytes.len(),
            n_frames = series.len(),
            "timeseries cached"
        );
        Ok(path)
    }

    /// Read the series cached under `label`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidLabel`] | Label is not a plain file name |
    /// | [`IoError::FileNotFound`] | No cache file for `label` |
    /// | [`IoError::Decode`] | bincode decoding failed |
    /// | [`IoError::VersionMismatch`] | Format version mismatch |
    /// | [`IoError::CorruptCache`] | Value count disagrees with the dimensions |
    /// | [`IoError::InvalidSeries`] | Decoded grids fail validation |
    pub fn load(&self, label: &str) -> Result<Timeseries, IoError> {
        validate_label(label)?;
        let series = read_series(&self.path_for(label))?;
        // The file stem is authoritative, so renamed files load under their new name.
        Ok(if series.label() == label {
            series
        } else {
            series.relabeled(label)
        })
    }

    /// Return every cached label in lexicographic order.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::ReadDir`] if the directory cannot be listed.
    pub fn labels(&self) -> Result<Vec<String>, IoError> {
        let read_dir_err = |source: std::io::Error| IoError::ReadDir {
            path: self.dir.clone(),
            source,
        };

        let mut labels = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(read_dir_err)? {
            let path = entry.map_err(read_dir_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) if validate_label(stem).is_ok() => labels.push(stem.to_owned()),
                _ => warn!(path = %path.display(), "ignoring cache file with unusable name"),
            }
        }
        labels.sort();
        Ok(labels)
    }

    /// Load every cached series, ordered by label.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be listed or loaded; see [`load`][Self::load].
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    pub fn load_all(&self) -> Result<Vec<Timeseries>, IoError> {
        let series = self
            .labels()?
            .iter()
            .map(|label| self.load(label))
            .collect::<Result<Vec<_>, _>>()?;
        info!(n_series = series.len(), "loaded cached timeseries");
        Ok(series)
    }
}

fn read_series(path: &Path) -> Result<Timeseries, IoError> {
    let bytes = fs::read(path).map_err(|e| IoError::FileNotFound {
        path: path.to_path_buf(),
        source: e,
    })?;

    let envelope: SeriesEnvelope = bincode::deserialize(&bytes).map_err(|e| IoError::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;

    if envelope.format_version != FORMAT_VERSION {
        return Err(IoError::VersionMismatch {
            path: path.to_path_buf(),
            expected: FORMAT_VERSION,
            found: envelope.format_version,
        });
    }

    // Dimensions come from disk: zero or overflowing sizes are corrupt, not a panic.
    let (cells, expected) = match envelope.checked_len() {
        Some(lens) => lens,
        None => {
            return Err(IoError::CorruptCache {
                path: path.to_path_buf(),
                expected: 0,
                got: envelope.values.len(),
            });
        }
    };
    if expected != envelope.values.len() {
        return Err(IoError::CorruptCache {
            path: path.to_path_buf(),
            expected,
            got: envelope.values.len(),
        });
    }

    envelope
        .into_series(cells)
        .map_err(|source| IoError::InvalidSeries {
            path: path.to_path_buf(),
            source,
        })
}
