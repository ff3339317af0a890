//! Per-image heatmap extraction and assembly of frame directories into timeseries.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use mimic_dtw::{Frame, Timeseries};

use crate::IoError;
use crate::cache::TimeseriesCache;
use crate::domain::validate_label;
use crate::error::ExtractError;

/// Image extensions recognized as frames, compared case-insensitively.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A pose model that turns one image into a frame of body-part confidence grids.
///
/// Implementations are explicit, long-lived handles: model state is loaded by
/// the constructor and released by [`shutdown`][HeatmapExtractor::shutdown] or
/// `Drop`. Every frame an extractor returns has the same part count and grid
/// resolution.
pub trait HeatmapExtractor {
    /// Extract the heatmaps for one image.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractError`] when the image cannot be read or the model fails.
    fn extract(&mut self, image: &Path) -> Result<Frame, ExtractError>;

    /// Release model resources. Later calls to `extract` should fail with
    /// [`ExtractError::ShutDown`].
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractError`] if the backend fails to tear down.
    fn shutdown(&mut self) -> Result<(), ExtractError> {
        Ok(())
    }
}

/// Builds labeled timeseries from directories of `frame_<n>.<ext>` images.
///
/// The series label is the directory name; frames are ordered by `n`.
#[derive(Debug)]
pub struct SequenceBuilder<E> {
    extractor: E,
}

impl<E: HeatmapExtractor> SequenceBuilder<E> {
    /// Wrap an extractor.
    pub fn new(extractor: E) -> Self {
        Self { extractor }
    }

    /// Return the wrapped extractor.
    pub fn extractor_mut(&mut self) -> &mut E {
        &mut self.extractor
    }

    /// Extract every frame image in `dir` and assemble them into a timeseries.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::InvalidLabel`] | Directory name is not a usable label |
    /// | [`IoError::ReadDir`] | `dir` cannot be listed |
    /// | [`IoError::NoFrames`] | `dir` holds no images |
    /// | [`IoError::InvalidFrameName`] | An image has no trailing frame number |
    /// | [`IoError::Extract`] | The extractor fails on an image |
    /// | [`IoError::InvalidSeries`] | Extracted frames disagree in shape |
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn build(&mut self, dir: &Path) -> Result<Timeseries, IoError> {
        let label = dir_label(dir)?;

        let images = frame_images(dir)?;
        info!(%label, n_frames = images.len(), "extracting frames");

        let mut frames = Vec::with_capacity(images.len());
        for image in &images {
            let frame = self
                .extractor
                .extract(image)
                .map_err(|source| IoError::Extract {
                    path: image.clone(),
                    source,
                })?;
            frames.push(frame);
        }

        Timeseries::new(label, frames).map_err(|source| IoError::InvalidSeries {
            path: dir.to_path_buf(),
            source,
        })
    }

    /// Build every recording in `dirs`, reusing the cache where possible.
    ///
    /// Recordings already cached under their directory name are loaded without
    /// touching the extractor; the rest are extracted and stored. Series are
    /// returned in the order of `dirs`.
    ///
    /// # Errors
    ///
    /// Any error of [`build`][Self::build], [`TimeseriesCache::load`] or
    /// [`TimeseriesCache::store`], for the first recording that fails.
    #[instrument(skip_all, fields(n_dirs = dirs.len(), cache = %cache.dir().display()))]
    pub fn build_missing(
        &mut self,
        dirs: &[&Path],
        cache: &TimeseriesCache,
    ) -> Result<Vec<Timeseries>, IoError> {
        let mut series = Vec::with_capacity(dirs.len());
        let mut n_cached = 0usize;
        for dir in dirs {
            let label = dir_label(dir)?;
            if cache.contains(&label) {
                debug!(%label, "already cached, skipping extraction");
                series.push(cache.load(&label)?);
                n_cached += 1;
            } else {
                let built = self.build(dir)?;
                cache.store(&built)?;
                series.push(built);
            }
        }
        info!(
            n_cached,
            n_extracted = series.len() - n_cached,
            "recordings ready"
        );
        Ok(series)
    }

    /// Shut the extractor down and return it.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Extract`] if the extractor fails to tear down.
    pub fn shutdown(mut self) -> Result<E, IoError> {
        self.extractor
            .shutdown()
            .map_err(|source| IoError::Extract {
                path: PathBuf::new(),
                source,
            })?;
        Ok(self.extractor)
    }
}

/// List the frame images of `dir`, ordered by frame number.
///
/// Non-image files are ignored. `frame_10.png` sorts after `frame_9.png`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::ReadDir`] | `dir` cannot be listed |
/// | [`IoError::NoFrames`] | `dir` holds no images |
/// | [`IoError::InvalidFrameName`] | An image has no trailing frame number |
pub fn frame_images(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let read_dir_err = |source: std::io::Error| IoError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut numbered = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if !path.is_file() || !is_image(&path) {
            continue;
        }
        let Some(n) = frame_number(&path) else {
            return Err(IoError::InvalidFrameName { path });
        };
        numbered.push((n, path));
    }

    if numbered.is_empty() {
        return Err(IoError::NoFrames {
            path: dir.to_path_buf(),
        });
    }

    numbered.sort();
    debug!(n_images = numbered.len(), "listed frame images");
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

/// The directory name, which is the series label.
fn dir_label(dir: &Path) -> Result<String, IoError> {
    let label = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_owned();
    validate_label(&label)?;
    Ok(label)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// The number after the last underscore of the file stem.
fn frame_number(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let (_, n) = stem.rsplit_once('_')?;
    n.parse().ok()
}
