//! Labeled reference set, keyed and iterated in lexicographic label order.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use mimic_dtw::Timeseries;

use crate::error::MatchError;
use crate::label::opposite_side_label;

/// Labeled reference timeseries for nearest-neighbour comparison.
///
/// Labels are unique. Iteration order is lexicographic by label, which is the
/// order the matcher breaks ties in.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: BTreeMap<String, Timeseries>,
}

impl Corpus {
    /// Create an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from series, keyed by their labels.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::DuplicateLabel`] if two series share a label.
    pub fn from_series(series: impl IntoIterator<Item = Timeseries>) -> Result<Self, MatchError> {
        let mut corpus = Self::new();
        for s in series {
            corpus.insert(s)?;
        }
        Ok(corpus)
    }

    /// Add a series under its own label.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::DuplicateLabel`] if the label is already present.
    pub fn insert(&mut self, series: Timeseries) -> Result<(), MatchError> {
        let label = series.label().to_owned();
        if self.entries.contains_key(&label) {
            return Err(MatchError::DuplicateLabel { label });
        }
        self.entries.insert(label, series);
        Ok(())
    }

    /// Return a corpus augmented with horizontally mirrored side views.
    ///
    /// Every entry whose label carries a lateral angle gets a mirrored copy
    /// keyed under the opposite side. An existing recording under that label
    /// is kept instead of the synthetic copy. Front, back and unparseable
    /// labels are left alone.
    #[must_use]
    #[instrument(skip(self), fields(n_entries = self.entries.len()))]
    pub fn with_mirrored_sides(mut self) -> Self {
        let mirrored: Vec<Timeseries> = self
            .entries
            .iter()
            .filter_map(|(label, series)| {
                let opposite = opposite_side_label(label)?;
                if self.entries.contains_key(&opposite) {
                    debug!(%label, %opposite, "real recording exists, not mirroring");
                    return None;
                }
                Some(series.mirrored(opposite))
            })
            .collect();

        let added = mirrored.len();
        for series in mirrored {
            self.entries.insert(series.label().to_owned(), series);
        }
        info!(added, total = self.entries.len(), "added mirrored side views");
        self
    }

    /// Return the series stored under `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Timeseries> {
        self.entries.get(label)
    }

    /// Return true if `label` is present.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.entries.contains_key(label)
    }

    /// Return the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true if the corpus has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate labels in lexicographic order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate series in lexicographic label order.
    pub fn iter(&self) -> impl Iterator<Item = &Timeseries> {
        self.entries.values()
    }

    /// Collect the series in lexicographic label order.
    pub(crate) fn as_vec(&self) -> Vec<&Timeseries> {
        self.entries.values().collect()
    }
}

impl<'a> IntoIterator for &'a Corpus {
    type Item = &'a Timeseries;
    type IntoIter = std::collections::btree_map::Values<'a, String, Timeseries>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
