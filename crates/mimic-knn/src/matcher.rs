//! Nearest-neighbour matching of a query series against a labeled corpus.

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use mimic_dtw::{Distance, Dtw, DtwError, Timeseries, WarpingPath};

use crate::corpus::Corpus;
use crate::error::MatchError;

/// Warping window used when none is configured.
pub const DEFAULT_WARPING_WINDOW: usize = 100;

/// A corpus entry scored against a query. Lower scores are closer.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    /// Label of the corpus entry.
    pub label: String,
    /// Warped distance between the query and the entry.
    pub score: Distance,
}

/// A corpus entry whose comparison with the query failed.
#[derive(Debug)]
pub struct SkippedEntry {
    /// Label of the corpus entry.
    pub label: String,
    /// Why the comparison was rejected.
    pub error: DtwError,
}

/// Every comparable corpus entry, closest first.
///
/// Sorted by score, then label, so equal scores resolve to the
/// lexicographically smallest label.
#[derive(Debug)]
pub struct Ranking {
    query: String,
    /// Never empty.
    matches: Vec<Match>,
    skipped: Vec<SkippedEntry>,
}

impl Ranking {
    /// Return the query label.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Return the nearest neighbour.
    #[must_use]
    pub fn best(&self) -> &Match {
        &self.matches[0]
    }

    /// Return the `k` closest matches, or all of them if there are fewer.
    #[must_use]
    pub fn top(&self, k: usize) -> &[Match] {
        &self.matches[..k.min(self.matches.len())]
    }

    /// Return every comparable match, closest first.
    #[must_use]
    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    /// Return the entries that could not be compared.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    /// Consume and return the nearest neighbour.
    #[must_use]
    pub fn into_best(mut self) -> Match {
        self.matches.swap_remove(0)
    }
}

/// Immutable nearest-neighbour classifier.
///
/// Construct via [`Matcher::new`] with a configured [`Dtw`], or use
/// [`Matcher::default`] for a Sakoe-Chiba window of [`DEFAULT_WARPING_WINDOW`]
/// and the default frame metric.
#[derive(Debug, Clone)]
pub struct Matcher {
    dtw: Dtw,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(Dtw::with_sakoe_chiba(DEFAULT_WARPING_WINDOW))
    }
}

impl Matcher {
    /// Create a matcher that scores with `dtw`.
    #[must_use]
    pub fn new(dtw: Dtw) -> Self {
        Self { dtw }
    }

    /// Return the DTW configuration.
    #[must_use]
    pub fn dtw(&self) -> &Dtw {
        &self.dtw
    }

    /// Return the closest corpus entry to `query`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`rank`][Matcher::rank].
    pub fn classify(&self, corpus: &Corpus, query: &Timeseries) -> Result<Match, MatchError> {
        self.rank(corpus, query).map(Ranking::into_best)
    }

    /// Score `query` against every corpus entry and sort the results.
    ///
    /// Entries are compared in parallel. An entry whose comparison fails (for
    /// instance a different grid resolution, or a length difference the
    /// warping window cannot bridge) is logged and recorded in
    /// [`Ranking::skipped`] instead of failing the whole query.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`MatchError::EmptyCorpus`] | `corpus` has no entries |
    /// | [`MatchError::NoComparableEntries`] | Every entry failed to compare |
    #[instrument(skip_all, fields(query = query.label(), n_entries = corpus.len()))]
    pub fn rank(&self, corpus: &Corpus, query: &Timeseries) -> Result<Ranking, MatchError> {
        if corpus.is_empty() {
            return Err(MatchError::EmptyCorpus);
        }

        let scored: Vec<(&Timeseries, Result<Distance, DtwError>)> = corpus
            .as_vec()
            .into_par_iter()
            .map(|entry| (entry, self.dtw.distance(query, entry)))
            .collect();

        let mut matches = Vec::with_capacity(scored.len());
        let mut skipped = Vec::new();
        for (entry, result) in scored {
            match result {
                Ok(score) => matches.push(Match {
                    label: entry.label().to_owned(),
                    score,
                }),
                Err(error) => {
                    warn!(
                        query = query.label(),
                        entry = entry.label(),
                        %error,
                        "skipping corpus entry"
                    );
                    skipped.push(SkippedEntry {
                        label: entry.label().to_owned(),
                        error,
                    });
                }
            }
        }

        if matches.is_empty() {
            return Err(MatchError::NoComparableEntries {
                query: query.label().to_owned(),
                skipped: skipped.len(),
            });
        }

        matches.sort_by(match_order);
        debug!(
            best = %matches[0].label,
            score = %matches[0].score,
            n_skipped = skipped.len(),
            "ranking complete"
        );

        Ok(Ranking {
            query: query.label().to_owned(),
            matches,
            skipped,
        })
    }

    /// Rank several queries against the same corpus, in query order.
    #[instrument(skip_all, fields(n_queries = queries.len(), n_entries = corpus.len()))]
    pub fn rank_all(
        &self,
        corpus: &Corpus,
        queries: &[Timeseries],
    ) -> Vec<Result<Ranking, MatchError>> {
        queries
            .par_iter()
            .map(|query| self.rank(corpus, query))
            .collect()
    }

    /// Classify several queries, failing on the first query that cannot be matched.
    ///
    /// # Errors
    ///
    /// Same conditions as [`rank`][Matcher::rank], for any query.
    pub fn classify_all(
        &self,
        corpus: &Corpus,
        queries: &[Timeseries],
    ) -> Result<Vec<Match>, MatchError> {
        self.rank_all(corpus, queries)
            .into_iter()
            .map(|ranking| ranking.map(Ranking::into_best))
            .collect()
    }

    /// Compare two series directly, returning the distance and warping path.
    ///
    /// # Errors
    ///
    /// Returns [`MatchError::Dtw`] if the series cannot be compared.
    pub fn compare(
        &self,
        a: &Timeseries,
        b: &Timeseries,
    ) -> Result<(Distance, WarpingPath), MatchError> {
        Ok(self.dtw.distance_and_path(a, b)?)
    }
}

/// Order two matches by score, then label.
pub(crate) fn match_order(a: &Match, b: &Match) -> Ordering {
    a.score.total_cmp(&b.score).then_with(|| a.label.cmp(&b.label))
}
