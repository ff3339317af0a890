use mimic_dtw::DtwError;

/// Errors from corpus construction and nearest-neighbour matching.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// Returned when a query is matched against a corpus with no entries.
    #[error("labeled corpus is empty")]
    EmptyCorpus,

    /// Returned when every corpus entry failed to compare against the query.
    #[error("no corpus entry could be compared with \"{query}\" ({skipped} skipped)")]
    NoComparableEntries {
        /// Label of the query series.
        query: String,
        /// Number of entries whose comparison failed.
        skipped: usize,
    },

    /// Returned when two series with the same label are inserted into a corpus.
    #[error("duplicate label \"{label}\" in corpus")]
    DuplicateLabel {
        /// The repeated label.
        label: String,
    },

    /// Wraps a DTW error that is not confined to a single corpus entry.
    #[error("DTW error: {0}")]
    Dtw(#[from] DtwError),
}

/// Errors from parsing an exercise label.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    /// Returned when the label has no `_angle` component.
    #[error("label \"{label}\" has no camera angle")]
    MissingAngle {
        /// The rejected label.
        label: String,
    },

    /// Returned when the angle component is not a known camera angle.
    #[error("label \"{label}\" has unknown camera angle \"{angle}\"")]
    UnknownAngle {
        /// The rejected label.
        label: String,
        /// The unrecognized angle text.
        angle: String,
    },

    /// Returned when the trailing component is neither an angle nor a known section.
    #[error("label \"{label}\" has unknown section \"{section}\"")]
    UnknownSection {
        /// The rejected label.
        label: String,
        /// The unrecognized section text.
        section: String,
    },

    /// Returned when the exercise name is empty.
    #[error("label \"{label}\" has an empty exercise name")]
    EmptyExercise {
        /// The rejected label.
        label: String,
    },
}
