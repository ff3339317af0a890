//! Nearest-neighbour exercise matching over a labeled heatmap corpus.
//!
//! Provides the label convention (`exercise-name_angle[_secN]`), a corpus with
//! mirrored side-view augmentation, a parallel DTW matcher with deterministic
//! tie-breaking, and accuracy evaluation.

mod corpus;
mod error;
mod eval;
mod label;
mod matcher;

pub use corpus::Corpus;
pub use error::{LabelError, MatchError};
pub use eval::{Evaluation, Outcome};
pub use label::{CameraAngle, ExerciseLabel, Section, display_label, opposite_side_label};
pub use matcher::{DEFAULT_WARPING_WINDOW, Match, Matcher, Ranking, SkippedEntry};
