//! Classification accuracy over labeled queries.

use tracing::info;

use crate::label::ExerciseLabel;
use crate::matcher::Match;

/// Outcome of one scored query.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Query label.
    pub query: String,
    /// Label of the nearest neighbour.
    pub guess: String,
    /// Whether the guess names the query's exercise and camera angle.
    pub correct: bool,
}

/// Accuracy of a batch of classifications.
///
/// A guess is correct when its exercise and camera angle equal the query's;
/// sections are ignored. Queries whose labels do not parse cannot be scored and
/// are counted in `unscored` only. An unparseable guess is always wrong.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Scored outcomes, in input order.
    pub outcomes: Vec<Outcome>,
    /// Number of queries excluded because their label does not parse.
    pub unscored: usize,
}

impl Evaluation {
    /// Score `(query label, nearest neighbour)` pairs.
    #[must_use]
    pub fn from_matches<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a Match)>) -> Self {
        let mut eval = Self::default();
        for (query, guess) in pairs {
            let Ok(expected) = ExerciseLabel::parse(query) else {
                eval.unscored += 1;
                continue;
            };
            let correct = ExerciseLabel::parse(&guess.label)
                .is_ok_and(|g| g.exercise_and_angle() == expected.exercise_and_angle());
            eval.outcomes.push(Outcome {
                query: query.to_owned(),
                guess: guess.label.clone(),
                correct,
            });
        }
        info!(
            total = eval.total(),
            correct = eval.correct(),
            unscored = eval.unscored,
            "evaluation complete"
        );
        eval
    }

    /// Return the number of scored queries.
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Return the number of correct guesses.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }

    /// Return the fraction of scored queries guessed correctly, or `None` if none were scored.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        (self.total() > 0).then(|| self.correct() as f64 / self.total() as f64)
    }
}
