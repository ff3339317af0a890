//! JSON result writer for classification runs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use mimic_dtw::Distance;
use mimic_knn::{Evaluation, Match, Ranking, display_label};

use crate::IoError;
use crate::domain::ExperimentName;

/// Writes classification results to JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{experiment}_classify.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
    experiment: ExperimentName,
}

/// Matching parameters recorded alongside the results.
#[derive(Debug, Clone, Serialize)]
pub struct RunParameters {
    /// Sakoe-Chiba radius, `None` when unconstrained.
    pub warping_window: Option<usize>,
    /// Confidence both peaks must reach for a part to be compared.
    pub min_confidence: f64,
    /// Average confidence a part must reach over a whole series, if filtered.
    pub min_average_confidence: Option<f64>,
    /// Compared body part indices, `None` for all.
    pub parts: Option<Vec<usize>>,
    /// Whether mirrored side views were added to the corpus.
    pub mirrored: bool,
    /// Number of corpus entries, including mirrored ones.
    pub corpus_size: usize,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory and experiment name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), experiment = %experiment))]
    pub fn new(output_dir: &Path, experiment: ExperimentName) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            experiment,
        })
    }

    /// Write rankings and their evaluation to `{experiment}_classify.json`.
    ///
    /// Each prediction lists the best guess (with and without section suffix),
    /// the `top_k` closest entries and any entries that could not be compared.
    /// Sentinel scores are written as `null`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::SerializeJson`] | Artifact cannot be serialized |
    /// | [`IoError::WriteFile`] | File cannot be written |
    #[instrument(skip_all, fields(n_rankings = rankings.len()))]
    pub fn write_classify(
        &self,
        params: &RunParameters,
        rankings: &[Ranking],
        evaluation: &Evaluation,
        top_k: usize,
    ) -> Result<PathBuf, IoError> {
        let path = self
            .output_dir
            .join(format!("{}_classify.json", self.experiment.as_str()));

        let predictions = rankings
            .iter()
            .map(|r| PredictionEntry {
                query: r.query(),
                guess: r.best().label.as_str(),
                display: display_label(&r.best().label),
                score: score_value(r.best().score),
                top_k: r.top(top_k).iter().map(CandidateEntry::from).collect(),
                skipped: r.skipped().iter().map(|s| s.label.as_str()).collect(),
            })
            .collect();

        let artifact = ClassifyArtifact {
            experiment: self.experiment.as_str(),
            parameters: params,
            n_queries: rankings.len(),
            evaluation: EvaluationEntry {
                total: evaluation.total(),
                correct: evaluation.correct(),
                unscored: evaluation.unscored,
                accuracy: evaluation.accuracy(),
            },
            predictions,
        };

        write_json(&path, &artifact)?;
        info!(path = %path.display(), "classification result written");
        Ok(path)
    }
}

/// Finite scores as numbers, the sentinel as `None`.
#[must_use]
pub fn score_value(score: Distance) -> Option<f64> {
    (!score.is_sentinel()).then(|| score.value())
}

fn write_json<T: Serialize>(path: &Path, artifact: &T) -> Result<(), IoError> {
    let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::SerializeJson {
        path: path.to_path_buf(),
        source: e,
    })?;
    fs::write(path, &json).map_err(|e| IoError::WriteFile {
        path: path.to_path_buf(),
        source: e,
    })
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct ClassifyArtifact<'a> {
    experiment: &'a str,
    parameters: &'a RunParameters,
    n_queries: usize,
    evaluation: EvaluationEntry,
    predictions: Vec<PredictionEntry<'a>>,
}

#[derive(Serialize)]
struct EvaluationEntry {
    total: usize,
    correct: usize,
    unscored: usize,
    accuracy: Option<f64>,
}

#[derive(Serialize)]
struct PredictionEntry<'a> {
    query: &'a str,
    guess: &'a str,
    display: String,
    score: Option<f64>,
    top_k: Vec<CandidateEntry<'a>>,
    skipped: Vec<&'a str>,
}

#[derive(Serialize)]
struct CandidateEntry<'a> {
    label: &'a str,
    score: Option<f64>,
}

impl<'a> From<&'a Match> for CandidateEntry<'a> {
    fn from(m: &'a Match) -> Self {
        Self {
            label: &m.label,
            score: score_value(m.score),
        }
    }
}

#[cfg(test)]
mod tests {
    use mimic_dtw::{ConfidenceGrid, Dtw, Frame, Timeseries};
    use mimic_knn::{Corpus, Matcher};
    use tempfile::TempDir;

    use super::*;

    fn track(label: &str, cols: &[usize], conf: f64) -> Timeseries {
        let frames = cols
            .iter()
            .map(|&c| {
                let mut values = vec![0.0; 8];
                values[c] = conf;
                Frame::new(vec![ConfidenceGrid::new(1, 8, values).unwrap()]).unwrap()
            })
            .collect();
        Timeseries::new(label, frames).unwrap()
    }

    fn params() -> RunParameters {
        RunParameters {
            warping_window: Some(100),
            min_confidence: 0.2,
            min_average_confidence: Some(0.3),
            parts: None,
            mirrored: false,
            corpus_size: 2,
        }
    }

    fn rankings() -> (Vec<Ranking>, Evaluation) {
        let corpus = Corpus::from_series([
            track("squat_front_sec1", &[0, 1, 2], 0.9),
            track("lunge_side1", &[5, 6, 7], 0.9),
        ])
        .unwrap();
        let queries = [
            track("squat_front_sec2", &[0, 1, 2], 0.9),
            track("ghost_front", &[3, 3, 3], 0.05),
        ];
        let matcher = Matcher::new(Dtw::unconstrained());
        let rankings: Vec<Ranking> = matcher
            .rank_all(&corpus, &queries)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let evaluation =
            Evaluation::from_matches(rankings.iter().map(|r| (r.query(), r.best())));
        (rankings, evaluation)
    }

    #[test]
    fn write_classify_json_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), ExperimentName::new("run_01").unwrap()).unwrap();
        let (rankings, evaluation) = rankings();

        let path = writer.write_classify(&params(), &rankings, &evaluation, 5).unwrap();
        assert_eq!(path, dir.path().join("run_01_classify.json"));

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["experiment"], "run_01");
        assert_eq!(content["n_queries"], 2);
        assert_eq!(content["parameters"]["warping_window"], 100);
        assert!(content["parameters"]["parts"].is_null());
        assert_eq!(content["parameters"]["min_average_confidence"], 0.3);

        let first = &content["predictions"][0];
        assert_eq!(first["query"], "squat_front_sec2");
        assert_eq!(first["guess"], "squat_front_sec1");
        assert_eq!(first["display"], "squat_front");
        assert_eq!(first["score"], 0.0);
        assert_eq!(first["top_k"].as_array().unwrap().len(), 2);

        assert_eq!(content["evaluation"]["total"], 2);
        assert_eq!(content["evaluation"]["correct"], 1);
    }

    #[test]
    fn sentinel_scores_are_null() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path(), ExperimentName::new("sentinel").unwrap()).unwrap();
        let (rankings, evaluation) = rankings();

        let path = writer.write_classify(&params(), &rankings, &evaluation, 1).unwrap();
        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        let ghost = &content["predictions"][1];
        assert_eq!(ghost["query"], "ghost_front");
        assert!(ghost["score"].is_null());
        assert_eq!(ghost["top_k"].as_array().unwrap().len(), 1);
        assert!(ghost["top_k"][0]["score"].is_null());
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("deep");
        let writer = ResultWriter::new(&nested, ExperimentName::new("nested").unwrap()).unwrap();
        let (rankings, evaluation) = rankings();
        writer.write_classify(&params(), &rankings, &evaluation, 1).unwrap();
        assert!(nested.join("nested_classify.json").exists());
    }

    #[test]
    fn score_value_maps_sentinel() {
        assert_eq!(score_value(Distance::INFINITY), None);
        assert_eq!(score_value(Distance::ZERO), Some(0.0));
    }
}
