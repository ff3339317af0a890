use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use mimic_dtw::{BodyPart, DEFAULT_MIN_CONFIDENCE, Dtw, FrameMetric, Timeseries};
use mimic_io::{ExperimentName, ResultWriter, RunParameters, TimeseriesCache, score_value};
use mimic_knn::{Corpus, DEFAULT_WARPING_WINDOW, Evaluation, Matcher, Ranking, display_label};

#[derive(Parser)]
#[command(name = "mimic")]
#[command(about = "Match exercise recordings against a labeled corpus of pose heatmaps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel computation (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Shared matching parameters.
#[derive(Args, Debug, Clone)]
struct TuningArgs {
    /// Sakoe-Chiba warping window radius, in frames
    #[arg(long, default_value_t = DEFAULT_WARPING_WINDOW)]
    warping_window: usize,

    /// Disable the warping window entirely
    #[arg(long, default_value_t = false, conflicts_with = "warping_window")]
    unconstrained: bool,

    /// Confidence both peaks must reach for a body part to be compared
    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    min_confidence: f64,

    /// Drop body parts whose peak confidence averages below this over a series
    #[arg(long)]
    min_average_confidence: Option<f64>,

    /// Body parts to compare, by name (e.g. "right_wrist") or channel index
    #[arg(long, value_delimiter = ',')]
    parts: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every cached unlabeled recording against the labeled corpus
    Classify {
        /// Cache directory of labeled recordings
        #[arg(long)]
        labeled: PathBuf,

        /// Cache directory of recordings to classify
        #[arg(long)]
        unlabeled: PathBuf,

        /// Add mirrored copies of side1/side2 recordings to the corpus
        #[arg(long, default_value_t = false)]
        mirror: bool,

        /// Number of closest entries to log and record per query
        #[arg(long, default_value_t = 5)]
        top_k: usize,

        /// Experiment name for the JSON artifact (must match [a-zA-Z0-9_-]+)
        #[arg(long, requires = "output_dir")]
        experiment: Option<ExperimentName>,

        /// Output directory for the JSON artifact
        #[arg(long, requires = "experiment")]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Print the warped distance between two cached recordings
    Compare {
        /// Cache directory holding both recordings
        #[arg(long)]
        labeled: PathBuf,

        /// Label of the first recording
        #[arg(long)]
        a: String,

        /// Label of the second recording
        #[arg(long)]
        b: String,

        #[command(flatten)]
        tuning: TuningArgs,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct ClassifyOutput {
    corpus_size: usize,
    n_queries: usize,
    total: usize,
    correct: usize,
    unscored: usize,
    accuracy: Option<f64>,
    artifact: Option<PathBuf>,
}

#[derive(Serialize)]
struct CompareOutput {
    a: String,
    b: String,
    distance: Option<f64>,
    path_len: usize,
    max_deviation: usize,
}

impl TuningArgs {
    fn window(&self) -> Option<usize> {
        (!self.unconstrained).then_some(self.warping_window)
    }

    fn part_indices(&self) -> Result<Option<Vec<usize>>> {
        if self.parts.is_empty() {
            return Ok(None);
        }
        self.parts
            .iter()
            .map(|p| match p.trim().parse::<usize>() {
                Ok(index) => Ok(index),
                Err(_) => Ok(p.parse::<BodyPart>()?.index()),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    fn build_dtw(&self) -> Result<Dtw> {
        let mut metric = FrameMetric::new(self.min_confidence)?;
        if let Some(parts) = self.part_indices()? {
            metric = metric.with_parts(parts)?;
        }
        if let Some(threshold) = self.min_average_confidence {
            metric = metric.with_min_average_confidence(threshold)?;
        }
        let dtw = match self.window() {
            Some(radius) => Dtw::with_sakoe_chiba(radius),
            None => Dtw::unconstrained(),
        };
        Ok(dtw.with_metric(metric))
    }
}

fn log_ranking(ranking: &Ranking, top_k: usize) {
    for (rank, m) in ranking.top(top_k).iter().enumerate() {
        info!(
            query = ranking.query(),
            rank = rank + 1,
            label = %m.label,
            score = %m.score,
            "candidate"
        );
    }
}

/// Rank every query, aborting the run on the first query that cannot be matched.
fn rank_queries(
    matcher: &Matcher,
    corpus: &Corpus,
    queries: &[Timeseries],
    top_k: usize,
) -> Result<Vec<Ranking>> {
    let mut rankings = Vec::with_capacity(queries.len());
    for (query, result) in queries.iter().zip(matcher.rank_all(corpus, queries)) {
        let ranking = result.with_context(|| format!("failed to classify {}", query.label()))?;
        let best = ranking.best();
        println!(
            "Best guess for {} is {} (score={})",
            query.label(),
            display_label(&best.label),
            best.score
        );
        log_ranking(&ranking, top_k);
        rankings.push(ranking);
    }
    Ok(rankings)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Classify {
            labeled,
            unlabeled,
            mirror,
            top_k,
            experiment,
            output_dir,
            tuning,
        } => {
            let matcher = Matcher::new(tuning.build_dtw()?);

            let labeled_series = TimeseriesCache::open(&labeled)
                .and_then(|c| c.load_all())
                .context("failed to load labeled recordings")?;
            let queries = TimeseriesCache::open(&unlabeled)
                .and_then(|c| c.load_all())
                .context("failed to load unlabeled recordings")?;

            let mut corpus = Corpus::from_series(labeled_series)?;
            if mirror {
                corpus = corpus.with_mirrored_sides();
            }
            info!(corpus_size = corpus.len(), n_queries = queries.len(), "data loaded");

            let rankings = rank_queries(&matcher, &corpus, &queries, top_k)?;

            let evaluation =
                Evaluation::from_matches(rankings.iter().map(|r| (r.query(), r.best())));
            if let Some(accuracy) = evaluation.accuracy() {
                info!(
                    accuracy,
                    correct = evaluation.correct(),
                    total = evaluation.total(),
                    "evaluation"
                );
            }

            let artifact = match (output_dir, experiment) {
                (Some(dir), Some(name)) => {
                    let params = RunParameters {
                        warping_window: tuning.window(),
                        min_confidence: tuning.min_confidence,
                        min_average_confidence: tuning.min_average_confidence,
                        parts: tuning.part_indices()?,
                        mirrored: mirror,
                        corpus_size: corpus.len(),
                    };
                    let writer = ResultWriter::new(&dir, name)?;
                    Some(writer.write_classify(&params, &rankings, &evaluation, top_k)?)
                }
                _ => None,
            };

            let output = ClassifyOutput {
                corpus_size: corpus.len(),
                n_queries: queries.len(),
                total: evaluation.total(),
                correct: evaluation.correct(),
                unscored: evaluation.unscored,
                accuracy: evaluation.accuracy(),
                artifact,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Compare {
            labeled,
            a,
            b,
            tuning,
        } => {
            let matcher = Matcher::new(tuning.build_dtw()?);
            let cache = TimeseriesCache::open(&labeled)?;
            let series_a = cache
                .load(&a)
                .with_context(|| format!("failed to load recording {a}"))?;
            let series_b = cache
                .load(&b)
                .with_context(|| format!("failed to load recording {b}"))?;

            let (distance, path) = matcher
                .compare(&series_a, &series_b)
                .context("comparison failed")?;
            info!(%distance, path_len = path.len(), "compared recordings");

            let output = CompareOutput {
                a,
                b,
                distance: score_value(distance),
                path_len: path.len(),
                max_deviation: path.max_deviation(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
