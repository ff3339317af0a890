//! End-to-end matching tests for mimic-knn over synthetic heatmap recordings.

use mimic_dtw::{ConfidenceGrid, Dtw, Frame, FrameMetric, Timeseries};
use mimic_knn::{Corpus, Evaluation, MatchError, Matcher, display_label};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PARTS: usize = 4;
const SIZE: usize = 12;

/// A recording where each part's peak follows `trajectory(t, part)`, with
/// low-amplitude seeded noise over the rest of the grid.
fn recording(
    rng: &mut ChaCha8Rng,
    label: &str,
    len: usize,
    trajectory: impl Fn(usize, usize) -> (usize, usize),
) -> Timeseries {
    let frames = (0..len)
        .map(|t| {
            let grids = (0..PARTS)
                .map(|p| {
                    let mut values: Vec<f64> =
                        (0..SIZE * SIZE).map(|_| rng.gen_range(0.0..0.05)).collect();
                    let (r, c) = trajectory(t, p);
                    values[r * SIZE + c] = 0.8;
                    ConfidenceGrid::new(SIZE, SIZE, values).expect("valid grid")
                })
                .collect();
            Frame::new(grids).expect("valid frame")
        })
        .collect();
    Timeseries::new(label, frames).expect("valid series")
}

/// Squat: every part moves down then up, column fixed by part.
fn squat(t: usize, p: usize) -> (usize, usize) {
    let depth = if t < 5 { t } else { 10 - t };
    (2 + depth, 1 + p)
}

/// Side lunge: parts travel right along the grid.
fn lunge(t: usize, p: usize) -> (usize, usize) {
    (3 + p, t.min(SIZE - 1))
}

/// Jumping jack: parts spread horizontally from the centre and return.
fn jack(t: usize, p: usize) -> (usize, usize) {
    let spread = if t < 5 { t } else { 10 - t };
    let centre = SIZE / 2;
    let col = if p % 2 == 0 {
        centre - spread.min(centre)
    } else {
        (centre + spread).min(SIZE - 1)
    };
    (4 + p, col)
}

fn labeled_corpus(rng: &mut ChaCha8Rng) -> Corpus {
    Corpus::from_series([
        recording(rng, "squat_front_sec1", 10, squat),
        recording(rng, "lunge_side1", 10, lunge),
        recording(rng, "jumping-jack_front", 10, jack),
    ])
    .expect("unique labels")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn classifies_noisy_repetitions() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let corpus = labeled_corpus(&mut rng);
    let queries = vec![
        recording(&mut rng, "squat_front_sec2", 11, |t, p| squat(t.min(10), p)),
        recording(&mut rng, "jumping-jack_front", 9, jack),
        recording(&mut rng, "lunge_side1_sec1", 10, lunge),
    ];

    let matcher = Matcher::new(Dtw::with_sakoe_chiba(3));
    let guesses = matcher.classify_all(&corpus, &queries).expect("all comparable");

    let shown: Vec<String> = guesses.iter().map(|m| display_label(&m.label)).collect();
    assert_eq!(shown, ["squat_front", "jumping-jack_front", "lunge_side1"]);

    let eval = Evaluation::from_matches(queries.iter().map(Timeseries::label).zip(&guesses));
    assert_eq!(eval.accuracy(), Some(1.0));
}

#[test]
fn mirrored_corpus_recognizes_opposite_side() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let corpus = labeled_corpus(&mut rng).with_mirrored_sides();
    assert!(corpus.contains("lunge_side2"));
    assert!(!corpus.contains("squat_back_sec1"));
    assert_eq!(corpus.len(), 4);

    // The same lunge recorded from the other side travels left.
    let query = recording(&mut rng, "lunge_side2", 10, |t, p| {
        let (r, c) = lunge(t, p);
        (r, SIZE - 1 - c)
    });
    let m = Matcher::default().classify(&corpus, &query).expect("comparable");
    assert_eq!(m.label, "lunge_side2");

    let without_mirror = labeled_corpus(&mut rng);
    let m = Matcher::default().classify(&without_mirror, &query).expect("comparable");
    assert_ne!(m.label, "lunge_side2");
}

#[test]
fn exact_copy_scores_zero_and_ties_favour_first_label() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let original = recording(&mut rng, "squat_front", 6, squat);
    let corpus = Corpus::from_series([
        original.relabeled("squat_front_sec2"),
        original.relabeled("squat_front_sec1"),
        recording(&mut rng, "lunge_side1", 6, lunge),
    ])
    .expect("unique labels");

    let ranking = Matcher::default().rank(&corpus, &original).expect("comparable");
    assert_eq!(ranking.best().label, "squat_front_sec1");
    assert_eq!(ranking.best().score.value(), 0.0);
    assert_eq!(ranking.matches()[1].label, "squat_front_sec2");
    assert_eq!(ranking.matches()[1].score.value(), 0.0);
}

#[test]
fn relevant_parts_change_the_neighbour() {
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    // Part 0 moves like a squat, the rest like a jumping jack.
    let hybrid = recording(&mut rng, "hybrid_front", 10, |t, p| {
        if p == 0 { squat(t, p) } else { jack(t, p) }
    });
    let corpus = labeled_corpus(&mut rng);

    let everything = Matcher::default().classify(&corpus, &hybrid).unwrap();
    assert_eq!(everything.label, "jumping-jack_front");

    let first_part = FrameMetric::default().with_parts([0]).unwrap();
    let narrowed = Matcher::new(Dtw::with_sakoe_chiba(100).with_metric(first_part))
        .classify(&corpus, &hybrid)
        .unwrap();
    assert_eq!(narrowed.label, "squat_front_sec1");
}

#[test]
fn empty_corpus_fails_every_query() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let queries = vec![recording(&mut rng, "squat_front", 4, squat)];
    let results = Matcher::default().rank_all(&Corpus::new(), &queries);
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(MatchError::EmptyCorpus)));
}
