//! Accuracy regression tests for mimic-dtw.
//!
//! These tests pin warped distances for hand-built heatmap sequences and check
//! the algebraic properties the matcher relies on. Reference values were worked
//! out by hand on peak coordinates.

use mimic_dtw::{
    BandConstraint, BodyPart, ConfidenceGrid, Dtw, DtwError, Frame, FrameMetric, Timeseries,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ROWS: usize = 16;
const COLS: usize = 16;

/// Frame whose part `k` peaks at `peaks[k] = (row, col, confidence)`.
fn frame(peaks: &[(usize, usize, f64)]) -> Frame {
    let grids = peaks
        .iter()
        .map(|&(r, c, conf)| {
            let mut values = vec![0.0; ROWS * COLS];
            values[r * COLS + c] = conf;
            ConfidenceGrid::new(ROWS, COLS, values).expect("valid test grid")
        })
        .collect();
    Frame::new(grids).expect("valid test frame")
}

/// Single-part series following a column trajectory on row 0.
fn column_track(label: &str, cols: &[usize]) -> Timeseries {
    let frames = cols.iter().map(|&c| frame(&[(0, c, 0.9)])).collect();
    Timeseries::new(label, frames).expect("valid test series")
}

/// Series of random dense heatmaps with `parts` body parts.
fn random_series(rng: &mut ChaCha8Rng, label: &str, len: usize, parts: usize) -> Timeseries {
    let frames = (0..len)
        .map(|_| {
            let grids = (0..parts)
                .map(|_| {
                    let values = (0..ROWS * COLS).map(|_| rng.gen_range(0.0..0.6)).collect();
                    ConfidenceGrid::new(ROWS, COLS, values).expect("valid random grid")
                })
                .collect();
            Frame::new(grids).expect("valid random frame")
        })
        .collect();
    Timeseries::new(label, frames).expect("valid random series")
}

// ---------------------------------------------------------------------------
// a) distances_match_known_values
// ---------------------------------------------------------------------------

/// Unconstrained distances for column trajectories match hand-computed values.
#[test]
fn distances_match_known_values() {
    let pairs: Vec<(Vec<usize>, Vec<usize>, f64)> = vec![
        (vec![0, 0, 0], vec![1, 1, 1], 3.0),        // constant offset
        (vec![0, 1, 0], vec![0, 0, 0], 1.0),        // single bump
        (vec![1, 2, 3, 4], vec![1, 2, 3, 4], 0.0),  // identical
        (vec![1], vec![5], 4.0),                    // single frame
        (vec![0, 0, 1], vec![1, 0, 0], 2.0),        // shifted bump
        (vec![0, 1, 2], vec![0, 2], 1.0),           // different lengths
        (vec![0, 0, 0, 4], vec![0, 4], 0.0),        // pure time stretch
        (vec![3, 3, 3], vec![0], 9.0),              // one frame against many
    ];

    let dtw = Dtw::unconstrained();
    for (i, (a, b, expected)) in pairs.iter().enumerate() {
        let a = column_track("a", a);
        let b = column_track("b", b);
        let dist = dtw.distance(&a, &b).expect("comparable series").value();
        assert!(
            (dist - expected).abs() < 1e-10,
            "pair {i}: got {dist:.15}, expected {expected:.15}"
        );
    }
}

// ---------------------------------------------------------------------------
// b) sentinel and gating scenarios
// ---------------------------------------------------------------------------

/// Two-part frames: one reliable part at distance 3, one gated out, filled with 3.
#[test]
fn gated_part_is_filled_with_widest_distance() {
    let a = Timeseries::new("a", vec![frame(&[(0, 0, 0.9), (5, 5, 0.05)])]).unwrap();
    let b = Timeseries::new("b", vec![frame(&[(0, 3, 0.9), (9, 9, 0.9)])]).unwrap();
    let dist = Dtw::with_sakoe_chiba(0).distance(&a, &b).unwrap();
    assert!((dist.value() - 6.0).abs() < 1e-12);
}

/// A frame pair with no reliable part poisons every path through it.
#[test]
fn unreliable_frame_poisons_distance() {
    let a = Timeseries::new("a", vec![frame(&[(0, 0, 0.9)]), frame(&[(0, 0, 0.01)])]).unwrap();
    let b = Timeseries::new("b", vec![frame(&[(0, 0, 0.9)]), frame(&[(0, 0, 0.9)])]).unwrap();
    let dist = Dtw::unconstrained().distance(&a, &b).unwrap();
    assert!(dist.is_sentinel());
}

/// Lowering the threshold makes the same pair comparable.
#[test]
fn threshold_controls_reliability() {
    let a = Timeseries::new("a", vec![frame(&[(0, 0, 0.1)])]).unwrap();
    let b = Timeseries::new("b", vec![frame(&[(0, 2, 0.1)])]).unwrap();
    assert!(Dtw::unconstrained().distance(&a, &b).unwrap().is_sentinel());

    let lenient = Dtw::unconstrained().with_metric(FrameMetric::new(0.05).unwrap());
    let dist = lenient.distance(&a, &b).unwrap();
    assert!((dist.value() - 2.0).abs() < 1e-12);
}

/// Restricting to named parts ignores movement elsewhere in the body.
#[test]
fn relevant_parts_restrict_comparison() {
    let mut peaks_a = vec![(0, 0, 0.9); BodyPart::ALL.len()];
    let mut peaks_b = peaks_a.clone();
    peaks_a[BodyPart::LeftKnee.index()] = (4, 4, 0.9);
    peaks_b[BodyPart::LeftKnee.index()] = (4, 8, 0.9);
    peaks_b[BodyPart::RightWrist.index()] = (10, 0, 0.9);

    let a = Timeseries::new("a", vec![frame(&peaks_a)]).unwrap();
    let b = Timeseries::new("b", vec![frame(&peaks_b)]).unwrap();

    let knees = FrameMetric::default()
        .with_body_parts(&[BodyPart::LeftKnee, BodyPart::RightKnee])
        .unwrap();
    let dist = Dtw::unconstrained().with_metric(knees).distance(&a, &b).unwrap();
    assert!((dist.value() - 4.0).abs() < 1e-12);

    let all = Dtw::unconstrained().distance(&a, &b).unwrap();
    assert!((all.value() - 14.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// c) band properties
// ---------------------------------------------------------------------------

/// Banded distance is never below the unconstrained distance.
#[test]
fn banded_distance_geq_unconstrained() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let free = Dtw::unconstrained();
    for i in 0..8 {
        let len = rng.gen_range(2..12);
        let a = random_series(&mut rng, "a", len, 2);
        let b = random_series(&mut rng, "b", len, 2);
        let unconstrained = free.distance(&a, &b).unwrap().value();
        let banded = Dtw::with_sakoe_chiba(1).distance(&a, &b).unwrap().value();
        assert!(
            banded >= unconstrained - 1e-10,
            "pair {i}: banded {banded} < unconstrained {unconstrained}"
        );
    }
}

/// Radius zero on equal-length series is the lock-step sum of frame distances.
#[test]
fn radius_zero_is_lock_step() {
    let a = column_track("a", &[0, 2, 4, 6]);
    let b = column_track("b", &[1, 1, 5, 9]);
    let dist = Dtw::with_sakoe_chiba(0).distance(&a, &b).unwrap();
    assert!((dist.value() - 6.0).abs() < 1e-12);

    let (_, path) = Dtw::with_sakoe_chiba(0).distance_and_path(&a, &b).unwrap();
    assert_eq!(path.max_deviation(), 0);
}

/// The band never lets the path stray further than the radius.
#[test]
fn path_stays_inside_band() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for r in 1..4 {
        let a = random_series(&mut rng, "a", 10, 1);
        let b = random_series(&mut rng, "b", 9, 1);
        let (_, path) = Dtw::with_sakoe_chiba(r).distance_and_path(&a, &b).unwrap();
        let interior_deviation = path
            .steps()
            .iter()
            .filter(|s| s.a > 0 && s.b > 0)
            .map(|s| s.a.abs_diff(s.b))
            .max()
            .unwrap_or(0);
        assert!(interior_deviation <= r, "radius {r}: deviation {interior_deviation}");
    }
}

/// Length difference beyond the window is rejected, not scored.
#[test]
fn unreachable_corner_is_rejected() {
    let a = column_track("a", &[0; 3]);
    let b = column_track("b", &[0; 7]);
    let dtw = Dtw::new(BandConstraint::SakoeChibaRadius(3));
    assert!(matches!(
        dtw.distance(&a, &b),
        Err(DtwError::BandTooNarrow { len_a: 3, len_b: 7, window: 3 })
    ));
    assert!(Dtw::with_sakoe_chiba(4).distance(&a, &b).is_ok());
}

// ---------------------------------------------------------------------------
// d) symmetry and mirroring
// ---------------------------------------------------------------------------

/// Swapping operands leaves the distance unchanged.
#[test]
fn distance_is_symmetric() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    for _ in 0..6 {
        let m = rng.gen_range(1..10);
        let n = rng.gen_range(1..10);
        let a = random_series(&mut rng, "a", m, 3);
        let b = random_series(&mut rng, "b", n, 3);
        for dtw in [Dtw::unconstrained(), Dtw::with_sakoe_chiba(m.abs_diff(n) + 2)] {
            let ab = dtw.distance(&a, &b).unwrap().value();
            let ba = dtw.distance(&b, &a).unwrap().value();
            assert!((ab - ba).abs() < 1e-9, "ab={ab} ba={ba}");
        }
    }
}

/// Mirroring both operands preserves their distance.
#[test]
fn mirroring_both_operands_preserves_distance() {
    let mut rng = ChaCha8Rng::seed_from_u64(17);
    let a = random_series(&mut rng, "squat_side1", 6, 2);
    let b = random_series(&mut rng, "squat_side1_b", 8, 2);
    let dtw = Dtw::unconstrained();
    let plain = dtw.distance(&a, &b).unwrap().value();
    let mirrored = dtw
        .distance(&a.mirrored("squat_side2"), &b.mirrored("squat_side2_b"))
        .unwrap()
        .value();
    assert!((plain - mirrored).abs() < 1e-9);
}

/// A mirrored side view scores zero against a recording of the opposite side.
#[test]
fn mirrored_side_matches_opposite_recording() {
    let side1 = column_track("lunge_side1", &[0, 3, 6, 3]);
    let side2 = column_track("lunge_side2", &[15, 12, 9, 12]);
    let dist = Dtw::unconstrained()
        .distance(&side1.mirrored("lunge_side2"), &side2)
        .unwrap();
    assert_eq!(dist.value(), 0.0);
}
