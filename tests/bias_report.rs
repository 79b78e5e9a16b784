use dice_bias::bias::{BiasError, BiasReport, Thresholds, analyze, analyze_with};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn repeat(face: u32, times: usize) -> Vec<u32> {
    std::iter::repeat_n(face, times).collect()
}

fn check_invariants(report: &BiasReport, sides: u32, n: usize) {
    assert_eq!(report.total_rolls, n);
    assert_eq!(report.per_face_stats.len(), sides as usize);
    let faces: Vec<u32> = report.per_face_stats.iter().map(|f| f.face).collect();
    assert_eq!(faces, (1..=sides).collect::<Vec<_>>());
    let observed: u64 = report.per_face_stats.iter().map(|f| f.observed_frequency).sum();
    assert_eq!(observed, n as u64);
    assert!(report.chi_squared >= 0.0);
    assert!((0.0..=1.0).contains(&report.p_value));
    assert!((0.0..=1.0).contains(&report.total_variation_distance));
    assert!(report.cramers_v >= 0.0 && report.cramers_v <= 1.0 + 1e-12);
}

#[test]
fn empty_sample_has_no_report() {
    assert!(analyze(&[], 6).unwrap().is_none());
}

#[test]
fn one_of_each_face_is_perfectly_uniform() {
    let report = analyze(&[1, 2, 3, 4, 5, 6], 6).unwrap().unwrap();
    check_invariants(&report, 6, 6);
    assert!(close(report.chi_squared, 0.0));
    assert!(close(report.p_value, 1.0));
    assert!(close(report.total_variation_distance, 0.0));
    assert!(close(report.cramers_v, 0.0));
    assert!(!report.is_biased);
    assert!(report.small_sample_warning);
    for f in &report.per_face_stats {
        assert_eq!(f.observed_frequency, 1);
        assert!(close(f.expected_frequency, 1.0));
        assert!(close(f.standardized_residual, 0.0));
    }
}

#[test]
fn lopsided_coin_is_biased() {
    let mut rolls = repeat(1, 90);
    rolls.extend(repeat(2, 10));
    let report = analyze(&rolls, 2).unwrap().unwrap();
    check_invariants(&report, 2, 100);

    assert!(close(report.chi_squared, 64.0));
    assert!(report.p_value < 1e-10);
    assert!(close(report.cramers_v, 0.8));
    assert!(close(report.total_variation_distance, 0.4));
    assert!(!report.small_sample_warning);
    assert!(report.is_biased);

    let heads = &report.per_face_stats[0];
    assert_eq!(heads.observed_frequency, 90);
    assert!(close(heads.expected_frequency, 50.0));
    assert!(close(heads.estimated_probability, 0.9));
    assert!(close(heads.standardized_residual, 40.0 / 50f64.sqrt()));
    assert!(report.per_face_stats[1].standardized_residual < 0.0);
}

#[test]
fn sparse_d20_only_warns() {
    let rolls: Vec<u32> = (1..=19).collect();
    let report = analyze(&rolls, 20).unwrap().unwrap();
    check_invariants(&report, 20, 19);

    // 19 faces at 0.05^2/0.95 plus the missing face at 0.95^2/0.95.
    assert!(close(report.chi_squared, 1.0));
    assert!(report.small_sample_warning);
    assert!(!report.is_biased);
    assert_eq!(report.per_face_stats[19].observed_frequency, 0);
    assert!(close(report.per_face_stats[19].estimated_probability, 0.0));
}

#[test]
fn zero_count_faces_still_contribute() {
    let report = analyze(&repeat(3, 40), 4).unwrap().unwrap();
    check_invariants(&report, 4, 40);
    // expected 10: three empty faces at 10 each, face 3 at 900/10.
    assert!(close(report.chi_squared, 120.0));
    assert!(close(report.total_variation_distance, 0.75));
    assert!(close(report.cramers_v, 1.0));
}

#[test]
fn chi_squared_zero_only_for_uniform_counts() {
    let uniform = analyze(&[1, 2, 3, 4, 4, 3, 2, 1], 4).unwrap().unwrap();
    assert!(close(uniform.chi_squared, 0.0));

    let skewed = analyze(&[1, 2, 3, 4, 4, 3, 2, 2], 4).unwrap().unwrap();
    assert!(skewed.chi_squared > 0.0);
}

#[test]
fn small_sample_suppresses_verdict() {
    let rolls = repeat(6, 12);
    let report = analyze(&rolls, 6).unwrap().unwrap();
    assert!(report.p_value < 0.05);
    assert!(report.small_sample_warning);
    assert!(!report.is_biased);

    let relaxed = Thresholds {
        min_total_rolls: 0,
        min_expected_per_face: 0.0,
        ..Thresholds::default()
    };
    let report = analyze_with(&rolls, 6, &relaxed).unwrap().unwrap();
    assert!(!report.small_sample_warning);
    assert!(report.is_biased);
}

#[test]
fn fair_looking_d6_is_not_biased() {
    let mut rolls = Vec::new();
    for (face, count) in [(1, 9), (2, 11), (3, 10), (4, 12), (5, 8), (6, 10)] {
        rolls.extend(repeat(face, count));
    }
    let report = analyze(&rolls, 6).unwrap().unwrap();
    check_invariants(&report, 6, 60);
    assert!(!report.small_sample_warning);
    assert!(report.p_value > 0.5);
    assert!(!report.is_biased);
}

#[test]
fn invariants_hold_across_mixed_samples() {
    let mut state = 17u64;
    for sides in [2u32, 4, 6, 8, 10, 12, 20, 100] {
        for len in [1usize, 7, 31, 250] {
            let rolls: Vec<u32> = (0..len)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    ((state >> 33) % u64::from(sides)) as u32 + 1
                })
                .collect();
            let report = analyze(&rolls, sides).unwrap().unwrap();
            check_invariants(&report, sides, len);
        }
    }
}

#[test]
fn rejects_degenerate_dice() {
    assert!(matches!(analyze(&[], 0), Err(BiasError::NoFaces)));
    assert!(matches!(analyze(&[1, 1], 1), Err(BiasError::SingleFace)));
}

#[test]
fn rejects_bad_significance_level() {
    for alpha in [0.0, 1.0, -0.1, f64::NAN] {
        let t = Thresholds {
            significance_level: alpha,
            ..Thresholds::default()
        };
        assert!(matches!(
            analyze_with(&[1, 2], 2, &t),
            Err(BiasError::InvalidSignificance(_))
        ));
    }
}

#[test]
fn report_serializes_with_snake_case_fields() {
    let report = analyze(&[1, 2], 2).unwrap().unwrap();
    let v = serde_json::to_value(&report).unwrap();
    assert_eq!(v["total_rolls"], 2);
    assert!(v["per_face_stats"][0]["standardized_residual"].is_number());
    assert_eq!(v["small_sample_warning"], true);
}
