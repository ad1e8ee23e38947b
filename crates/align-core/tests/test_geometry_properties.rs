use align_core::geometry::{fit_rigid, AffineMatrix, Point};
use align_core::{calculate_inlier_score, validate_alignment};
use rand::Rng;
use rand::SeedableRng;

fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

fn matrices_match(m1: &AffineMatrix, m2: &AffineMatrix, eps: f64) -> bool {
    approx(m1.a, m2.a, eps)
        && approx(m1.b, m2.b, eps)
        && approx(m1.tx, m2.tx, eps)
        && approx(m1.c, m2.c, eps)
        && approx(m1.d, m2.d, eps)
        && approx(m1.ty, m2.ty, eps)
}

#[test]
fn test_matrix_times_its_inverse_is_identity() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    for _ in 0..50 {
        let theta: f64 = rng.gen_range(-180.0..180.0);
        let tx: f64 = rng.gen_range(-500.0..500.0);
        let ty: f64 = rng.gen_range(-500.0..500.0);
        let m = AffineMatrix::rotation_translation_deg(theta, tx, ty);
        let product = m.compose(&m.inverse());
        assert!(matrices_match(&product, &AffineMatrix::identity(), 1e-9));
    }
}

#[test]
fn test_composition_is_associative() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(12);
    for _ in 0..50 {
        let m1 = AffineMatrix::rotation_translation_deg(rng.gen_range(-90.0..90.0), rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let m2 = AffineMatrix::rotation_translation_deg(rng.gen_range(-90.0..90.0), rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let m3 = AffineMatrix::rotation_translation_deg(rng.gen_range(-90.0..90.0), rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let left = m1.compose(&m2).compose(&m3);
        let right = m1.compose(&m2.compose(&m3));
        assert!(matrices_match(&left, &right, 1e-9));
    }
}

#[test]
fn test_double_inverse_recovers_original() {
    let m = AffineMatrix::rotation_translation_deg(73.0, -44.0, 12.0);
    assert!(matrices_match(&m.inverse().inverse(), &m, 1e-9));
}

#[test]
fn test_rigid_fit_recovers_random_transforms_within_tolerance() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(13);
    for _ in 0..20 {
        let n = rng.gen_range(100..500);
        let points: Vec<Point> = (0..n)
            .map(|_| Point::new(rng.gen_range(-2000.0..2000.0), rng.gen_range(-2000.0..2000.0)))
            .collect();
        let theta: f64 = rng.gen_range(-30.0..30.0);
        let tx: f64 = rng.gen_range(-200.0..200.0);
        let ty: f64 = rng.gen_range(-200.0..200.0);
        let truth = AffineMatrix::rotation_translation_deg(theta, tx, ty);
        let transformed = truth.transform_points(&points);

        let fit = fit_rigid(&points, &transformed);
        assert!((fit.tx - truth.tx).abs() < 1.0, "tx off by {}", (fit.tx - truth.tx).abs());
        assert!((fit.ty - truth.ty).abs() < 1.0, "ty off by {}", (fit.ty - truth.ty).abs());

        let fit_deg = fit.c.atan2(fit.a).to_degrees();
        let truth_deg = truth.c.atan2(truth.a).to_degrees();
        assert!((fit_deg - truth_deg).abs() < 1.0, "rotation off by {}", (fit_deg - truth_deg).abs());
    }
}

#[test]
fn test_boundary_cases_for_transform_fitting() {
    use align_core::geometry::fit_transform;

    assert_eq!(fit_transform(&[], &[]), AffineMatrix::identity());

    let single_src = [Point::new(5.0, 5.0)];
    let single_tgt = [Point::new(8.0, 1.0)];
    let translation_only = fit_transform(&single_src, &single_tgt);
    assert!((translation_only.a - 1.0).abs() < 1e-9);
    assert!((translation_only.d - 1.0).abs() < 1e-9);
}

#[test]
fn test_validate_alignment_accepts_any_rotation_and_translation() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(14);
    for _ in 0..30 {
        let theta = rng.gen_range(-180.0..180.0);
        assert!(validate_alignment(&AffineMatrix::rotation_deg(theta)));
        let tx = rng.gen_range(-1000.0..1000.0);
        let ty = rng.gen_range(-1000.0..1000.0);
        assert!(validate_alignment(&AffineMatrix::translation(tx, ty)));
    }
}

#[test]
fn test_validate_alignment_rejects_out_of_range_scale_and_reflections() {
    assert!(!validate_alignment(&AffineMatrix::scale(1.5, 1.5)));
    assert!(!validate_alignment(&AffineMatrix::scale(0.5, 0.5)));
    assert!(!validate_alignment(&AffineMatrix::scale(-1.0, 1.0)));
}

#[test]
fn test_score_is_monotone_in_inlier_fraction_at_fixed_distance() {
    let target = vec![Point::new(0.0, 0.0)];
    let one_of_two_inliers = vec![Point::new(0.0, 0.0), Point::new(500.0, 500.0)];
    let two_of_two_inliers = vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)];

    let (score_low, ..) = calculate_inlier_score(&one_of_two_inliers, &target, 10.0);
    let (score_high, ..) = calculate_inlier_score(&two_of_two_inliers, &target, 10.0);
    assert!(score_high > score_low);
}

#[test]
fn test_score_is_monotone_in_negative_average_distance_at_fixed_fraction() {
    let target = vec![Point::new(0.0, 0.0)];
    let close = vec![Point::new(1.0, 0.0)];
    let far = vec![Point::new(9.0, 0.0)];

    let (score_close, ..) = calculate_inlier_score(&close, &target, 10.0);
    let (score_far, ..) = calculate_inlier_score(&far, &target, 10.0);
    assert!(score_close > score_far);
}
