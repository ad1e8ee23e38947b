//! Robust translation seeding (spec §4.6 step 1): the one stochastic step in
//! the whole pipeline. Proposes candidate translations from random point
//! pairs and keeps the one with the lowest RANSAC-style cost.

use rand::Rng;

use crate::consts::{
    RANSAC_CANDIDATE_COUNT, RANSAC_EVAL_SUBSAMPLE, RANSAC_MATCH_SQ_DIST_MM2, RANSAC_MIN_MATCHES,
    RANSAC_SIZE_BONUS_PER_MATCH, RANSAC_UNDERMATCH_PENALTY,
};
use crate::geometry::point::distance_sq;
use crate::geometry::{AffineMatrix, Point};
use crate::sampling::stride_cap;

/// Seed an initial transform for `rotated_source -> target`: `rotation`
/// fixes the orientation, and this picks the best of
/// [`RANSAC_CANDIDATE_COUNT`] candidate translations (plus a
/// centroid-alignment candidate) by matching a subsample of the rotated
/// source against `target`.
pub fn seed_translation(
    source: &[Point],
    target: &[Point],
    rotation: AffineMatrix,
    rng: &mut impl Rng,
) -> AffineMatrix {
    let rotated_source = rotation.transform_points(source);
    if rotated_source.is_empty() || target.is_empty() {
        return rotation;
    }

    let eval_source = stride_cap(&rotated_source, RANSAC_EVAL_SUBSAMPLE);

    let mut candidates: Vec<(f64, f64)> = Vec::with_capacity(RANSAC_CANDIDATE_COUNT + 1);
    let source_centroid = crate::geometry::centroid(&rotated_source);
    let target_centroid = crate::geometry::centroid(target);
    candidates.push((
        target_centroid.x - source_centroid.x,
        target_centroid.y - source_centroid.y,
    ));

    for _ in 0..RANSAC_CANDIDATE_COUNT {
        let s = rotated_source[rng.gen_range(0..rotated_source.len())];
        let t = target[rng.gen_range(0..target.len())];
        candidates.push((t.x - s.x, t.y - s.y));
    }

    let best = candidates
        .into_iter()
        .map(|(tx, ty)| (tx, ty, candidate_cost(&eval_source, target, tx, ty)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .expect("candidates is never empty");

    AffineMatrix {
        tx: rotation.tx + best.0,
        ty: rotation.ty + best.1,
        ..rotation
    }
}

fn candidate_cost(eval_source: &[Point], target: &[Point], tx: f64, ty: f64) -> f64 {
    let mut total_dist = 0.0;
    let mut matches = 0usize;
    for &p in eval_source {
        let shifted = Point::new(p.x + tx, p.y + ty);
        let nearest_sq = target
            .iter()
            .map(|&t| distance_sq(shifted, t))
            .fold(f64::INFINITY, f64::min);
        if nearest_sq <= RANSAC_MATCH_SQ_DIST_MM2 {
            total_dist += nearest_sq.sqrt();
            matches += 1;
        }
    }

    if matches < RANSAC_MIN_MATCHES {
        return RANSAC_UNDERMATCH_PENALTY;
    }
    total_dist / matches as f64 - RANSAC_SIZE_BONUS_PER_MATCH * matches as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn seeds_toward_true_translation() {
        let source: Vec<Point> = (0..30)
            .map(|i| Point::new((i % 6) as f64 * 100.0, (i / 6) as f64 * 100.0))
            .collect();
        let target: Vec<Point> = source.iter().map(|p| Point::new(p.x + 120.0, p.y - 40.0)).collect();

        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let seeded = seed_translation(&source, &target, AffineMatrix::identity(), &mut rng);
        assert!((seeded.tx - 120.0).abs() < 20.0);
        assert!((seeded.ty + 40.0).abs() < 20.0);
    }

    #[test]
    fn empty_source_returns_rotation_unchanged() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let rotation = AffineMatrix::rotation_deg(45.0);
        let seeded = seed_translation(&[], &[Point::ORIGIN], rotation, &mut rng);
        assert_eq!(seeded, rotation);
    }
}
