//! Post-ICP hill-climb refinement (spec §4.6 "FineTuneTranslation" /
//! "FineTuneRotation"): small local search steps used by the wall-refinement
//! pass to squeeze out the last millimetres/degrees ICP's correspondence
//! search alone won't recover.

use crate::consts::DIAGONAL_STEP_SCALE;
use crate::geometry::{AffineMatrix, Point};
use crate::scoring::calculate_inlier_score;

/// 8-direction translation search: try `(±step, 0)`, `(0, ±step)`, and the
/// four diagonals (scaled by [`DIAGONAL_STEP_SCALE`]) around `current`,
/// keep the best-scoring nudge, halve `step` when nothing improves. Stops
/// once `step < min_step` or after `max_outer_iterations`.
pub fn fine_tune_translation(
    source: &[Point],
    target: &[Point],
    current: AffineMatrix,
    start_step: f64,
    min_step: f64,
    tolerance: f64,
    max_outer_iterations: usize,
) -> AffineMatrix {
    let mut best = current;
    let mut best_score = score_of(&best, source, target, tolerance);
    let mut step = start_step;

    for _ in 0..max_outer_iterations {
        if step < min_step {
            break;
        }
        let diag = step * DIAGONAL_STEP_SCALE;
        let nudges = [
            (step, 0.0),
            (-step, 0.0),
            (0.0, step),
            (0.0, -step),
            (diag, diag),
            (diag, -diag),
            (-diag, diag),
            (-diag, -diag),
        ];

        let mut improved = false;
        for (dx, dy) in nudges {
            let candidate = AffineMatrix {
                tx: best.tx + dx,
                ty: best.ty + dy,
                ..best
            };
            let candidate_score = score_of(&candidate, source, target, tolerance);
            if candidate_score > best_score {
                best = candidate;
                best_score = candidate_score;
                improved = true;
            }
        }

        if !improved {
            step /= 2.0;
        }
    }

    best
}

/// Sweep rotation angles in `[-range, +range]` by `step` (degrees, about
/// `pivot`) composed onto `current`, keep the best-scoring candidate.
pub fn fine_tune_rotation(
    source: &[Point],
    target: &[Point],
    current: AffineMatrix,
    pivot: Point,
    range_deg: f64,
    step_deg: f64,
    tolerance: f64,
) -> AffineMatrix {
    let mut best = current;
    let mut best_score = score_of(&best, source, target, tolerance);

    let steps = (range_deg / step_deg).round() as i64;
    for i in -steps..=steps {
        let angle = i as f64 * step_deg;
        if angle == 0.0 {
            continue;
        }
        let candidate = AffineMatrix::rotation_around_deg(pivot, angle).compose(&current);
        let candidate_score = score_of(&candidate, source, target, tolerance);
        if candidate_score > best_score {
            best = candidate;
            best_score = candidate_score;
        }
    }

    best
}

fn score_of(matrix: &AffineMatrix, source: &[Point], target: &[Point], tolerance: f64) -> f64 {
    let transformed = matrix.transform_points(source);
    calculate_inlier_score(&transformed, target, tolerance).0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Point> {
        (0..5)
            .flat_map(|x| (0..5).map(move |y| Point::new(x as f64 * 40.0, y as f64 * 40.0)))
            .collect()
    }

    #[test]
    fn translation_hillclimb_reduces_offset() {
        let source = grid();
        let target: Vec<Point> = source.iter().map(|p| Point::new(p.x + 3.0, p.y - 2.0)).collect();
        let off = AffineMatrix {
            tx: -1.0,
            ty: 1.0,
            ..AffineMatrix::identity()
        };
        let refined = fine_tune_translation(&source, &target, off, 2.0, 0.1, 15.0, 30);
        assert!((refined.tx - 3.0).abs() < 1.0);
        assert!((refined.ty + 2.0).abs() < 1.0);
    }

    #[test]
    fn rotation_hillclimb_improves_slightly_misrotated_fit() {
        let source = grid();
        let centroid = crate::geometry::centroid(&source);
        let truth = AffineMatrix::rotation_around_deg(centroid, 1.0);
        let target: Vec<Point> = truth.transform_points(&source);
        let refined = fine_tune_rotation(&source, &target, AffineMatrix::identity(), centroid, 2.0, 0.25, 15.0);
        let baseline_score = score_of(&AffineMatrix::identity(), &source, &target, 15.0);
        let refined_score = score_of(&refined, &source, &target, 15.0);
        assert!(refined_score >= baseline_score);
    }
}
