//! The single-pass ICP loop, its multi-scale wrapper, and the mutual-NN
//! variant (spec §4.6 "Single-pass ICP loop" / "Multi-scale wrapper" /
//! "Mutual-nearest-neighbour ICP").

use tracing::trace;

use crate::consts::{DIVERGENCE_FACTOR, MULTISCALE_PASSES, MUTUAL_NN_MIN_MATCHES};
use crate::geometry::{fit_rigid, AffineMatrix, Point};
use crate::nn::{correspondences_within, mean_nearest_distance, mutual_correspondences};

/// One pass's outcome: the transform reached and whether it converged
/// (rather than stopping early on insufficient correspondences or
/// divergence).
#[derive(Clone, Debug)]
pub struct PassResult {
    pub transform: AffineMatrix,
    pub error: f64,
    pub converged: bool,
    pub iterations: usize,
}

enum Correspondence {
    OneWay,
    MutualNearestNeighbor,
}

/// Run one ICP pass starting from `initial`, using one-way nearest-neighbour
/// correspondences (spec §4.6 "runICP").
pub fn run_icp(
    source: &[Point],
    target: &[Point],
    initial: AffineMatrix,
    max_iterations: usize,
    convergence_thresh: f64,
    max_correspond_dist: f64,
    outlier_percentile: f64,
) -> PassResult {
    run_icp_core(
        source,
        target,
        initial,
        max_iterations,
        convergence_thresh,
        max_correspond_dist,
        outlier_percentile,
        Correspondence::OneWay,
    )
}

/// Same loop, but correspondences must agree in both directions (spec §4.6
/// "runICPWithMutualNN") — suppresses the "everything folds onto the same
/// wall" failure mode in narrow corridors. Falls back to one-way matching
/// internally if fewer than [`MUTUAL_NN_MIN_MATCHES`] mutual pairs are found
/// at a given iteration.
pub fn run_icp_mutual_nn(
    source: &[Point],
    target: &[Point],
    initial: AffineMatrix,
    max_iterations: usize,
    convergence_thresh: f64,
    max_correspond_dist: f64,
    outlier_percentile: f64,
) -> PassResult {
    run_icp_core(
        source,
        target,
        initial,
        max_iterations,
        convergence_thresh,
        max_correspond_dist,
        outlier_percentile,
        Correspondence::MutualNearestNeighbor,
    )
}

fn run_icp_core(
    source: &[Point],
    target: &[Point],
    initial: AffineMatrix,
    max_iterations: usize,
    convergence_thresh: f64,
    max_correspond_dist: f64,
    outlier_percentile: f64,
    correspondence: Correspondence,
) -> PassResult {
    let mut current = initial;
    let mut prev_error = mean_nearest_distance(&current.transform_points(source), target);
    let mut converged = false;
    let mut iterations = 0;

    for iteration in 0..max_iterations {
        iterations = iteration + 1;
        let transformed = current.transform_points(source);

        let mut pairs = match correspondence {
            Correspondence::OneWay => correspondences_within(&transformed, target, max_correspond_dist),
            Correspondence::MutualNearestNeighbor => {
                let mutual = mutual_correspondences(&transformed, target, max_correspond_dist);
                if mutual.len() < MUTUAL_NN_MIN_MATCHES {
                    correspondences_within(&transformed, target, max_correspond_dist)
                } else {
                    mutual
                }
            }
        };

        if pairs.len() < 3 {
            break;
        }

        pairs.sort_by(|a, b| a.2.total_cmp(&b.2));
        let keep = ((pairs.len() as f64 * outlier_percentile).round() as usize).max(3);
        pairs.truncate(keep.min(pairs.len()));

        let trimmed_src: Vec<Point> = pairs.iter().map(|&(i, _, _)| transformed[i]).collect();
        let trimmed_tgt: Vec<Point> = pairs.iter().map(|&(_, j, _)| target[j]).collect();
        let delta = fit_rigid(&trimmed_src, &trimmed_tgt);

        let candidate = delta.compose(&current);
        let current_error = mean_nearest_distance(&candidate.transform_points(source), target);
        trace!(iteration, current_error, prev_error, "icp iteration");

        if prev_error - current_error < convergence_thresh && prev_error - current_error >= 0.0 {
            current = candidate;
            prev_error = current_error;
            converged = true;
            break;
        }
        if current_error > prev_error * DIVERGENCE_FACTOR {
            break;
        }
        current = candidate;
        prev_error = current_error;
    }

    PassResult {
        transform: current,
        error: prev_error,
        converged,
        iterations,
    }
}

/// Run the three nested [`MULTISCALE_PASSES`] in sequence, carrying forward
/// the lowest-error transform seen across all of them (spec §4.6
/// "Multi-scale ICP").
pub fn run_multiscale(source: &[Point], target: &[Point], initial: AffineMatrix, outlier_percentile: f64) -> PassResult {
    run_multiscale_with(source, target, initial, outlier_percentile, run_icp)
}

/// Mutual-NN flavour of [`run_multiscale`], used by the wall-refinement pass.
pub fn run_multiscale_mutual_nn(
    source: &[Point],
    target: &[Point],
    initial: AffineMatrix,
    outlier_percentile: f64,
) -> PassResult {
    run_multiscale_with(source, target, initial, outlier_percentile, run_icp_mutual_nn)
}

fn run_multiscale_with(
    source: &[Point],
    target: &[Point],
    initial: AffineMatrix,
    outlier_percentile: f64,
    pass: impl Fn(&[Point], &[Point], AffineMatrix, usize, f64, f64, f64) -> PassResult,
) -> PassResult {
    let mut best: Option<PassResult> = None;
    let mut current_initial = initial;

    for &(max_correspond_dist, max_iterations, convergence_thresh) in &MULTISCALE_PASSES {
        let result = pass(
            source,
            target,
            current_initial,
            max_iterations,
            convergence_thresh,
            max_correspond_dist,
            outlier_percentile,
        );
        current_initial = result.transform;
        best = Some(match best {
            Some(prev) if prev.error <= result.error => prev,
            _ => result,
        });
    }

    best.unwrap_or(PassResult {
        transform: initial,
        error: f64::INFINITY,
        converged: false,
        iterations: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_points() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
            Point::new(50.0, 50.0),
        ]
    }

    #[test]
    fn converges_on_pure_translation() {
        let source = square_points();
        let target: Vec<Point> = source.iter().map(|p| Point::new(p.x + 30.0, p.y - 10.0)).collect();
        let result = run_icp(&source, &target, AffineMatrix::identity(), 50, 1.0, 1000.0, 1.0);
        assert!((result.transform.tx - 30.0).abs() < 5.0);
        assert!((result.transform.ty + 10.0).abs() < 5.0);
    }

    #[test]
    fn stops_on_insufficient_correspondences() {
        let source = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        let target = vec![Point::new(1000.0, 1000.0)];
        let result = run_icp(&source, &target, AffineMatrix::identity(), 10, 1.0, 5.0, 1.0);
        assert_eq!(result.iterations, 1);
        assert!(!result.converged);
    }

    #[test]
    fn multiscale_does_not_regress_error() {
        let source = square_points();
        let target: Vec<Point> = source.iter().map(|p| Point::new(p.x + 30.0, p.y - 10.0)).collect();
        let single = run_icp(&source, &target, AffineMatrix::identity(), 15, 2.0, 1000.0, 0.8);
        let multi = run_multiscale(&source, &target, AffineMatrix::identity(), 0.8);
        assert!(multi.error <= single.error + 1e-6);
    }
}
