//! Alignment scoring and validation (spec §4.7).

use crate::consts::VALID_SCALE_RANGE;
use crate::geometry::{AffineMatrix, Point};
use crate::nn::nearest_neighbors;

/// Composite inlier score for `src` transformed against `tgt`.
///
/// `score = inlier_fraction / (1 + avg_inlier_distance / 100)`, which rewards
/// both covering more of the cloud within tolerance and doing so tightly.
/// Returns `(0.0, 0.0, f64::INFINITY)` if `src` or `tgt` is empty, or if no
/// source point has a within-tolerance match.
pub fn calculate_inlier_score(src: &[Point], tgt: &[Point], tolerance: f64) -> (f64, f64, f64) {
    if src.is_empty() || tgt.is_empty() {
        return (0.0, 0.0, f64::INFINITY);
    }
    let neighbors = nearest_neighbors(src, tgt);
    let inlier_distances: Vec<f64> = neighbors
        .into_iter()
        .filter_map(|nn| nn.map(|(_, d)| d))
        .filter(|&d| d <= tolerance)
        .collect();

    if inlier_distances.is_empty() {
        return (0.0, 0.0, f64::INFINITY);
    }

    let inlier_fraction = inlier_distances.len() as f64 / src.len() as f64;
    let avg_inlier_distance = inlier_distances.iter().sum::<f64>() / inlier_distances.len() as f64;
    let score = inlier_fraction / (1.0 + avg_inlier_distance / 100.0);
    (score, inlier_fraction, avg_inlier_distance)
}

/// `score` variant over already-transformed source points, for callers that
/// have already applied the candidate transform (avoids recomputing it).
pub fn calculate_inlier_score_transformed(
    matrix: &AffineMatrix,
    src: &[Point],
    tgt: &[Point],
    tolerance: f64,
) -> (f64, f64, f64) {
    let transformed = matrix.transform_points(src);
    calculate_inlier_score(&transformed, tgt, tolerance)
}

/// `true` iff both axis scales fall within [`VALID_SCALE_RANGE`] and the
/// transform is not a reflection (non-negative determinant).
pub fn validate_alignment(matrix: &AffineMatrix) -> bool {
    let scale_x = (matrix.a * matrix.a + matrix.c * matrix.c).sqrt();
    let scale_y = (matrix.b * matrix.b + matrix.d * matrix.d).sqrt();
    let (lo, hi) = VALID_SCALE_RANGE;
    scale_x >= lo && scale_x <= hi && scale_y >= lo && scale_y <= hi && matrix.determinant() >= 0.0
}

/// Convenience used only by tests/callers that want a raw distance rather
/// than a score; kept here since it shares the tolerance-threshold framing.
pub fn mean_inlier_distance(src: &[Point], tgt: &[Point], tolerance: f64) -> f64 {
    calculate_inlier_score(src, tgt, tolerance).2
}
