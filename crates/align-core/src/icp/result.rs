use crate::geometry::AffineMatrix;

/// Outcome of one alignment call. Always well-formed: the engine never
/// errors on geometric degeneracy (spec §7), it reports a low `score`
/// instead and lets the caller decide whether to keep it.
#[derive(Clone, Debug)]
pub struct ICPResult {
    pub transform: AffineMatrix,
    /// Composite score (spec §4.7); `-1.0` for the insufficient-features
    /// sentinel (fewer than 3 feature points on either side).
    pub score: f64,
    pub inlier_fraction: f64,
    pub avg_inlier_distance: f64,
    pub converged: bool,
    pub rotation_deg: f64,
    pub iterations: usize,
}

impl ICPResult {
    pub fn insufficient_features() -> Self {
        Self {
            transform: AffineMatrix::identity(),
            score: -1.0,
            inlier_fraction: 0.0,
            avg_inlier_distance: f64::INFINITY,
            converged: false,
            rotation_deg: 0.0,
            iterations: 0,
        }
    }
}
