//! Least-squares and rigid (Procrustes) transform fitting from ordered
//! point-pair correspondences. See spec §4.1.
//!
//! Every degenerate input (empty, mismatched lengths, colinear points,
//! zero-length vectors, non-positive weight mass) returns the identity
//! transform instead of an error — the ICP engine decides what to do with a
//! degenerate fit based on the resulting score, not on a returned error.

use crate::consts::SINGULAR_DET_EPS;
use crate::geometry::affine::AffineMatrix;
use crate::geometry::point::Point;

/// Fit a transform from `src[i] -> tgt[i]` correspondences.
///
/// - 0 points, or mismatched lengths: identity.
/// - 1 point: translation only.
/// - 2 points: similarity (translation + rotation + uniform scale).
/// - >= 3 points: full affine via normal equations.
pub fn fit_transform(src: &[Point], tgt: &[Point]) -> AffineMatrix {
    if src.len() != tgt.len() || src.is_empty() {
        return AffineMatrix::identity();
    }
    match src.len() {
        1 => AffineMatrix::translation(tgt[0].x - src[0].x, tgt[0].y - src[0].y),
        2 => fit_similarity_2pt(src[0], src[1], tgt[0], tgt[1]),
        _ => fit_affine_least_squares(src, tgt),
    }
}

fn fit_similarity_2pt(s0: Point, s1: Point, t0: Point, t1: Point) -> AffineMatrix {
    let ds = Point::new(s1.x - s0.x, s1.y - s0.y);
    let dt = Point::new(t1.x - t0.x, t1.y - t0.y);
    let denom = ds.x * ds.x + ds.y * ds.y;
    if denom < SINGULAR_DET_EPS {
        return AffineMatrix::identity();
    }
    // Complex division dt / ds, where a point (x, y) is read as x + iy and
    // our matrix convention (x' = a x + b y, y' = c x + d y, b = -c, d = a)
    // matches multiplication by a + ic.
    let a = (dt.x * ds.x + dt.y * ds.y) / denom;
    let c = (dt.y * ds.x - dt.x * ds.y) / denom;
    let b = -c;
    let d = a;
    let tx = t0.x - (a * s0.x + b * s0.y);
    let ty = t0.y - (c * s0.x + d * s0.y);
    AffineMatrix {
        a,
        b,
        tx,
        c,
        d,
        ty,
    }
}

fn fit_affine_least_squares(src: &[Point], tgt: &[Point]) -> AffineMatrix {
    let n = src.len() as f64;
    let (mut sxx, mut sxy, mut sx, mut syy, mut sy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let (mut sx_tx, mut sy_tx, mut s_tx) = (0.0, 0.0, 0.0);
    let (mut sx_ty, mut sy_ty, mut s_ty) = (0.0, 0.0, 0.0);

    for (s, t) in src.iter().zip(tgt.iter()) {
        sxx += s.x * s.x;
        sxy += s.x * s.y;
        sx += s.x;
        syy += s.y * s.y;
        sy += s.y;

        sx_tx += s.x * t.x;
        sy_tx += s.y * t.x;
        s_tx += t.x;

        sx_ty += s.x * t.y;
        sy_ty += s.y * t.y;
        s_ty += t.y;
    }

    let m = [[sxx, sxy, sx], [sxy, syy, sy], [sx, sy, n]];
    let rhs_x = [sx_tx, sy_tx, s_tx];
    let rhs_y = [sx_ty, sy_ty, s_ty];

    let (Some([a, b, tx]), Some([c, d, ty])) = (solve_3x3(m, rhs_x), solve_3x3(m, rhs_y)) else {
        return AffineMatrix::identity();
    };

    AffineMatrix { a, b, tx, c, d, ty }
}

/// Solve a 3x3 linear system via Cramer's rule. `None` if singular.
fn solve_3x3(m: [[f64; 3]; 3], rhs: [f64; 3]) -> Option<[f64; 3]> {
    let det = det3(m);
    if det.abs() < SINGULAR_DET_EPS {
        return None;
    }
    let mut col0 = m;
    col0[0][0] = rhs[0];
    col0[1][0] = rhs[1];
    col0[2][0] = rhs[2];
    let mut col1 = m;
    col1[0][1] = rhs[0];
    col1[1][1] = rhs[1];
    col1[2][1] = rhs[2];
    let mut col2 = m;
    col2[0][2] = rhs[0];
    col2[1][2] = rhs[1];
    col2[2][2] = rhs[2];
    Some([det3(col0) / det, det3(col1) / det, det3(col2) / det])
}

fn det3(m: [[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Unweighted rigid (rotation + translation, unit scale) fit via 2D Procrustes.
pub fn fit_rigid(src: &[Point], tgt: &[Point]) -> AffineMatrix {
    let weights = vec![1.0; src.len()];
    fit_rigid_weighted(src, tgt, &weights)
}

/// Weighted rigid fit. `weights` must be the same length as `src`/`tgt` and
/// positive; a non-positive weight mass degenerates to identity.
///
/// Closed-form 2D Procrustes: `theta = atan2(h21 - h12, h11 + h22)` over the
/// weighted cross-covariance of the centred point sets, then translation is
/// recovered from the (weighted) centroids.
pub fn fit_rigid_weighted(src: &[Point], tgt: &[Point], weights: &[f64]) -> AffineMatrix {
    if src.len() != tgt.len() || src.len() != weights.len() || src.is_empty() {
        return AffineMatrix::identity();
    }
    let weight_mass: f64 = weights.iter().sum();
    if weight_mass <= 0.0 {
        return AffineMatrix::identity();
    }

    let c_src = weighted_centroid(src, weights, weight_mass);
    let c_tgt = weighted_centroid(tgt, weights, weight_mass);

    let (mut h11, mut h12, mut h21, mut h22) = (0.0, 0.0, 0.0, 0.0);
    for ((s, t), &w) in src.iter().zip(tgt.iter()).zip(weights.iter()) {
        let sx = s.x - c_src.x;
        let sy = s.y - c_src.y;
        let tx = t.x - c_tgt.x;
        let ty = t.y - c_tgt.y;
        h11 += w * sx * tx;
        h12 += w * sx * ty;
        h21 += w * sy * tx;
        h22 += w * sy * ty;
    }

    let theta = (h21 - h12).atan2(h11 + h22);
    let rotation = AffineMatrix::rotation_rad(theta);
    let rotated_centroid = rotation.transform_point(c_src);
    AffineMatrix {
        tx: c_tgt.x - rotated_centroid.x,
        ty: c_tgt.y - rotated_centroid.y,
        ..rotation
    }
}

fn weighted_centroid(points: &[Point], weights: &[f64], weight_mass: f64) -> Point {
    let (mut sx, mut sy) = (0.0, 0.0);
    for (p, &w) in points.iter().zip(weights.iter()) {
        sx += w * p.x;
        sy += w * p.y;
    }
    Point::new(sx / weight_mass, sy / weight_mass)
}
