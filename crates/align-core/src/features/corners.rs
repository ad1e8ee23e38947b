//! Corner extraction from an ordered boundary ring (spec §4.3).

use crate::consts::{CORNER_ANGLE_THRESHOLD_DEG, MIN_SEGMENT_LENGTH_MM};
use crate::geometry::Point;

/// Order `boundary` by angle around `center` (a single monotonic sweep),
/// then emit the points whose interior turning angle is sharper than
/// [`CORNER_ANGLE_THRESHOLD_DEG`]. Points with a degenerate (near-zero
/// length) incident segment are skipped rather than treated as corners.
pub fn extract_corners(boundary: &[Point], center: Point) -> Vec<Point> {
    if boundary.len() < 3 {
        return Vec::new();
    }

    let mut ordered: Vec<Point> = boundary.to_vec();
    ordered.sort_by(|a, b| {
        let angle_a = (a.y - center.y).atan2(a.x - center.x);
        let angle_b = (b.y - center.y).atan2(b.x - center.x);
        angle_a.total_cmp(&angle_b)
    });

    let n = ordered.len();
    let mut corners = Vec::new();

    for i in 0..n {
        let prev = ordered[(i + n - 1) % n];
        let curr = ordered[i];
        let next = ordered[(i + 1) % n];

        let a = Point::new(prev.x - curr.x, prev.y - curr.y);
        let b = Point::new(next.x - curr.x, next.y - curr.y);
        let len_a = (a.x * a.x + a.y * a.y).sqrt();
        let len_b = (b.x * b.x + b.y * b.y).sqrt();
        if len_a < MIN_SEGMENT_LENGTH_MM || len_b < MIN_SEGMENT_LENGTH_MM {
            continue;
        }

        let dot = (a.x * b.x + a.y * b.y) / (len_a * len_b);
        let interior_deg = dot.clamp(-1.0, 1.0).acos().to_degrees();
        if interior_deg < CORNER_ANGLE_THRESHOLD_DEG {
            corners.push(curr);
        }
    }

    corners
}
