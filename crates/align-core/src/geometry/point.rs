use serde::{Deserialize, Serialize};

/// A 2D point in millimetres (post-normalisation, see [`crate::map::normalize`]).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Squared Euclidean distance; avoids the sqrt on hot nearest-neighbour paths.
pub fn distance_sq(a: Point, b: Point) -> f64 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

/// Arithmetic-mean centroid. An empty input returns the origin rather than
/// erroring — see spec §4.1 "Failure model".
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::ORIGIN;
    }
    let n = points.len() as f64;
    let sum = points.iter().fold(Point::ORIGIN, |acc, p| Point {
        x: acc.x + p.x,
        y: acc.y + p.y,
    });
    Point::new(sum.x / n, sum.y / n)
}

/// Fold any real-valued angle (degrees) into `[0, 360)`.
pub fn normalize_angle_deg(angle: f64) -> f64 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Fold a wall-edge angle (degrees) into `[0, 180)`; a wall at theta and
/// theta+180 are the same wall, so edge orientations are 180-symmetric.
pub fn normalize_wall_angle_deg(angle: f64) -> f64 {
    let wrapped = angle % 180.0;
    if wrapped < 0.0 {
        wrapped + 180.0
    } else {
        wrapped
    }
}

/// Nearest point in `candidates` to `target`, by squared distance, along with
/// that squared distance. Returns `None` for an empty candidate set.
pub fn nearest(target: Point, candidates: &[Point]) -> Option<(usize, f64)> {
    candidates
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, distance_sq(target, c)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_of_empty_is_origin() {
        assert_eq!(centroid(&[]), Point::ORIGIN);
    }

    #[test]
    fn centroid_of_square() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        let c = centroid(&pts);
        assert!((c.x - 1.0).abs() < 1e-9);
        assert!((c.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn angle_folds_into_range() {
        assert!((normalize_angle_deg(370.0) - 10.0).abs() < 1e-9);
        assert!((normalize_angle_deg(-10.0) - 350.0).abs() < 1e-9);
        assert!((normalize_wall_angle_deg(190.0) - 10.0).abs() < 1e-9);
    }
}
