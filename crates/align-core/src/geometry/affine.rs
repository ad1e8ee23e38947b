use serde::{Deserialize, Serialize};

use crate::consts::SINGULAR_DET_EPS;
use crate::geometry::point::Point;

/// `x' = a*x + b*y + tx ; y' = c*x + d*y + ty`.
///
/// Not `Default` — a zeroed matrix collapses every point to `(tx, ty)`,
/// which is never what a caller wants. Use [`AffineMatrix::identity`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffineMatrix {
    pub a: f64,
    pub b: f64,
    pub tx: f64,
    pub c: f64,
    pub d: f64,
    pub ty: f64,
}

impl AffineMatrix {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            tx: 0.0,
            c: 0.0,
            d: 1.0,
            ty: 0.0,
        }
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            tx,
            c: 0.0,
            d: 1.0,
            ty,
        }
    }

    pub fn rotation_rad(theta: f64) -> Self {
        let (s, c) = theta.sin_cos();
        Self {
            a: c,
            b: -s,
            tx: 0.0,
            c: s,
            d: c,
            ty: 0.0,
        }
    }

    pub fn rotation_deg(theta_deg: f64) -> Self {
        Self::rotation_rad(theta_deg.to_radians())
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            tx: 0.0,
            c: 0.0,
            d: sy,
            ty: 0.0,
        }
    }

    /// Rotation by `theta_deg` about the origin, followed by a translation.
    pub fn rotation_translation_deg(theta_deg: f64, tx: f64, ty: f64) -> Self {
        let mut m = Self::rotation_deg(theta_deg);
        m.tx = tx;
        m.ty = ty;
        m
    }

    /// Rotation by `theta_deg` about an arbitrary pivot point.
    pub fn rotation_around_deg(pivot: Point, theta_deg: f64) -> Self {
        let to_origin = Self::translation(-pivot.x, -pivot.y);
        let rot = Self::rotation_deg(theta_deg);
        let back = Self::translation(pivot.x, pivot.y);
        back.compose(&rot).compose(&to_origin)
    }

    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.b * p.y + self.tx,
            self.c * p.x + self.d * p.y + self.ty,
        )
    }

    pub fn transform_points(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|&p| self.transform_point(p)).collect()
    }

    /// Compose two transforms: `self.compose(&other)` applies `other` first.
    pub fn compose(&self, other: &AffineMatrix) -> AffineMatrix {
        AffineMatrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            tx: self.a * other.tx + self.b * other.ty + self.tx,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            ty: self.c * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Returns the identity matrix for a (near-)singular input rather than
    /// erroring — see spec §4.1/§7 "Failure model".
    pub fn inverse(&self) -> AffineMatrix {
        let det = self.determinant();
        if det.abs() < SINGULAR_DET_EPS {
            return AffineMatrix::identity();
        }
        let inv_det = 1.0 / det;
        let ia = self.d * inv_det;
        let ib = -self.b * inv_det;
        let ic = -self.c * inv_det;
        let id = self.a * inv_det;
        AffineMatrix {
            a: ia,
            b: ib,
            tx: -(ia * self.tx + ib * self.ty),
            c: ic,
            d: id,
            ty: -(ic * self.tx + id * self.ty),
        }
    }
}
