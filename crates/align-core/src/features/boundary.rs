//! Grid-snapping helpers for boundary extraction and rotation-invariant
//! floor sampling.
//!
//! Boundary extraction is deliberately 4-connected while the wall-angle
//! histogram (`crate::histogram`) is 8-connected — see spec §9, second Open
//! Question. The two must never share a connectivity helper.

use std::collections::BTreeSet;

use crate::geometry::Point;

fn cell_of(p: Point, cell_size: f64) -> (i64, i64) {
    ((p.x / cell_size).floor() as i64, (p.y / cell_size).floor() as i64)
}

fn cell_center(cell: (i64, i64), cell_size: f64) -> Point {
    Point::new(
        (cell.0 as f64 + 0.5) * cell_size,
        (cell.1 as f64 + 0.5) * cell_size,
    )
}

const FOUR_NEIGHBORS: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Snap `points` to `cell_size` cells and return the centres of cells that
/// have at least one unoccupied 4-connected neighbour.
pub fn boundary_points(points: &[Point], cell_size: f64) -> Vec<Point> {
    if cell_size <= 0.0 {
        return Vec::new();
    }
    let occupied: BTreeSet<(i64, i64)> = points.iter().map(|&p| cell_of(p, cell_size)).collect();

    occupied
        .iter()
        .filter(|&&(cx, cy)| {
            FOUR_NEIGHBORS
                .iter()
                .any(|(dx, dy)| !occupied.contains(&(cx + dx, cy + dy)))
        })
        .map(|&cell| cell_center(cell, cell_size))
        .collect()
}

/// Bin `points` into `cell_size` cells and emit one representative (the cell
/// centre) per occupied cell — rotation-invariant, coverage-density-invariant
/// sampling (spec §4.3 "Grid sampling").
pub fn grid_sample(points: &[Point], cell_size: f64) -> Vec<Point> {
    if cell_size <= 0.0 {
        return Vec::new();
    }
    let occupied: BTreeSet<(i64, i64)> = points.iter().map(|&p| cell_of(p, cell_size)).collect();
    occupied.into_iter().map(|c| cell_center(c, cell_size)).collect()
}
