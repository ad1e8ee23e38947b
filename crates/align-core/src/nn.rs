//! Brute-force nearest-neighbour helpers shared by the rotation detector and
//! the ICP engine.
//!
//! Point clouds here are capped at a few hundred to ~1000 points (spec §5),
//! so an O(N*M) scan is cheaper than building and maintaining a spatial
//! index. The scan over `src` is parallelised with `rayon` the way
//! `jupiter-core`'s dispatcher parallelises its own O(N) per-frame work.

use rayon::prelude::*;

use crate::geometry::point::distance_sq;
use crate::geometry::Point;

/// For each point in `src`, the index of its nearest neighbour in `tgt` and
/// the (non-squared) distance to it. `None` entries arise only if `tgt` is
/// empty.
pub fn nearest_neighbors(src: &[Point], tgt: &[Point]) -> Vec<Option<(usize, f64)>> {
    src.par_iter()
        .map(|&p| {
            tgt.iter()
                .enumerate()
                .map(|(j, &c)| (j, distance_sq(p, c)))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(j, d2)| (j, d2.sqrt()))
        })
        .collect()
}

/// Mean nearest-neighbour distance from every point in `src` to `tgt`.
/// Returns `f64::INFINITY` if either cloud is empty.
pub fn mean_nearest_distance(src: &[Point], tgt: &[Point]) -> f64 {
    if src.is_empty() || tgt.is_empty() {
        return f64::INFINITY;
    }
    let total: f64 = nearest_neighbors(src, tgt)
        .into_iter()
        .map(|r| r.map(|(_, d)| d).unwrap_or(f64::INFINITY))
        .sum();
    total / src.len() as f64
}

/// One-way correspondences `(src_index, tgt_index, distance)` for every
/// source point whose nearest target point lies within `max_dist`.
pub fn correspondences_within(
    src: &[Point],
    tgt: &[Point],
    max_dist: f64,
) -> Vec<(usize, usize, f64)> {
    nearest_neighbors(src, tgt)
        .into_iter()
        .enumerate()
        .filter_map(|(i, nn)| {
            nn.and_then(|(j, d)| if d <= max_dist { Some((i, j, d)) } else { None })
        })
        .collect()
}

/// Mutual-nearest-neighbour correspondences: keep `(i, j)` only if `i`'s
/// nearest neighbour in `tgt` is `j` *and* `j`'s nearest neighbour in `src`
/// is `i`, both within `max_dist`.
pub fn mutual_correspondences(
    src: &[Point],
    tgt: &[Point],
    max_dist: f64,
) -> Vec<(usize, usize, f64)> {
    let src_to_tgt = nearest_neighbors(src, tgt);
    let tgt_to_src = nearest_neighbors(tgt, src);

    src_to_tgt
        .into_iter()
        .enumerate()
        .filter_map(|(i, nn)| {
            let (j, d) = nn?;
            if d > max_dist {
                return None;
            }
            let back = tgt_to_src[j]?;
            if back.0 == i {
                Some((i, j, d))
            } else {
                None
            }
        })
        .collect()
}
