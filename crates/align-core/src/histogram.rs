//! Wall-angle histograms (spec §4.4): a coarse, rotation-sensitive
//! fingerprint of a map's wall layer, used as one of the two rotation
//! detection strategies in [`crate::rotation`].
//!
//! Edge orientation is computed over an 8-connected neighbourhood,
//! deliberately distinct from the 4-connected boundary extraction in
//! [`crate::features::boundary`] — see spec §9, second Open Question.

use crate::consts::HISTOGRAM_BIN_COUNT;
use crate::geometry::{normalize_wall_angle_deg, Point};

const EIGHT_NEIGHBORS: [(i64, i64); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// A 180-degree-symmetric histogram of wall-edge orientations, one bin per
/// degree. `bins[k]` holds the normalized mass (sums to 1.0 over a non-empty
/// histogram) for orientations in `[k, k+1)` degrees; `counts` holds the raw
/// per-bin edge tally behind it.
#[derive(Clone, Debug)]
pub struct WallAngleHistogram {
    pub bins: [f64; HISTOGRAM_BIN_COUNT],
    pub counts: [u32; HISTOGRAM_BIN_COUNT],
    pub total_edges: u32,
}

impl WallAngleHistogram {
    fn empty() -> Self {
        Self {
            bins: [0.0; HISTOGRAM_BIN_COUNT],
            counts: [0; HISTOGRAM_BIN_COUNT],
            total_edges: 0,
        }
    }
}

/// Snap `wall_points` to `cell_size` cells and accumulate one edge per
/// 8-connected occupied-neighbour pair, folding each edge's orientation
/// into `[0, 180)` before binning.
pub fn build_wall_histogram(wall_points: &[Point], cell_size: f64) -> WallAngleHistogram {
    if wall_points.is_empty() || cell_size <= 0.0 {
        return WallAngleHistogram::empty();
    }

    use std::collections::BTreeSet;
    let cell_of = |p: Point| -> (i64, i64) {
        ((p.x / cell_size).floor() as i64, (p.y / cell_size).floor() as i64)
    };
    let occupied: BTreeSet<(i64, i64)> = wall_points.iter().map(|&p| cell_of(p)).collect();

    let mut hist = WallAngleHistogram::empty();
    for &(cx, cy) in &occupied {
        for &(dx, dy) in &EIGHT_NEIGHBORS {
            let neighbor = (cx + dx, cy + dy);
            if !occupied.contains(&neighbor) {
                continue;
            }
            // Each unordered edge would otherwise be visited twice (once
            // from each endpoint); only count it from the lexicographically
            // smaller cell to avoid doubling the mass.
            if neighbor < (cx, cy) {
                continue;
            }
            let angle = (dy as f64).atan2(dx as f64).to_degrees();
            let folded = normalize_wall_angle_deg(angle);
            let bin = (folded.floor() as usize).min(HISTOGRAM_BIN_COUNT - 1);
            hist.counts[bin] += 1;
            hist.total_edges += 1;
        }
    }

    if hist.total_edges > 0 {
        let total = hist.total_edges as f64;
        for (bin, &count) in hist.counts.iter().enumerate() {
            hist.bins[bin] = count as f64 / total;
        }
    }
    hist
}

/// The `n` occupied bins with the greatest raw count, as `(angle_deg, mass)`
/// pairs sorted descending by count. Bin `k` is reported at its index `k`
/// degrees. Empty bins (zero count) are skipped rather than padding the
/// result with zero-mass filler entries.
pub fn dominant_angles(histogram: &WallAngleHistogram, n: usize) -> Vec<(f64, f64)> {
    let mut ranked: Vec<(f64, f64, u32)> = histogram
        .bins
        .iter()
        .zip(histogram.counts.iter())
        .enumerate()
        .filter(|(_, (_, &count))| count > 0)
        .map(|(bin, (&mass, &count))| (bin as f64, mass, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2));
    ranked.truncate(n);
    ranked.into_iter().map(|(angle, mass, _)| (angle, mass)).collect()
}

/// Bhattacharyya coefficient between `h1` and `h2` after rotating `h2` by
/// `offset_deg` (folded into the 180-degree-symmetric bin space). `1.0` is a
/// perfect match, `0.0` is disjoint support.
pub fn compare_histograms(h1: &WallAngleHistogram, h2: &WallAngleHistogram, offset_deg: f64) -> f64 {
    if h1.total_edges == 0 || h2.total_edges == 0 {
        return 0.0;
    }
    let shift = {
        let folded = normalize_wall_angle_deg(offset_deg);
        folded.floor() as usize
    };
    let n = HISTOGRAM_BIN_COUNT;
    (0..n)
        .map(|i| {
            let j = (i + shift) % n;
            (h1.bins[i] * h2.bins[j]).sqrt()
        })
        .sum()
}
