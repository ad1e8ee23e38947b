//! Cardinal-rotation detection (spec §4.5): before ICP ever runs, guess
//! which of the four 90-degree rotations best aligns the reference and
//! target maps, so ICP's RANSAC seeding starts from a good rotation instead
//! of hunting for it blind.
//!
//! Two independent strategies are implemented side by side rather than
//! picking one — see spec §9, first Open Question. Callers choose which
//! fits their maps (histogram alone is cheaper; feature-fused is more
//! robust on sparse or asymmetric floor plans).

use crate::consts::{
    ROTATION_DETECTOR_SAMPLE_POINTS, ROTATION_FEATURE_CHARGER_NORMALIZER_MM,
    ROTATION_FEATURE_CHARGER_WEIGHT, ROTATION_FEATURE_DIST_NORMALIZER_MM,
    ROTATION_FEATURE_DIST_WEIGHT,
};
use crate::features::{sample_features, FeatureSet};
use crate::geometry::{distance, AffineMatrix, Point};
use crate::histogram::{build_wall_histogram, compare_histograms, dominant_angles, WallAngleHistogram};
use crate::nn::mean_nearest_distance;

pub const CARDINAL_ROTATIONS_DEG: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Result of scoring the four cardinal rotations against a reference.
#[derive(Clone, Debug)]
pub struct RotationDetection {
    /// Score for each of [`CARDINAL_ROTATIONS_DEG`], same order, higher is better.
    pub scores: [f64; 4],
    pub best_rotation_deg: f64,
    /// `best score - second best score`, normalized by the best score; a
    /// low margin means the rotation is ambiguous (e.g. a square room).
    pub confidence: f64,
    pub dominant_angles: Vec<(f64, f64)>,
}

fn summarize(scores: [f64; 4], dominant_angles: Vec<(f64, f64)>) -> RotationDetection {
    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    let best = ranked[0];
    let second = ranked.get(1).map(|&(_, s)| s).unwrap_or(0.0);
    let confidence = if best.1.abs() > f64::EPSILON {
        (best.1 - second) / best.1
    } else {
        0.0
    };
    RotationDetection {
        scores,
        best_rotation_deg: CARDINAL_ROTATIONS_DEG[best.0],
        confidence: confidence.clamp(0.0, 1.0),
        dominant_angles,
    }
}

/// Strategy A: compare wall-angle histograms under each cardinal rotation
/// offset. Cheap (no correspondence search) and rotation-invariant by
/// construction, but blind to translation and to walls that happen to share
/// the same orientation across a symmetric floor plan.
pub fn detect_rotation_histogram(
    reference_walls: &[Point],
    target_walls: &[Point],
    cell_size: f64,
) -> RotationDetection {
    let reference_hist = build_wall_histogram(reference_walls, cell_size);
    let target_hist = build_wall_histogram(target_walls, cell_size);

    let scores = score_histogram_rotations(&reference_hist, &target_hist);
    let dominants = dominant_angles(&reference_hist, 3);
    summarize(scores, dominants)
}

fn score_histogram_rotations(reference: &WallAngleHistogram, target: &WallAngleHistogram) -> [f64; 4] {
    let mut scores = [0.0; 4];
    for (i, &rot) in CARDINAL_ROTATIONS_DEG.iter().enumerate() {
        scores[i] = compare_histograms(reference, target, rot);
    }
    scores
}

/// Strategy B: for each cardinal rotation, rotate the target's feature cloud
/// about its centroid, rigid-fit it to the reference cloud (via nearest
/// neighbours, not ordered correspondences), and score by a weighted blend
/// of mean inlier distance and charger-anchor agreement (spec §4.5).
pub fn detect_rotation_features(reference: &FeatureSet, target: &FeatureSet) -> RotationDetection {
    let source_cloud = sample_features(reference, ROTATION_DETECTOR_SAMPLE_POINTS);
    let target_cloud = sample_features(target, ROTATION_DETECTOR_SAMPLE_POINTS);

    let mut scores = [0.0; 4];
    for (i, &rot) in CARDINAL_ROTATIONS_DEG.iter().enumerate() {
        scores[i] = score_feature_rotation(reference, target, &source_cloud, &target_cloud, rot);
    }
    let reference_hist = build_wall_histogram(&reference.wall_samples, crate::consts::GRID_SAMPLE_CELL_MM);
    let dominants = dominant_angles(&reference_hist, 3);
    summarize(scores, dominants)
}

/// Rotate `source`'s 300-point feature cloud about its own centroid, then
/// slide that centroid onto `target`'s, and score by mean nearest-neighbour
/// distance plus (if both sides have a charger) how well the charger's
/// offset from its centroid agrees once rotated (spec §4.5). The clouds
/// (`source_cloud`/`target_cloud`) are `sample_features` output, not bare
/// grid points, so wall/corner/boundary cues feed the distance term too.
fn score_feature_rotation(
    source: &FeatureSet,
    target: &FeatureSet,
    source_cloud: &[Point],
    target_cloud: &[Point],
    rotation_deg: f64,
) -> f64 {
    let rotate_in_place = AffineMatrix::rotation_around_deg(source.centroid, rotation_deg);
    let slide = AffineMatrix::translation(target.centroid.x - source.centroid.x, target.centroid.y - source.centroid.y);
    let transform = slide.compose(&rotate_in_place);

    let rotated_cloud = transform.transform_points(source_cloud);
    let mean_dist = mean_nearest_distance(&rotated_cloud, target_cloud);
    let dist_term = if mean_dist.is_finite() {
        ROTATION_FEATURE_DIST_WEIGHT / (1.0 + mean_dist / ROTATION_FEATURE_DIST_NORMALIZER_MM)
    } else {
        0.0
    };

    let charger_term = match (source.charger, target.charger) {
        (Some(src_charger), Some(tgt_charger)) => {
            let src_offset = Point::new(src_charger.x - source.centroid.x, src_charger.y - source.centroid.y);
            let rotated_offset = rotate_vector(src_offset, rotation_deg);
            let tgt_offset = Point::new(tgt_charger.x - target.centroid.x, tgt_charger.y - target.centroid.y);
            let d = distance(rotated_offset, tgt_offset);
            ROTATION_FEATURE_CHARGER_WEIGHT / (1.0 + d / ROTATION_FEATURE_CHARGER_NORMALIZER_MM)
        }
        _ => 0.0,
    };

    dist_term + charger_term
}

fn rotate_vector(v: Point, angle_deg: f64) -> Point {
    AffineMatrix::rotation_deg(angle_deg).transform_point(v)
}
