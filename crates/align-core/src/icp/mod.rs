//! The ICP engine (spec §4.6): RANSAC-seeded, multi-scale, rotation-scanning
//! point-cloud alignment, topped with a wall-refinement hill-climb pass.

pub mod config;
pub mod hillclimb;
pub mod passes;
pub mod result;
pub mod seeding;

use rand::Rng;
use tracing::{debug, info};

pub use config::ICPConfig;
pub use result::ICPResult;

use crate::consts::{
    COARSE_SCORE_TOLERANCE_MM, HILLCLIMB_SCORE_TOLERANCE_MM, ROTATION_HILLCLIMB_1_RANGE_DEG,
    ROTATION_HILLCLIMB_1_STEP_DEG, ROTATION_HILLCLIMB_2_RANGE_DEG, ROTATION_HILLCLIMB_2_STEP_DEG,
    TRANSLATION_HILLCLIMB_1_START_STEP_MM, TRANSLATION_HILLCLIMB_1_MIN_STEP_MM,
    TRANSLATION_HILLCLIMB_2_START_STEP_MM, TRANSLATION_HILLCLIMB_2_MIN_STEP_MM,
    TRANSLATION_HILLCLIMB_MAX_OUTER_ITERATIONS, WALL_REFINEMENT_CONVERGENCE_THRESH_MM,
    WALL_REFINEMENT_MAX_CORRESPOND_DIST_MM, WALL_REFINEMENT_MAX_ITERATIONS,
    WALL_REFINEMENT_MAX_SAMPLES, WALL_REFINEMENT_SCORE_THRESHOLD,
};
use crate::error::Result;
use crate::features::{self, sample_features, FeatureSet};
use crate::geometry::{centroid, AffineMatrix, Point};
use crate::map::Map;
use crate::rotation::CARDINAL_ROTATIONS_DEG;
use crate::sampling::stride_cap;
use crate::scoring::calculate_inlier_score;

/// Extract + sample both maps' feature clouds to `cfg.sample_points`.
/// `Err` only if a map has zero layers and zero entities.
fn prepare_clouds(source: &Map, target: &Map, sample_points: usize) -> Result<(FeatureSet, FeatureSet, Vec<Point>, Vec<Point>)> {
    let source_features = features::extract_features(source)?;
    let target_features = features::extract_features(target)?;
    let source_cloud = sample_features(&source_features, sample_points);
    let target_cloud = sample_features(&target_features, sample_points);
    Ok((source_features, target_features, source_cloud, target_cloud))
}

/// **AlignMaps.** Scans all four cardinal rotations (or just 0 deg if
/// `cfg.try_rotations` is false), keeps the best-scoring seed, multi-scale
/// ICP-refines it, then (if the score clears [`WALL_REFINEMENT_SCORE_THRESHOLD`])
/// runs the wall-refinement hill-climb pass.
pub fn align_maps(source: &Map, target: &Map, cfg: &ICPConfig, rng: &mut impl Rng) -> Result<ICPResult> {
    let (source_features, target_features, source_cloud, target_cloud) =
        prepare_clouds(source, target, cfg.sample_points)?;

    info!(
        source_points = source_cloud.len(),
        target_points = target_cloud.len(),
        "align_maps: sampled feature clouds"
    );

    if source_cloud.len() < 3 || target_cloud.len() < 3 {
        return Ok(ICPResult::insufficient_features());
    }

    let rotations: &[f64] = if cfg.try_rotations {
        &CARDINAL_ROTATIONS_DEG
    } else {
        &CARDINAL_ROTATIONS_DEG[..1]
    };

    let mut best: Option<(f64, ICPResult)> = None;
    for &rotation_deg in rotations {
        let rotation = AffineMatrix::rotation_around_deg(centroid(&source_cloud), rotation_deg);
        let seeded = seeding::seed_translation(&source_cloud, &target_cloud, rotation, rng);
        let pass = passes::run_multiscale(&source_cloud, &target_cloud, seeded, cfg.outlier_percentile);

        let transformed = pass.transform.transform_points(&source_cloud);
        let (score, inlier_fraction, avg_inlier_distance) =
            calculate_inlier_score(&transformed, &target_cloud, COARSE_SCORE_TOLERANCE_MM);
        debug!(rotation_deg, score, "align_maps: rotation trial scored");

        let candidate = ICPResult {
            transform: pass.transform,
            score,
            inlier_fraction,
            avg_inlier_distance,
            converged: pass.converged,
            rotation_deg,
            iterations: pass.iterations,
        };

        best = Some(match best {
            Some((best_score, best_result)) if best_score >= score => (best_score, best_result),
            _ => (score, candidate),
        });
    }

    let (_, mut result) = best.expect("rotations is never empty");
    info!(
        winning_rotation_deg = result.rotation_deg,
        score = result.score,
        "align_maps: best rotation selected"
    );

    if result.score > WALL_REFINEMENT_SCORE_THRESHOLD {
        result = refine_with_walls(source, target, &source_cloud, &target_cloud, result, cfg.outlier_percentile);
    }

    Ok(result)
}

/// **AlignMapsWithRotationHint.** Skips the 4-rotation scan, seeding
/// directly at `hint_deg`. Otherwise identical to [`align_maps`], including
/// the insufficient-features sentinel and wall refinement.
pub fn align_maps_with_rotation_hint(
    source: &Map,
    target: &Map,
    cfg: &ICPConfig,
    hint_deg: f64,
    rng: &mut impl Rng,
) -> Result<ICPResult> {
    let (_, _, source_cloud, target_cloud) = prepare_clouds(source, target, cfg.sample_points)?;

    info!(hint_deg, "align_maps_with_rotation_hint: seeding with hint");

    if source_cloud.len() < 3 || target_cloud.len() < 3 {
        return Ok(ICPResult::insufficient_features());
    }

    let rotation = AffineMatrix::rotation_around_deg(centroid(&source_cloud), hint_deg);
    let seeded = seeding::seed_translation(&source_cloud, &target_cloud, rotation, rng);

    let pass = passes::run_multiscale(&source_cloud, &target_cloud, seeded, cfg.outlier_percentile);
    let transformed = pass.transform.transform_points(&source_cloud);
    let (score, inlier_fraction, avg_inlier_distance) =
        calculate_inlier_score(&transformed, &target_cloud, COARSE_SCORE_TOLERANCE_MM);

    let mut result = ICPResult {
        transform: pass.transform,
        score,
        inlier_fraction,
        avg_inlier_distance,
        converged: pass.converged,
        rotation_deg: hint_deg,
        iterations: pass.iterations,
    };

    if result.score > WALL_REFINEMENT_SCORE_THRESHOLD {
        result = refine_with_walls(source, target, &source_cloud, &target_cloud, result, cfg.outlier_percentile);
    }

    Ok(result)
}

/// **RefineAlignment.** Touch-up pass for manual calibration: no rotation
/// scan, starts from a caller-supplied transform, uses
/// [`ICPConfig::refine_defaults`] (more iterations, tighter convergence).
pub fn refine_alignment(source: &Map, target: &Map, initial: AffineMatrix) -> Result<ICPResult> {
    let cfg = ICPConfig::refine_defaults();
    let (_, _, source_cloud, target_cloud) = prepare_clouds(source, target, cfg.sample_points)?;

    if source_cloud.len() < 3 || target_cloud.len() < 3 {
        return Ok(ICPResult::insufficient_features());
    }

    let pass = passes::run_icp(
        &source_cloud,
        &target_cloud,
        initial,
        cfg.max_iterations,
        cfg.convergence_thresh_mm,
        cfg.max_correspond_dist_mm,
        cfg.outlier_percentile,
    );
    let transformed = pass.transform.transform_points(&source_cloud);
    let (score, inlier_fraction, avg_inlier_distance) =
        calculate_inlier_score(&transformed, &target_cloud, COARSE_SCORE_TOLERANCE_MM);

    Ok(ICPResult {
        transform: pass.transform,
        score,
        inlier_fraction,
        avg_inlier_distance,
        converged: pass.converged,
        rotation_deg: 0.0,
        iterations: pass.iterations,
    })
}

/// **QuickAlign.** No ICP refinement at all: just the 4-rotation RANSAC
/// seeding, keeping whichever seed has the lowest mean nearest-neighbour
/// distance. Used where a coarse, cheap estimate is enough.
pub fn quick_align(source: &Map, target: &Map, cfg: &ICPConfig, rng: &mut impl Rng) -> Result<ICPResult> {
    let (_, _, source_cloud, target_cloud) = prepare_clouds(source, target, cfg.sample_points)?;

    if source_cloud.len() < 3 || target_cloud.len() < 3 {
        return Ok(ICPResult::insufficient_features());
    }

    let mut best: Option<(f64, AffineMatrix)> = None;
    for &rotation_deg in &CARDINAL_ROTATIONS_DEG {
        let rotation = AffineMatrix::rotation_around_deg(centroid(&source_cloud), rotation_deg);
        let seeded = seeding::seed_translation(&source_cloud, &target_cloud, rotation, rng);
        let transformed = seeded.transform_points(&source_cloud);
        let mean_dist = crate::nn::mean_nearest_distance(&transformed, &target_cloud);
        best = Some(match best {
            Some((best_dist, best_transform)) if best_dist <= mean_dist => (best_dist, best_transform),
            _ => (mean_dist, seeded),
        });
    }

    let (_, transform) = best.expect("rotations is never empty");
    let transformed = transform.transform_points(&source_cloud);
    let (score, inlier_fraction, avg_inlier_distance) =
        calculate_inlier_score(&transformed, &target_cloud, COARSE_SCORE_TOLERANCE_MM);

    Ok(ICPResult {
        transform,
        score,
        inlier_fraction,
        avg_inlier_distance,
        converged: false,
        rotation_deg: 0.0,
        iterations: 0,
    })
}

/// Wall-refinement pass (spec §4.6 "Wall-refinement pass"): mutual-NN ICP on
/// resampled wall points, then two rounds of alternating rotation/translation
/// hill-climb, then a final composite score on the full sampled clouds.
fn refine_with_walls(
    source: &Map,
    target: &Map,
    source_cloud: &[Point],
    target_cloud: &[Point],
    coarse: ICPResult,
    outlier_percentile: f64,
) -> ICPResult {
    let source_walls = stride_cap(&features::raw_wall_points(source), WALL_REFINEMENT_MAX_SAMPLES);
    let target_walls = stride_cap(&features::raw_wall_points(target), WALL_REFINEMENT_MAX_SAMPLES);

    let wall_pass = passes::run_icp_mutual_nn(
        &source_walls,
        &target_walls,
        coarse.transform,
        WALL_REFINEMENT_MAX_ITERATIONS,
        WALL_REFINEMENT_CONVERGENCE_THRESH_MM,
        WALL_REFINEMENT_MAX_CORRESPOND_DIST_MM,
        outlier_percentile,
    );

    let target_centroid = centroid(target_cloud);
    let mut transform = wall_pass.transform;

    transform = hillclimb::fine_tune_rotation(
        source_cloud,
        target_cloud,
        transform,
        target_centroid,
        ROTATION_HILLCLIMB_1_RANGE_DEG,
        ROTATION_HILLCLIMB_1_STEP_DEG,
        HILLCLIMB_SCORE_TOLERANCE_MM,
    );
    transform = hillclimb::fine_tune_translation(
        source_cloud,
        target_cloud,
        transform,
        TRANSLATION_HILLCLIMB_1_START_STEP_MM,
        TRANSLATION_HILLCLIMB_1_MIN_STEP_MM,
        HILLCLIMB_SCORE_TOLERANCE_MM,
        TRANSLATION_HILLCLIMB_MAX_OUTER_ITERATIONS,
    );
    transform = hillclimb::fine_tune_rotation(
        source_cloud,
        target_cloud,
        transform,
        target_centroid,
        ROTATION_HILLCLIMB_2_RANGE_DEG,
        ROTATION_HILLCLIMB_2_STEP_DEG,
        HILLCLIMB_SCORE_TOLERANCE_MM,
    );
    transform = hillclimb::fine_tune_translation(
        source_cloud,
        target_cloud,
        transform,
        TRANSLATION_HILLCLIMB_2_START_STEP_MM,
        TRANSLATION_HILLCLIMB_2_MIN_STEP_MM,
        HILLCLIMB_SCORE_TOLERANCE_MM,
        TRANSLATION_HILLCLIMB_MAX_OUTER_ITERATIONS,
    );

    let transformed = transform.transform_points(source_cloud);
    let (score, inlier_fraction, avg_inlier_distance) =
        calculate_inlier_score(&transformed, target_cloud, COARSE_SCORE_TOLERANCE_MM);

    ICPResult {
        transform,
        score,
        inlier_fraction,
        avg_inlier_distance,
        converged: coarse.converged,
        rotation_deg: coarse.rotation_deg,
        iterations: coarse.iterations + wall_pass.iterations,
    }
}
