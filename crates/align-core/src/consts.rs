//! Dimensional constants used throughout the alignment pipeline.
//!
//! Everything here is in millimetres (post §4.2 normalisation) or degrees,
//! never pixels — see spec §9 "Coordinate units".

/// Determinant magnitude below which a matrix is treated as singular.
pub const SINGULAR_DET_EPS: f64 = 1e-10;

/// Interior-angle threshold (degrees) below which a boundary vertex is a corner.
/// `180 - 60`: a turn sharper than 60 degrees.
pub const CORNER_ANGLE_THRESHOLD_DEG: f64 = 120.0;

/// Segment length (mm) below which corner detection skips a vertex as degenerate.
pub const MIN_SEGMENT_LENGTH_MM: f64 = 1e-10;

/// Cap on raw wall-layer samples kept per feature set.
pub const MAX_WALL_SAMPLES: usize = 500;

/// Side length (mm) of the grid used for rotation-invariant floor sampling.
pub const GRID_SAMPLE_CELL_MM: f64 = 250.0;

/// Default cap on the main-pass ICP feature cloud (`ICPConfig::sample_points`).
pub const DEFAULT_SAMPLE_POINTS: usize = 300;

/// Default ICP outer-loop iteration cap.
pub const DEFAULT_MAX_ITERATIONS: usize = 50;

/// Default mean-error convergence threshold (mm) for a single ICP pass.
pub const DEFAULT_CONVERGENCE_THRESH_MM: f64 = 1.0;

/// Default correspondence search radius (mm) for the outermost ICP scale.
pub const DEFAULT_MAX_CORRESPOND_DIST_MM: f64 = 1000.0;

/// Default fraction of correspondences kept after outlier trimming.
pub const DEFAULT_OUTLIER_PERCENTILE: f64 = 0.8;

/// Divergence guard factor: abort a pass if error grows past this multiple
/// of the previous iteration's error.
pub const DIVERGENCE_FACTOR: f64 = 1.1;

/// Number of RANSAC-style translation candidates proposed per rotation trial.
pub const RANSAC_CANDIDATE_COUNT: usize = 400;

/// Subsample size used to score each RANSAC translation candidate.
pub const RANSAC_EVAL_SUBSAMPLE: usize = 100;

/// Squared-distance threshold (mm^2) for a RANSAC candidate match (50 mm).
pub const RANSAC_MATCH_SQ_DIST_MM2: f64 = 2500.0;

/// Minimum matches a RANSAC candidate needs before it is scored normally.
pub const RANSAC_MIN_MATCHES: usize = 10;

/// Flat penalty added to under-matched RANSAC candidates.
pub const RANSAC_UNDERMATCH_PENALTY: f64 = 100_000.0;

/// Per-match size bonus subtracted from a RANSAC candidate's cost.
pub const RANSAC_SIZE_BONUS_PER_MATCH: f64 = 0.1;

/// The three nested multi-scale ICP passes: (correspondence radius mm,
/// max iterations, convergence threshold mm).
pub const MULTISCALE_PASSES: [(f64, usize, f64); 3] = [
    (DEFAULT_MAX_CORRESPOND_DIST_MM, 15, 2.0),
    (DEFAULT_MAX_CORRESPOND_DIST_MM / 2.0, 15, 1.0),
    (DEFAULT_MAX_CORRESPOND_DIST_MM / 4.0, 20, 0.5),
];

/// Composite-score floor (at 50 mm tolerance) required to attempt wall refinement.
pub const WALL_REFINEMENT_SCORE_THRESHOLD: f64 = 0.05;

/// Cap on wall samples resampled per side for the refinement pass.
pub const WALL_REFINEMENT_MAX_SAMPLES: usize = 1000;

pub const WALL_REFINEMENT_MAX_ITERATIONS: usize = 50;
pub const WALL_REFINEMENT_CONVERGENCE_THRESH_MM: f64 = 0.5;
pub const WALL_REFINEMENT_MAX_CORRESPOND_DIST_MM: f64 = 200.0;

/// Minimum mutual-NN matches before mutual-NN ICP falls back to one-way.
pub const MUTUAL_NN_MIN_MATCHES: usize = 10;

/// Coarse inlier-score tolerance (mm) used to rank the four rotation trials.
pub const COARSE_SCORE_TOLERANCE_MM: f64 = 50.0;

/// Inlier-score tolerance (mm) used as the hill-climb objective.
pub const HILLCLIMB_SCORE_TOLERANCE_MM: f64 = 15.0;

/// Normaliser (mm) for the average-inlier-distance term of the composite score.
pub const SCORE_DISTANCE_NORMALIZER_MM: f64 = 100.0;

/// First rotation hill-climb sweep: +/- range and step, in degrees.
pub const ROTATION_HILLCLIMB_1_RANGE_DEG: f64 = 2.0;
pub const ROTATION_HILLCLIMB_1_STEP_DEG: f64 = 0.25;

/// Second, finer rotation hill-climb sweep.
pub const ROTATION_HILLCLIMB_2_RANGE_DEG: f64 = 1.0;
pub const ROTATION_HILLCLIMB_2_STEP_DEG: f64 = 0.1;

/// First translation hill-climb: starting step (mm), minimum step (mm) at
/// which the search stops, and the cap on outer iterations.
pub const TRANSLATION_HILLCLIMB_1_START_STEP_MM: f64 = 2.0;
pub const TRANSLATION_HILLCLIMB_1_MIN_STEP_MM: f64 = 0.25;

/// Second, finer translation hill-climb.
pub const TRANSLATION_HILLCLIMB_2_START_STEP_MM: f64 = 0.5;
pub const TRANSLATION_HILLCLIMB_2_MIN_STEP_MM: f64 = 0.1;

pub const TRANSLATION_HILLCLIMB_MAX_OUTER_ITERATIONS: usize = 30;

/// Diagonal nudge scale in the 8-direction translation hill-climb (1/sqrt(2)).
pub const DIAGONAL_STEP_SCALE: f64 = std::f64::consts::FRAC_1_SQRT_2;

/// `RefineAlignment` overrides on top of the `ICPConfig` defaults above.
pub const REFINE_MAX_ITERATIONS: usize = 100;
pub const REFINE_CONVERGENCE_THRESH_MM: f64 = 0.1;

/// Feature-cloud score weights and normalisers used by the feature-fused
/// rotation detector (spec §4.5).
pub const ROTATION_FEATURE_DIST_WEIGHT: f64 = 0.7;
pub const ROTATION_FEATURE_DIST_NORMALIZER_MM: f64 = 2500.0;
pub const ROTATION_FEATURE_CHARGER_WEIGHT: f64 = 0.3;
pub const ROTATION_FEATURE_CHARGER_NORMALIZER_MM: f64 = 1000.0;

/// `SampleFeatures` point budget for the rotation detector's feature clouds.
pub const ROTATION_DETECTOR_SAMPLE_POINTS: usize = 300;

/// Number of 1-degree histogram bins folded over a 180-degree symmetric range.
pub const HISTOGRAM_BIN_COUNT: usize = 180;

/// Scale bounds a rigid transform's axes must fall within to validate (spec §4.7).
pub const VALID_SCALE_RANGE: (f64, f64) = (0.8, 1.2);

/// Fraction of the last-calibration map area below which a vacuum's map is
/// considered stale enough to justify recalibration (spec §4.9).
pub const RECALIBRATION_AREA_RATIO: f64 = 0.8;

/// Minimum matches kept for a corner-detection sweep, and similar small caps.
pub const SAMPLE_FEATURES_MAX_CORNERS: usize = 50;
