//! ICP tuning knobs (spec §4.6). Plain, `Serialize`/`Deserialize` data so a
//! collaborator can load it from its own config layer the way
//! `jupiter-core::pipeline::config::PipelineConfig` is loaded from TOML —
//! this crate just doesn't own that loader.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CONVERGENCE_THRESH_MM, DEFAULT_MAX_CORRESPOND_DIST_MM, DEFAULT_MAX_ITERATIONS,
    DEFAULT_OUTLIER_PERCENTILE, DEFAULT_SAMPLE_POINTS, REFINE_CONVERGENCE_THRESH_MM,
    REFINE_MAX_ITERATIONS,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ICPConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_convergence_thresh_mm")]
    pub convergence_thresh_mm: f64,
    #[serde(default = "default_max_correspond_dist_mm")]
    pub max_correspond_dist_mm: f64,
    #[serde(default = "default_sample_points")]
    pub sample_points: usize,
    #[serde(default = "default_outlier_percentile")]
    pub outlier_percentile: f64,
    #[serde(default = "default_try_rotations")]
    pub try_rotations: bool,
}

fn default_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}
fn default_convergence_thresh_mm() -> f64 {
    DEFAULT_CONVERGENCE_THRESH_MM
}
fn default_max_correspond_dist_mm() -> f64 {
    DEFAULT_MAX_CORRESPOND_DIST_MM
}
fn default_sample_points() -> usize {
    DEFAULT_SAMPLE_POINTS
}
fn default_outlier_percentile() -> f64 {
    DEFAULT_OUTLIER_PERCENTILE
}
fn default_try_rotations() -> bool {
    true
}

impl Default for ICPConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            convergence_thresh_mm: DEFAULT_CONVERGENCE_THRESH_MM,
            max_correspond_dist_mm: DEFAULT_MAX_CORRESPOND_DIST_MM,
            sample_points: DEFAULT_SAMPLE_POINTS,
            outlier_percentile: DEFAULT_OUTLIER_PERCENTILE,
            try_rotations: true,
        }
    }
}

impl ICPConfig {
    /// The config `RefineAlignment` (spec §4.6) runs with: no rotation scan,
    /// more iterations, a tighter convergence threshold.
    pub fn refine_defaults() -> Self {
        Self {
            max_iterations: REFINE_MAX_ITERATIONS,
            convergence_thresh_mm: REFINE_CONVERGENCE_THRESH_MM,
            try_rotations: false,
            ..Self::default()
        }
    }
}
