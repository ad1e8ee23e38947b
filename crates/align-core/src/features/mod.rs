//! Feature extraction (spec §4.3): turns a normalized [`crate::map::Map`]
//! into the [`FeatureSet`] the rotation detector and ICP engine match on.

pub mod boundary;
pub mod corners;

use crate::consts::{
    GRID_SAMPLE_CELL_MM, MAX_WALL_SAMPLES, SAMPLE_FEATURES_MAX_CORNERS,
};
use crate::error::{AlignError, Result};
use crate::geometry::{centroid, Point};
use crate::map::{pairs_to_points, EntityType, LayerType, Map};
use crate::sampling::stride_cap;

#[derive(Clone, Copy, Debug)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    fn of(points: &[Point]) -> Self {
        if points.is_empty() {
            return Self {
                min: Point::ORIGIN,
                max: Point::ORIGIN,
            };
        }
        let mut min = points[0];
        let mut max = points[0];
        for &p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }
}

/// Derived, per-alignment-call feature cloud. All fields are in millimetres.
#[derive(Clone, Debug)]
pub struct FeatureSet {
    pub boundary_points: Vec<Point>,
    pub corner_points: Vec<Point>,
    pub wall_samples: Vec<Point>,
    pub grid_points: Vec<Point>,
    /// `None` doubles as the spec's `hasCharger = false`.
    pub charger: Option<Point>,
    pub centroid: Point,
    pub bbox: BoundingBox,
}

/// Extract the feature set from a normalized map.
///
/// Returns [`AlignError::EmptyMap`] if the map has neither layers nor
/// entities — there is nothing to extract, and silently returning an empty
/// `FeatureSet` would hide a caller-side bug (spec §7, ADDED).
pub fn extract_features(map: &Map) -> Result<FeatureSet> {
    if map.is_empty() {
        return Err(AlignError::EmptyMap);
    }

    let floor_points = floor_source_points(map);
    let bbox = BoundingBox::of(&floor_points);
    let floor_centroid = centroid(&floor_points);

    let wall_points = raw_wall_points(map);
    let wall_samples = stride_cap(&wall_points, MAX_WALL_SAMPLES);

    let boundary_points = boundary::boundary_points(&floor_points, map.pixel_size);
    let corner_points = corners::extract_corners(&boundary_points, floor_centroid);
    let grid_points = boundary::grid_sample(&floor_points, GRID_SAMPLE_CELL_MM);

    let charger = map
        .entities_of_type(&EntityType::ChargerLocation)
        .flat_map(|e| pairs_to_points(&e.points))
        .next();

    Ok(FeatureSet {
        boundary_points,
        corner_points,
        wall_samples,
        grid_points,
        charger,
        centroid: floor_centroid,
        bbox,
    })
}

/// Every `wall` layer pixel as a point, uncapped — the main feature set
/// caps this at [`MAX_WALL_SAMPLES`], but the ICP wall-refinement pass
/// resamples from scratch at its own, larger cap (spec §4.6).
pub fn raw_wall_points(map: &Map) -> Vec<Point> {
    map.layers_of_type(&LayerType::Wall)
        .flat_map(|l| pairs_to_points(&l.pixels))
        .collect()
}

/// Floor points: `floor`/`segment` layer pixels, or (if none) every `path`
/// entity point — the path trajectory already densely characterises the
/// reachable floor even without a floor layer (spec §4.3).
fn floor_source_points(map: &Map) -> Vec<Point> {
    let mut points: Vec<Point> = map
        .layers_of_type(&LayerType::Floor)
        .chain(map.layers_of_type(&LayerType::Segment))
        .flat_map(|l| pairs_to_points(&l.pixels))
        .collect();

    if points.is_empty() {
        points = map
            .entities_of_type(&EntityType::Path)
            .flat_map(|e| pairs_to_points(&e.points))
            .collect();
    }
    points
}

/// Build an ordered feature cloud of at most `max` points by greedy
/// allocation, structural cues first (spec §4.3 "SampleFeatures"):
/// charger, then up to `max/3` wall samples, then up to `max/3` grid points,
/// then up to `min(50, remaining)` corners, then boundary points filling
/// whatever budget remains.
pub fn sample_features(fs: &FeatureSet, max: usize) -> Vec<Point> {
    let mut out = Vec::with_capacity(max.min(fs.boundary_points.len() + fs.grid_points.len() + 1));

    if let Some(charger) = fs.charger {
        out.push(charger);
    }

    let third = max / 3;
    out.extend(stride_cap(&fs.wall_samples, third.min(max.saturating_sub(out.len()))));
    out.extend(stride_cap(
        &fs.grid_points,
        third.min(max.saturating_sub(out.len())),
    ));

    let corner_budget = SAMPLE_FEATURES_MAX_CORNERS.min(max.saturating_sub(out.len()));
    out.extend(stride_cap(&fs.corner_points, corner_budget));

    let remaining = max.saturating_sub(out.len());
    out.extend(stride_cap(&fs.boundary_points, remaining));

    out.truncate(max);
    out
}


#[cfg(test)]
impl FeatureSet {
    fn bbox_is_degenerate(&self) -> bool {
        self.bbox.min.x == self.bbox.max.x && self.bbox.min.y == self.bbox.max.y
    }
}
