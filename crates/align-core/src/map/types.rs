use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::geometry::Point;

/// A typed subset of a map's occupied cells. `pixels` is a flat
/// `[x1, y1, x2, y2, ...]` sequence — raw grid-cell indices before
/// [`crate::map::normalize`], millimetres after.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Layer {
    #[serde(rename = "type")]
    pub layer_type: LayerType,
    #[serde(default)]
    pub pixels: Vec<f64>,
    #[serde(default, rename = "compressedPixels")]
    pub compressed_pixels: Option<Vec<f64>>,
}

/// `floor`, `segment`, or `wall`, or any other wire value a collaborator's
/// source surfaces (kept verbatim in `Other` rather than rejected, since
/// the core only cares about the three named kinds).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerType {
    Floor,
    Segment,
    Wall,
    Other(String),
}

impl Serialize for LayerType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let s = match self {
            LayerType::Floor => "floor",
            LayerType::Segment => "segment",
            LayerType::Wall => "wall",
            LayerType::Other(s) => s,
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for LayerType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "floor" => LayerType::Floor,
            "segment" => LayerType::Segment,
            "wall" => LayerType::Wall,
            _ => LayerType::Other(s),
        })
    }
}

/// A discrete annotation already in millimetres; never touched by
/// [`crate::map::normalize`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Flat `[x1, y1, x2, y2, ...]` sequence, already in millimetres.
    #[serde(default)]
    pub points: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    RobotPosition,
    ChargerLocation,
    Path,
}

/// A snapshot of occupancy and anchor entities produced by one robot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    #[serde(rename = "pixelSize")]
    pub pixel_size: f64,
    #[serde(default, rename = "totalLayerArea")]
    pub total_layer_area: Option<f64>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Sticky flag: once [`crate::map::normalize`] sets this, it never
    /// converts `layers[*].pixels` again.
    #[serde(default)]
    pub normalized: bool,
}

impl Map {
    pub fn layers_of_type<'a>(&'a self, ty: &'a LayerType) -> impl Iterator<Item = &'a Layer> {
        self.layers.iter().filter(move |l| &l.layer_type == ty)
    }

    pub fn entities_of_type<'a>(&'a self, ty: &'a EntityType) -> impl Iterator<Item = &'a Entity> {
        self.entities.iter().filter(move |e| &e.entity_type == ty)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty() && self.entities.is_empty()
    }
}

/// Read a flat `[x1, y1, x2, y2, ...]` sequence as a point list. A trailing
/// unpaired coordinate is dropped.
pub fn pairs_to_points(flat: &[f64]) -> Vec<Point> {
    flat.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect()
}
