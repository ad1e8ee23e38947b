pub mod normalize;
pub mod types;

pub use normalize::normalize;
pub use types::{pairs_to_points, Entity, EntityType, Layer, LayerType, Map};
