use tracing::trace;

use crate::map::types::Map;

/// Convert every layer's pixel coordinates from grid-cell indices to
/// millimetres, in place, exactly once.
///
/// No-op when the map is already normalized or when `pixel_size <= 0`.
/// Idempotent: calling this twice on the same map is equivalent to calling
/// it once, since the `normalized` flag is sticky (spec §4.2, §8).
///
/// A Rust caller never hands a null `Map` (there is no such value for an
/// owned struct), so the spec's "no-op when the map is nil" clause has no
/// counterpart here.
pub fn normalize(map: &mut Map) {
    if map.normalized || map.pixel_size <= 0.0 {
        return;
    }

    for layer in &mut map.layers {
        if layer.pixels.is_empty() {
            if let Some(compressed) = &layer.compressed_pixels {
                layer.pixels = compressed.clone();
            }
        }
        for v in layer.pixels.iter_mut() {
            *v *= map.pixel_size;
        }
    }

    map.normalized = true;
    trace!(pixel_size = map.pixel_size, "map normalized");
}
