//! Reference-vacuum selection (spec §4.8): decide whose map the rest of the
//! fleet aligns against.

use crate::map::Map;

/// One vacuum's id paired with its current map, as handed in by the caller.
pub struct VacuumMap<'a> {
    pub id: &'a str,
    pub map: &'a Map,
}

/// Preference order: a configured id present in `maps`, else a cached id
/// present in `maps`, else the map with the largest `total_layer_area`.
/// `None` if `maps` is empty — undefined per spec §4.8, and an empty set is
/// the only caller error that can produce it.
pub fn select_reference_vacuum<'a>(
    maps: &[VacuumMap<'a>],
    configured_id: Option<&str>,
    cached_id: Option<&str>,
) -> Option<&'a str> {
    if maps.is_empty() {
        return None;
    }

    if let Some(configured) = configured_id {
        if let Some(found) = maps.iter().find(|v| v.id == configured) {
            return Some(found.id);
        }
    }
    if let Some(cached) = cached_id {
        if let Some(found) = maps.iter().find(|v| v.id == cached) {
            return Some(found.id);
        }
    }

    maps.iter()
        .max_by(|a, b| {
            let area_a = a.map.total_layer_area.unwrap_or(0.0);
            let area_b = b.map.total_layer_area.unwrap_or(0.0);
            area_a.total_cmp(&area_b)
        })
        .map(|v| v.id)
}
