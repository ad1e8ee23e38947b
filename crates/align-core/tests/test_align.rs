use align_core::{
    align_maps, align_maps_with_rotation_hint, detect_rotation_features, detect_rotation_histogram,
    extract_features, normalize, AffineMatrix, Entity, EntityType, ICPConfig, Layer, LayerType, Map,
};
use rand::SeedableRng;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn l_shape_map(origin: (f64, f64), scale: f64, charger: Option<(f64, f64)>) -> Map {
    let mut wall_pixels = Vec::new();
    for i in 0..30 {
        wall_pixels.push(origin.0 + i as f64 * scale);
        wall_pixels.push(origin.1);
    }
    for i in 0..18 {
        wall_pixels.push(origin.0);
        wall_pixels.push(origin.1 + i as f64 * scale);
    }

    let mut floor_pixels = Vec::new();
    for x in 0..30 {
        for y in 0..18 {
            floor_pixels.push(origin.0 + x as f64 * scale);
            floor_pixels.push(origin.1 + y as f64 * scale);
        }
    }

    let entities = charger
        .map(|(cx, cy)| {
            vec![Entity {
                entity_type: EntityType::ChargerLocation,
                points: vec![cx, cy],
            }]
        })
        .unwrap_or_default();

    Map {
        pixel_size: 1.0,
        total_layer_area: Some(floor_pixels.len() as f64 / 2.0),
        layers: vec![
            Layer {
                layer_type: LayerType::Floor,
                pixels: floor_pixels,
                compressed_pixels: None,
            },
            Layer {
                layer_type: LayerType::Wall,
                pixels: wall_pixels,
                compressed_pixels: None,
            },
        ],
        entities,
        normalized: true,
    }
}

fn translate_map(map: &Map, dx: f64, dy: f64) -> Map {
    let mut shifted = map.clone();
    for layer in &mut shifted.layers {
        for pair in layer.pixels.chunks_exact_mut(2) {
            pair[0] += dx;
            pair[1] += dy;
        }
    }
    for entity in &mut shifted.entities {
        for pair in entity.points.chunks_exact_mut(2) {
            pair[0] += dx;
            pair[1] += dy;
        }
    }
    shifted
}

fn rotate_map_90(map: &Map) -> Map {
    let transform = AffineMatrix::rotation_deg(90.0);
    let mut rotated = map.clone();
    for layer in &mut rotated.layers {
        for pair in layer.pixels.chunks_exact_mut(2) {
            let p = transform.transform_point(align_core::geometry::Point::new(pair[0], pair[1]));
            pair[0] = p.x;
            pair[1] = p.y;
        }
    }
    for entity in &mut rotated.entities {
        for pair in entity.points.chunks_exact_mut(2) {
            let p = transform.transform_point(align_core::geometry::Point::new(pair[0], pair[1]));
            pair[0] = p.x;
            pair[1] = p.y;
        }
    }
    rotated
}

fn rng() -> rand::rngs::StdRng {
    rand::rngs::StdRng::seed_from_u64(42)
}

// ---------------------------------------------------------------------------
// scenario 1: identity
// ---------------------------------------------------------------------------

#[test]
fn test_identity_maps_align_near_identity_transform() {
    let map = l_shape_map((100.0, 100.0), 2.0, Some((120.0, 120.0)));
    let cfg = ICPConfig::default();
    let result = align_maps(&map, &map, &cfg, &mut rng()).unwrap();

    assert!((result.transform.a - 1.0).abs() < 0.1);
    assert!((result.transform.d - 1.0).abs() < 0.1);
    assert!(result.transform.tx.abs() < 5.0);
    assert!(result.transform.ty.abs() < 5.0);
    assert!(result.score > 0.5);
}

// ---------------------------------------------------------------------------
// scenario 2: pure translation
// ---------------------------------------------------------------------------

#[test]
fn test_pure_translation_recovered_within_tolerance() {
    let source = l_shape_map((0.0, 0.0), 2.0, Some((20.0, 20.0)));
    let target = translate_map(&source, 50.0, 30.0);
    let cfg = ICPConfig::default();
    let result = align_maps(&source, &target, &cfg, &mut rng()).unwrap();

    assert!((result.transform.tx - 50.0).abs() <= 10.0);
    assert!((result.transform.ty - 30.0).abs() <= 10.0);
    assert!((result.transform.a - 1.0).abs() < 0.1);
    assert!((result.transform.d - 1.0).abs() < 0.1);
}

// ---------------------------------------------------------------------------
// scenario 3: hinted 90-degree rotation
// ---------------------------------------------------------------------------

#[test]
fn test_rotation_hint_recovers_ninety_degrees() {
    let source = l_shape_map((0.0, 0.0), 2.0, Some((20.0, 20.0)));
    let target = rotate_map_90(&source);
    let cfg = ICPConfig::default();
    let result = align_maps_with_rotation_hint(&source, &target, &cfg, 90.0, &mut rng()).unwrap();

    let recovered_deg = result.transform.c.atan2(result.transform.a).to_degrees();
    let recovered_deg = ((recovered_deg % 360.0) + 360.0) % 360.0;
    let delta = (recovered_deg - 90.0).abs().min((recovered_deg - 450.0).abs());
    assert!(delta <= 15.0, "recovered rotation {recovered_deg} deg not within 15 of 90");
    assert!(result.score > 0.2);
}

// ---------------------------------------------------------------------------
// scenario 4: partial overlap
// ---------------------------------------------------------------------------

#[test]
fn test_partial_overlap_shift_recovered() {
    let source = l_shape_map((0.0, 0.0), 2.0, Some((20.0, 20.0)));
    let target = translate_map(&source, 30.0, 20.0);
    let cfg = ICPConfig::default();
    let result = align_maps(&source, &target, &cfg, &mut rng()).unwrap();

    assert!((result.transform.tx - 30.0).abs() <= 15.0);
    assert!((result.transform.ty - 20.0).abs() <= 15.0);
    assert!(result.score > 0.1);
}

// ---------------------------------------------------------------------------
// scenario 5: no charger
// ---------------------------------------------------------------------------

#[test]
fn test_no_charger_still_converges_on_walls_alone() {
    let source = l_shape_map((0.0, 0.0), 2.0, None);
    let target = translate_map(&source, 25.0, 15.0);
    let cfg = ICPConfig::default();
    let result = align_maps(&source, &target, &cfg, &mut rng()).unwrap();
    assert!(result.score > 0.3);
}

// ---------------------------------------------------------------------------
// scenario 6: hallway slippage guard
// ---------------------------------------------------------------------------

fn hallway_map(origin: (f64, f64)) -> Map {
    let mut wall_pixels = Vec::new();
    for i in 0..61 {
        wall_pixels.push(origin.0 + i as f64 * 50.0);
        wall_pixels.push(origin.1);
        wall_pixels.push(origin.0 + i as f64 * 50.0);
        wall_pixels.push(origin.1 + 1500.0);
    }
    for i in 0..31 {
        wall_pixels.push(origin.0);
        wall_pixels.push(origin.1 + i as f64 * 50.0);
        wall_pixels.push(origin.0 + 3000.0);
        wall_pixels.push(origin.1 + i as f64 * 50.0);
    }

    let mut floor_pixels = Vec::new();
    for x in 0..61 {
        for y in 0..31 {
            floor_pixels.push(origin.0 + x as f64 * 50.0);
            floor_pixels.push(origin.1 + y as f64 * 50.0);
        }
    }

    Map {
        pixel_size: 1.0,
        total_layer_area: Some(floor_pixels.len() as f64 / 2.0),
        layers: vec![
            Layer {
                layer_type: LayerType::Floor,
                pixels: floor_pixels,
                compressed_pixels: None,
            },
            Layer {
                layer_type: LayerType::Wall,
                pixels: wall_pixels,
                compressed_pixels: None,
            },
        ],
        entities: vec![Entity {
            entity_type: EntityType::ChargerLocation,
            points: vec![origin.0 + 100.0, origin.1 + 100.0],
        }],
        normalized: true,
    }
}

#[test]
fn test_hallway_does_not_slide_along_its_long_axis() {
    let source = hallway_map((0.0, 0.0));
    let target = translate_map(&source, 10.0, 50.0);
    let cfg = ICPConfig::default();
    let result = align_maps(&source, &target, &cfg, &mut rng()).unwrap();

    assert!((result.transform.tx - 10.0).abs() <= 5.0, "tx={} slid along hallway", result.transform.tx);
    assert!((result.transform.ty - 50.0).abs() <= 10.0);
}

// ---------------------------------------------------------------------------
// scenario 7: rotation detector on a symmetric-ish L-shape
// ---------------------------------------------------------------------------

#[test]
fn test_rotation_detector_on_identical_maps_prefers_zero_or_one_eighty() {
    let map = l_shape_map((0.0, 0.0), 2.0, Some((20.0, 20.0)));
    let walls: Vec<align_core::geometry::Point> = map
        .layers
        .iter()
        .filter(|l| l.layer_type == LayerType::Wall)
        .flat_map(|l| align_core::map::pairs_to_points(&l.pixels))
        .collect();

    let detection = detect_rotation_histogram(&walls, &walls, 2.0);
    assert!(detection.best_rotation_deg == 0.0 || detection.best_rotation_deg == 180.0);

    let features = extract_features(&map).unwrap();
    let feature_detection = detect_rotation_features(&features, &features);
    assert_eq!(feature_detection.best_rotation_deg, 0.0);
    assert!(feature_detection.confidence > 0.0);
}

// ---------------------------------------------------------------------------
// idempotent normalisation
// ---------------------------------------------------------------------------

#[test]
fn test_normalize_is_idempotent_end_to_end() {
    let mut map = l_shape_map((0.0, 0.0), 1.0, Some((10.0, 10.0)));
    map.normalized = false;
    map.pixel_size = 25.0;
    normalize(&mut map);
    let once = map.layers[0].pixels.clone();
    normalize(&mut map);
    assert_eq!(map.layers[0].pixels, once);
}
