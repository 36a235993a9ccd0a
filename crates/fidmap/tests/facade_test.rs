use fidmap::{Map, MapConfig};

#[test]
fn core_types_are_reexported() {
    let mut map = Map::new(MapConfig::default()).unwrap();
    map.arc_announce(0, 0.0, 1.0, 1, std::f64::consts::PI, 0.0)
        .unwrap();
    let summary = map.update();
    assert_eq!(summary.reached, 2);
}

#[cfg(feature = "render")]
#[test]
fn saved_map_renders_through_the_facade() {
    use fidmap::render::{SvgOptions, render_map_file};

    let dir = tempfile::tempdir().unwrap();
    let config = MapConfig::new(dir.path(), "Map");
    let mut map = Map::new(config.clone()).unwrap();
    map.tag_initialize(0, 0.0, 0.0, 0.0, 1.0).unwrap();
    map.arc_announce(0, 0.0, 1.0, 1, std::f64::consts::PI, 0.0)
        .unwrap();
    map.update();
    map.save().unwrap();

    let svg = render_map_file(config, &SvgOptions::default()).unwrap();
    assert!(svg.contains(">1</text>"));
}

#[cfg(feature = "render")]
#[test]
fn missing_map_file_is_a_map_error() {
    use fidmap::render::{Error, SvgOptions, render_map_file};

    let dir = tempfile::tempdir().unwrap();
    let err = render_map_file(MapConfig::new(dir.path(), "Absent"), &SvgOptions::default())
        .unwrap_err();
    assert!(matches!(err, Error::Map(_)));
}
