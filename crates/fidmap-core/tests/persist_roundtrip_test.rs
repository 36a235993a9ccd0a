use fidmap_core::{Error, Map, MapConfig};

fn sample_map(config: MapConfig) -> Map {
    let mut map = Map::new(config).unwrap();
    map.tag_initialize(3, 0.25, 1.5, -2.0, 0.2).unwrap();
    map.arc_announce(3, 0.1, 2.0, 7, -2.9, 0.5).unwrap();
    map.arc_announce(7, 1.0 / 3.0, 4.25, 9, 0.7, 0.0).unwrap();
    // Never connected to the root.
    map.arc_announce(20, 0.0, 1.0, 21, 3.0, 1.0).unwrap();
    map.set_root(3).unwrap();
    map
}

#[test]
fn saved_map_loads_back_equal() {
    let dir = tempfile::tempdir().unwrap();
    let config = MapConfig::new(dir.path(), "Floor");

    let mut map = sample_map(config.clone());
    assert!(map.is_changed());
    let path = map.save().unwrap();
    assert_eq!(path, dir.path().join("Floor.xml"));
    assert!(!map.is_changed());

    let loaded = Map::create(config).unwrap();
    assert!(loaded.equals(&map));
    assert_eq!(loaded.root(), Some(3));
    assert_eq!(loaded.tag_count(), 5);
    assert_eq!(loaded.arc_count(), 3);
    assert!(!loaded.is_changed());

    let tag9 = loaded.tag(9).unwrap();
    assert!(tag9.is_initialized());
    assert_eq!(tag9.hop_count(), 2);
    assert!(!loaded.tag(20).unwrap().is_initialized());
    assert!(loaded.arc(7, 9).unwrap().in_tree());
    assert!(!loaded.arc(20, 21).unwrap().in_tree());
    assert_eq!(loaded.tag(7).unwrap().arcs().len(), 2);
}

#[test]
fn rewriting_a_loaded_map_is_byte_identical() {
    let map = sample_map(MapConfig::default());
    let first = map.to_xml_string().unwrap();
    let reloaded = Map::from_xml_str(MapConfig::default(), &first).unwrap();
    assert_eq!(reloaded.to_xml_string().unwrap(), first);
}

#[test]
fn written_text_has_the_documented_shape() {
    let mut map = Map::new(MapConfig::default()).unwrap();
    map.tag_initialize(0, 0.0, 0.0, 0.0, 1.0).unwrap();
    map.arc_announce(1, 0.5, 10.0, 0, -0.5, 0.0).unwrap();
    map.update();
    let text = map.to_xml_string().unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    assert_eq!(lines[1], r#"<Map Tags_Count="2" Arcs_Count="1" Root_Id="0">"#);
    assert!(lines[2].starts_with(r#" <Tag Id="0" Twist="0" X="0" Y="0" Diagonal="1""#));
    assert!(lines[3].starts_with(r#" <Tag Id="1""#));
    assert!(lines[4].starts_with(
        r#" <Arc From_Tag_Id="0" From_Twist="-0.5" Distance="10" To_Tag_Id="1" To_Twist="0.5""#
    ));
    assert!(lines[4].ends_with(r#"Goodness="0" In_Tree="1"/>"#));
    assert_eq!(lines[5], "</Map>");
    assert_eq!(lines.len(), 6);
}

#[test]
fn empty_map_round_trips_without_a_root() {
    let map = Map::new(MapConfig::default()).unwrap();
    let text = map.to_xml_string().unwrap();
    assert!(text.contains(r#"Root_Id="-1""#));
    let loaded = Map::from_xml_str(MapConfig::default(), &text).unwrap();
    assert_eq!(loaded.root(), None);
    assert_eq!(loaded.tag_count(), 0);
}

#[test]
fn missing_file_starts_an_empty_map_but_load_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = MapConfig::new(dir.path(), "Nothing");
    let map = Map::create(config.clone()).unwrap();
    assert_eq!(map.tag_count(), 0);

    let err = Map::load(config).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "{err}");
}

#[test]
fn malformed_file_reports_its_path_and_position() {
    let dir = tempfile::tempdir().unwrap();
    let config = MapConfig::new(dir.path(), "Broken");
    std::fs::write(
        config.map_path(),
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Map Tags_Count=\"1\" Arcs_Count=\"0\" Root_Id=\"-1\">\n <Tag Id=\"0\" Twist=\"oops\"/>\n</Map>\n",
    )
    .unwrap();

    let err = Map::load(config.clone()).unwrap_err();
    let Error::MapFile { path, source } = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(path, &config.map_path());
    let Error::Malformed { line, .. } = source.as_ref() else {
        panic!("unexpected source: {source}");
    };
    assert_eq!(*line, 3);
}

#[test]
fn arcs_to_unknown_tags_are_rejected() {
    let text = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Map Tags_Count=\"1\" Arcs_Count=\"1\" Root_Id=\"0\">\n <Tag Id=\"0\" Twist=\"0\" X=\"0\" Y=\"0\" Diagonal=\"1\" Hop_Count=\"0\" Initialized=\"1\"/>\n <Arc From_Tag_Id=\"0\" From_Twist=\"0\" Distance=\"1\" To_Tag_Id=\"5\" To_Twist=\"0\" Angle=\"0\" Goodness=\"0\" In_Tree=\"0\"/>\n</Map>\n";
    let err = Map::from_xml_str(MapConfig::default(), text).unwrap_err();
    assert!(err.to_string().contains("unknown tag 5"), "{err}");
}

#[test]
fn non_finite_values_are_refused() {
    let mut map = Map::new(MapConfig::default()).unwrap();
    let err = map.tag_initialize(0, 0.0, f64::NAN, 0.0, 1.0).unwrap_err();
    assert!(matches!(err, Error::NonFinite { ref what } if what == "x"), "{err}");
    assert_eq!(map.tag_count(), 0);
    assert!(map.to_xml_string().is_ok());
}
