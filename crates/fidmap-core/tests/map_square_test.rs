use fidmap_core::angle::{self, PI};
use fidmap_core::{Map, MapConfig, TagId};

//  3---2
//  |\ /|
//  | 4 |
//  |/ \|
//  0---1
//
// Tag `i` is twisted by `10° × i`.
const POSES: [(f64, f64); 5] = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, 5.0)];
const SIDES: [(TagId, TagId); 4] = [(0, 1), (1, 2), (0, 3), (2, 3)];
const SPOKES: [(TagId, TagId); 4] = [(0, 4), (1, 4), (2, 4), (3, 4)];

fn twist(id: TagId) -> f64 {
    angle::degrees(10.0 * id as f64)
}

/// What a perfect camera would measure from surveyed tag `a` to `b`.
fn measure(a: TagId, b: TagId) -> (f64, f64, f64) {
    let (ax, ay) = POSES[a as usize];
    let (bx, by) = POSES[b as usize];
    let bearing = (by - ay).atan2(bx - ax);
    let a_twist = angle::normalize(twist(a) - bearing);
    let b_twist = angle::normalize(twist(b) - (bearing + PI));
    (a_twist, (bx - ax).hypot(by - ay), b_twist)
}

fn announce(map: &mut Map, a: TagId, b: TagId, goodness: f64) {
    let (a_twist, distance, b_twist) = measure(a, b);
    map.arc_announce(a, a_twist, distance, b, b_twist, goodness)
        .unwrap();
}

fn square_map(side_goodness: f64, spoke_goodness: f64) -> Map {
    let mut map = Map::new(MapConfig::default()).unwrap();
    map.tag_initialize(0, 0.0, 0.0, 0.0, 1.0).unwrap();
    for (a, b) in SIDES {
        announce(&mut map, a, b, side_goodness);
    }
    for (a, b) in SPOKES {
        announce(&mut map, a, b, spoke_goodness);
    }
    map.update();
    map
}

fn assert_pose(map: &Map, id: TagId) {
    let tag = map.tag(id).unwrap();
    let pose = tag.pose().unwrap_or_else(|| panic!("tag {id} unresolved"));
    let (x, y) = POSES[id as usize];
    assert!((pose.x - x).abs() < 1e-9, "tag {id}: x={} expected {x}", pose.x);
    assert!((pose.y - y).abs() < 1e-9, "tag {id}: y={} expected {y}", pose.y);
    assert!(
        angle::between(pose.twist, twist(id)).abs() < 1e-9,
        "tag {id}: twist={} expected {}",
        pose.twist,
        twist(id)
    );
}

#[test]
fn square_resolves_every_tag_through_the_center() {
    let map = square_map(0.0, 0.0);
    for id in 0..5 {
        assert_pose(&map, id);
    }

    // Equal goodness: the shorter spokes win, so every corner hangs off the center.
    assert_eq!(map.tag(4).unwrap().hop_count(), 1);
    for corner in 1..4 {
        assert_eq!(map.tag(corner).unwrap().hop_count(), 2);
    }
    let tree: Vec<(TagId, TagId)> = map
        .arcs()
        .filter(|arc| arc.in_tree())
        .map(|arc| (arc.from_id(), arc.to_id()))
        .collect();
    assert_eq!(tree, SPOKES.to_vec());
}

#[test]
fn trusted_sides_route_the_far_corner_through_two_right_angle_hops() {
    let map = square_map(1.0, 5.0);
    for id in 0..5 {
        assert_pose(&map, id);
    }
    assert_eq!(map.tag(2).unwrap().hop_count(), 2);
    assert_eq!(map.tag(4).unwrap().hop_count(), 1);
    let tree: Vec<(TagId, TagId)> = map
        .arcs()
        .filter(|arc| arc.in_tree())
        .map(|arc| (arc.from_id(), arc.to_id()))
        .collect();
    assert_eq!(tree, vec![(0, 1), (0, 3), (0, 4), (1, 2)]);
}

#[test]
fn tree_arcs_record_their_absolute_bearing() {
    let map = square_map(0.0, 0.0);
    let spoke = map.arc(0, 4).unwrap();
    assert!((spoke.angle() - PI / 4.0).abs() < 1e-12);
    let side = map.arc(0, 3).unwrap();
    assert!((side.angle() - PI / 2.0).abs() < 1e-12);
}

#[test]
fn independently_built_maps_are_equal() {
    let first = square_map(0.0, 0.0);

    // Same measurements in reverse order, each reported from the other endpoint.
    let mut second = Map::new(MapConfig::default()).unwrap();
    second.tag_initialize(0, 0.0, 0.0, 0.0, 1.0).unwrap();
    for &(a, b) in SPOKES.iter().rev().chain(SIDES.iter().rev()) {
        let (a_twist, distance, b_twist) = measure(a, b);
        second
            .arc_announce(b, b_twist, distance, a, a_twist, 0.0)
            .unwrap();
        assert_eq!(second.arc(a, b).unwrap().from_id(), a);
    }
    second.update();

    assert!(first.equals(&second));
    assert!(first == second);
}

#[test]
fn disturbed_map_is_not_equal() {
    let first = square_map(0.0, 0.0);
    let mut second = square_map(0.0, 0.0);
    second.arc_announce(0, 0.0, 10.5, 1, 0.0, 0.0).unwrap();
    assert!(!first.equals(&second));
}
