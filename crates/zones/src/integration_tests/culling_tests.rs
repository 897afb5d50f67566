use bevy::prelude::*;

use crate::culling::ZoneVisibilityChanged;
use crate::geometry::TileRect;
use crate::test_harness::TestWorld;

#[test]
fn zone_outside_camera_has_no_display_state() {
    let mut world = TestWorld::new().with_camera(Vec2::ZERO, Vec2::splat(320.0));
    let key = world.add_confirmed(1, TileRect::new(100, 100, 4, 4), 0);
    world.tick(1);
    assert!(world.zone(key).display().is_none());
    assert!(world.zones().visible().is_empty());
    assert!(world.visibility_events().is_empty());
}

#[test]
fn crossing_the_viewport_fires_one_event_each_way() {
    let mut world = TestWorld::new().with_camera(Vec2::ZERO, Vec2::splat(320.0));
    let key = world.add_confirmed(1, TileRect::new(100, 100, 4, 4), 0);
    world.tick(1);

    world.set_camera(Vec2::splat(1600.0), Vec2::splat(320.0));
    world.tick(1);
    assert_eq!(
        world.visibility_events(),
        vec![ZoneVisibilityChanged {
            zone: key,
            visible: true
        }]
    );
    assert!(world.zone(key).display().is_some());

    world.tick(5);
    assert!(world.visibility_events().is_empty());
    assert_eq!(world.zone(key).display().unwrap().layout_revision, 1);

    world.set_camera(Vec2::ZERO, Vec2::splat(320.0));
    world.tick(1);
    assert_eq!(
        world.visibility_events(),
        vec![ZoneVisibilityChanged {
            zone: key,
            visible: false
        }]
    );
    assert!(world.zone(key).display().is_none());
}

#[test]
fn slack_tile_reveals_zone_just_past_the_edge() {
    // 320 px = 20 tiles; slack extends the view to tile 20 inclusive.
    let mut world = TestWorld::new().with_camera(Vec2::ZERO, Vec2::splat(320.0));
    let key = world.add_confirmed(1, TileRect::new(20, 0, 2, 2), 0);
    world.tick(1);
    assert!(world.zone(key).display().is_some());
}

#[test]
fn zone_added_inside_known_viewport_is_visible_immediately() {
    let mut world = TestWorld::new().with_camera(Vec2::ZERO, Vec2::splat(320.0));
    world.tick(1);
    let key = world.add_confirmed(1, TileRect::new(2, 2, 2, 2), 0);
    assert!(world.zone(key).display().is_some());
    assert_eq!(world.zones().visible(), &[key]);
}

#[test]
fn removing_every_zone_clears_the_visible_set() {
    let mut world = TestWorld::new().with_camera(Vec2::ZERO, Vec2::splat(320.0));
    let key = world.add_confirmed(1, TileRect::new(2, 2, 2, 2), 0);
    world.tick(1);
    assert_eq!(world.zones().visible(), &[key]);

    world.zones_mut().remove_zone(key);
    world.tick(1);
    assert!(world.zones().visible().is_empty());
    assert!(world.zones().index().is_empty());
}
