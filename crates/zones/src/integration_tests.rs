//! Integration tests for the zone systems using the `TestWorld` harness.
//!
//! These run the full `ZonesPlugin` schedule headlessly and check behavior
//! that spans housekeeping, culling and edge dragging.

mod culling_tests;
mod drag_tests;

use bevy::prelude::*;

use crate::geometry::TileRect;
use crate::test_harness::TestWorld;
use crate::world::ZoneWorld;

#[test]
fn empty_world_has_no_zones() {
    let world = TestWorld::new();
    assert!(world.zones().is_empty());
    assert!(world.zones().index().is_empty());
}

#[test]
fn systems_are_skipped_without_a_loaded_world() {
    let mut world = TestWorld::new().with_camera(Vec2::ZERO, Vec2::splat(320.0));
    world.world_mut().remove_resource::<ZoneWorld>();
    world.point_at(Vec2::new(10.0, 10.0));
    world.tick(3);
    assert!(world.visibility_events().is_empty());
}

#[test]
fn overlapping_zones_resolve_by_priority() {
    let mut world = TestWorld::new();
    let low = world.add_confirmed(1, TileRect::new(10, 10, 5, 5), 0);
    let high = world.add_confirmed(2, TileRect::new(12, 12, 5, 5), 5);
    world.tick(1);

    let zones = world.zones();
    assert_eq!(zones.zone_at_point(IVec2::new(13, 13)).map(|z| z.key()), Some(high));
    let mut all: Vec<_> = zones
        .zones_at_point(IVec2::new(13, 13))
        .iter()
        .map(|z| z.key())
        .collect();
    all.sort();
    assert_eq!(all, vec![low, high]);
    assert_eq!(zones.zone_at_point(IVec2::new(11, 11)).map(|z| z.key()), Some(low));
}
