use bevy::prelude::*;

use crate::drag::{BorderInteraction, OpenZoneEditor, ZoneEditMode};
use crate::geometry::TileRect;
use crate::test_harness::TestWorld;
use crate::world::ZoneChange;

fn editing_world() -> TestWorld {
    TestWorld::new().with_camera(Vec2::splat(-320.0), Vec2::splat(1280.0))
}

#[test]
fn dragging_right_edge_past_left_flips_the_rect() {
    let mut world = editing_world();
    let key = world.add_confirmed(1, TileRect::new(0, 0, 10, 10), 0);

    world.point_at(Vec2::new(157.0, 80.0));
    world.press(MouseButton::Left);
    world.tick(1);
    assert!(world.interaction().dragging);

    world.drag_tick(Vec2::new(-80.0, 80.0));
    let rect = world.zone(key).rect();
    assert_eq!((rect.left(), rect.right(), rect.width), (-5, 0, 5));

    world.point_at(Vec2::new(-80.0, 80.0));
    world.release(MouseButton::Left);
    world.tick(1);
    assert!(!world.interaction().dragging);
    assert!(world.editor_events().is_empty());

    world.drag_tick(Vec2::new(-160.0, 80.0));
    assert_eq!(world.zone(key).rect(), TileRect::from_edges(-5, 0, 0, 10));
}

#[test]
fn hover_reports_drag_hint() {
    let mut world = editing_world();
    world.add_confirmed(1, TileRect::new(0, 0, 10, 10), 0);
    world.drag_tick(Vec2::new(2.0, 80.0));
    assert!(world.interaction().hovered);
    assert!(world.interaction().drag_hint_visible());

    world.drag_tick(Vec2::new(80.0, 80.0));
    assert!(!world.interaction().drag_hint_visible());
}

#[test]
fn pointer_over_ui_blocks_hover() {
    let mut world = editing_world();
    world.add_confirmed(1, TileRect::new(0, 0, 10, 10), 0);
    world.set_over_ui(true);
    world.drag_tick(Vec2::new(2.0, 80.0));
    assert!(!world.interaction().hovered);
}

#[test]
fn edit_mode_is_cleared_every_tick() {
    let mut world = editing_world();
    world.add_confirmed(1, TileRect::new(0, 0, 10, 10), 0);
    world.drag_tick(Vec2::new(2.0, 80.0));
    assert!(!world.resource::<ZoneEditMode>().enabled);
    assert!(world.interaction().hovered);

    world.tick(1);
    assert!(!world.interaction().hovered, "controller idles until re-armed");
}

#[test]
fn placement_drag_opens_editor_on_secondary_release() {
    let mut world = editing_world();
    let key = world
        .zones_mut()
        .begin_placement(IVec2::new(2, 2), "builder");

    world.point_at(Vec2::new(100.0, 90.0));
    world.press(MouseButton::Right);
    world.tick(1);
    assert_eq!(world.zone(key).rect(), TileRect::from_edges(2, 2, 6, 6));
    assert!(world.editor_events().is_empty());

    world.point_at(Vec2::new(100.0, 90.0));
    world.release(MouseButton::Right);
    world.tick(1);
    assert_eq!(world.editor_events(), vec![OpenZoneEditor { zone: key }]);
    assert!(world.zone(key).is_fresh());

    let id = world.zones_mut().confirm_zone(key).unwrap();
    assert_eq!(world.zone(key).id(), id);
}

#[test]
fn drag_edits_of_confirmed_zones_are_queued_for_sync() {
    let mut world = editing_world();
    world.zones_mut().set_sync_enabled(true);
    let key = world.add_confirmed(9, TileRect::new(0, 0, 10, 10), 0);

    world.point_at(Vec2::new(157.0, 80.0));
    world.press(MouseButton::Left);
    world.tick(1);
    world.drag_tick(Vec2::new(240.0, 80.0));

    let outbox = world.zones_mut().take_outbox();
    assert_eq!(
        outbox,
        vec![ZoneChange::Rect {
            id: 9,
            rect: TileRect::new(0, 0, 15, 10)
        }]
    );
    assert_eq!(world.zone(key).rect().right(), 15);
}

#[test]
fn disarming_edit_mode_cancels_the_drag() {
    let mut world = editing_world();
    let key = world.add_confirmed(1, TileRect::new(0, 0, 10, 10), 0);

    world.point_at(Vec2::new(157.0, 80.0));
    world.press(MouseButton::Left);
    world.tick(1);
    assert!(world.interaction().dragging);

    world.tick(1);
    assert_eq!(world.interaction(), BorderInteraction::default());
    assert!(!world.zones().any_dragging(), "edge flags cleared with the interaction");

    world.drag_tick(Vec2::new(240.0, 80.0));
    assert_eq!(world.zone(key).rect(), TileRect::new(0, 0, 10, 10));
    assert!(!world.interaction().dragging);
}
