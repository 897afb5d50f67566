//! # TestWorld – headless harness for zone integration tests
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + `ZonesPlugin` with a loaded
//! `ZoneWorld`. Mouse buttons are driven through a `ButtonInput` resource
//! that the harness clears after every tick, the way the input plugin would.

use bevy::app::App;
use bevy::ecs::event::Events;
use bevy::prelude::*;

use crate::culling::{ZoneCamera, ZoneVisibilityChanged};
use crate::drag::{BorderInteraction, OpenZoneEditor, ZoneEditMode, ZonePointer};
use crate::geometry::TileRect;
use crate::icons::IconRegistry;
use crate::world::ZoneWorld;
use crate::zone::{Zone, ZoneKey};
use crate::ZonesPlugin;

pub struct TestWorld {
    app: App,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Empty loaded world, no camera, edit mode off.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(ZonesPlugin);
        app.init_resource::<ButtonInput<MouseButton>>();
        app.insert_resource(ZoneWorld::default());
        app.update();
        Self { app }
    }

    /// Wraps an app that already has its plugins added.
    pub fn from_app(mut app: App) -> Self {
        if !app.world().contains_resource::<ButtonInput<MouseButton>>() {
            app.init_resource::<ButtonInput<MouseButton>>();
        }
        Self { app }
    }

    pub fn with_camera(mut self, position: Vec2, size: Vec2) -> Self {
        self.set_camera(position, size);
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.add_zone(zone);
        self
    }

    // -----------------------------------------------------------------------
    // Setup
    // -----------------------------------------------------------------------

    pub fn add_zone(&mut self, zone: Zone) -> ZoneKey {
        self.zones_mut().add_zone(zone)
    }

    /// Adds an already-confirmed zone owned by `tester`, without broadcasting.
    pub fn add_confirmed(&mut self, id: i64, rect: TileRect, priority: i32) -> ZoneKey {
        let mut zone = Zone::new_fresh(rect, "tester");
        zone.id = id;
        zone.set_priority(priority);
        self.zones_mut().add_zone_local(zone)
    }

    pub fn set_camera(&mut self, position: Vec2, size: Vec2) {
        self.app
            .world_mut()
            .insert_resource(ZoneCamera::new(position, size));
    }

    pub fn remove_camera(&mut self) {
        self.app.world_mut().remove_resource::<ZoneCamera>();
    }

    /// Moves the pointer (world pixels) and arms edit mode for the next tick.
    pub fn point_at(&mut self, world_pos: Vec2) {
        let world = self.app.world_mut();
        world.resource_mut::<ZonePointer>().world_pos = world_pos;
        world.resource_mut::<ZoneEditMode>().enabled = true;
    }

    pub fn set_over_ui(&mut self, over_ui: bool) {
        self.app.world_mut().resource_mut::<ZonePointer>().over_ui = over_ui;
    }

    pub fn press(&mut self, button: MouseButton) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(button);
    }

    pub fn release(&mut self, button: MouseButton) {
        self.app
            .world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .release(button);
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
            self.app
                .world_mut()
                .resource_mut::<ButtonInput<MouseButton>>()
                .clear();
        }
    }

    /// Points at `world_pos` with edit mode armed and runs one tick.
    pub fn drag_tick(&mut self, world_pos: Vec2) {
        self.point_at(world_pos);
        self.tick(1);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn zones(&self) -> &ZoneWorld {
        self.resource::<ZoneWorld>()
    }

    pub fn zones_mut(&mut self) -> Mut<'_, ZoneWorld> {
        self.app.world_mut().resource_mut::<ZoneWorld>()
    }

    pub fn icons_mut(&mut self) -> Mut<'_, IconRegistry> {
        self.app.world_mut().resource_mut::<IconRegistry>()
    }

    pub fn zone(&self, key: ZoneKey) -> &Zone {
        self.zones()
            .get(key)
            .unwrap_or_else(|| panic!("zone {key:?} is not live"))
    }

    pub fn interaction(&self) -> BorderInteraction {
        *self.resource::<BorderInteraction>()
    }

    /// Drains every event of type `E` sent since the last drain.
    pub fn drain_events<E: Event + Clone>(&mut self) -> Vec<E> {
        self.app
            .world_mut()
            .resource_mut::<Events<E>>()
            .drain()
            .collect()
    }

    pub fn visibility_events(&mut self) -> Vec<ZoneVisibilityChanged> {
        self.drain_events::<ZoneVisibilityChanged>()
    }

    pub fn editor_events(&mut self) -> Vec<OpenZoneEditor> {
        self.drain_events::<OpenZoneEditor>()
    }
}
