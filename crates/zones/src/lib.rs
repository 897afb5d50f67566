use bevy::prelude::*;

pub mod binary;
pub mod config;
pub mod culling;
pub mod descriptor;
pub mod display_state;
pub mod drag;
pub mod geometry;
pub mod icons;
pub mod record;
pub mod sets;
pub mod spatial_index;
pub mod world;
pub mod zone;

#[cfg(test)]
mod integration_tests;
#[cfg(any(test, feature = "harness"))]
pub mod test_harness;

pub use config::ZoneSettings;
pub use culling::{ZoneCamera, ZoneVisibilityChanged};
pub use drag::{BorderInteraction, OpenZoneEditor, ZoneEditMode, ZonePointer};
pub use geometry::{BorderMask, TileRect};
pub use icons::{IconRef, IconRegistry};
pub use sets::ZoneSet;
pub use world::{ZoneChange, ZoneWorld};
pub use zone::{Edge, Rgb, Zone, ZoneError, ZoneKey, ZoneVisual};

pub fn zone_housekeeping(mut world: ResMut<ZoneWorld>) {
    world.housekeeping();
}

/// Core zone systems: housekeeping, culling and edge dragging.
///
/// The `ZoneWorld` resource itself is inserted by whoever loads a world
/// (see the save crate); until then every zone system is skipped.
pub struct ZonesPlugin;

impl Plugin for ZonesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ZoneSettings>()
            .init_resource::<ZonePointer>()
            .init_resource::<ZoneEditMode>()
            .init_resource::<BorderInteraction>()
            .add_event::<ZoneVisibilityChanged>()
            .add_event::<OpenZoneEditor>();

        if !app.world().contains_resource::<IconRegistry>() {
            app.insert_resource(IconRegistry::with_builtin_sources());
        }

        app.configure_sets(
            Update,
            (
                ZoneSet::Housekeeping,
                ZoneSet::Receive,
                ZoneSet::Culling,
                ZoneSet::Edit,
                ZoneSet::Send,
            )
                .chain(),
        );

        app.add_systems(
            Update,
            (
                zone_housekeeping.in_set(ZoneSet::Housekeeping),
                culling::cull_zones.in_set(ZoneSet::Culling),
                drag::drag_zone_edges.in_set(ZoneSet::Edit),
            )
                .run_if(resource_exists::<ZoneWorld>),
        );
    }
}
