use bevy::prelude::*;
use zones::{BorderInteraction, ZoneSettings, ZoneWorld};

/// Inserts an empty zone world, replacing the current one.
pub(crate) fn exclusive_new_world(world: &mut World) {
    let settings = world
        .get_resource::<ZoneSettings>()
        .cloned()
        .unwrap_or_default();
    world.insert_resource(ZoneWorld::new(&settings));
    reset_interaction(world);
    info!("New zone world");
}

pub(crate) fn exclusive_unload(world: &mut World) {
    if world.remove_resource::<ZoneWorld>().is_some() {
        info!("Zone world unloaded");
    }
    reset_interaction(world);
}

// A drag in progress refers to zones of the old world.
fn reset_interaction(world: &mut World) {
    if let Some(mut interaction) = world.get_resource_mut::<BorderInteraction>() {
        *interaction = BorderInteraction::default();
    }
}
