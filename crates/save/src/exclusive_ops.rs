use bevy::prelude::*;

use crate::exclusive_load::exclusive_load;
use crate::exclusive_new_world::{exclusive_new_world, exclusive_unload};
use crate::exclusive_save::exclusive_save;
use crate::save_plugin::{PendingZoneFileOps, ZoneFileOp, ZoneFileOutcome};

/// Runs every queued zone file operation with full world access and reports
/// each result as a [`ZoneFileOutcome`].
pub(crate) fn exclusive_zone_file_ops(world: &mut World) {
    let ops = std::mem::take(&mut world.resource_mut::<PendingZoneFileOps>().0);
    for op in ops {
        let outcome = match op {
            ZoneFileOp::Save(path) => match exclusive_save(world, &path) {
                Ok(zones) => ZoneFileOutcome::Saved { path, zones },
                Err(e) => failed(format!("Save to {} failed: {e}", path.display())),
            },
            ZoneFileOp::Unload => {
                exclusive_unload(world);
                ZoneFileOutcome::Unloaded
            }
            ZoneFileOp::New => {
                exclusive_new_world(world);
                ZoneFileOutcome::Created
            }
            ZoneFileOp::Load(path) => match exclusive_load(world, &path) {
                Ok(zones) => ZoneFileOutcome::Loaded { path, zones },
                Err(e) => failed(format!("Load from {} failed: {e}", path.display())),
            },
        };
        world.send_event(outcome);
    }
}

fn failed(message: String) -> ZoneFileOutcome {
    error!("{message}");
    ZoneFileOutcome::Failed { message }
}
