use std::path::Path;

use bevy::prelude::*;
use zones::{IconRegistry, ZoneSettings, ZoneWorld};

use crate::save_error::SaveError;
use crate::zone_file::{decode_zone_file, ZoneFileFormat};

/// Reads `path` and replaces the zone world with its contents. The current
/// world is left untouched if anything fails before the swap.
///
/// Returns the number of zones loaded; invalid records are dropped.
pub(crate) fn exclusive_load(world: &mut World, path: &Path) -> Result<usize, SaveError> {
    let bytes = std::fs::read(path)?;

    // -- Stage 1: Validate and decode --
    let list = decode_zone_file(&bytes, ZoneFileFormat::for_path(path))?;
    info!(
        "Zone file {}: v{}, {} record(s)",
        path.display(),
        list.version,
        list.zones.len()
    );

    // -- Stage 2: Build the replacement world off to the side --
    let settings = world
        .get_resource::<ZoneSettings>()
        .cloned()
        .unwrap_or_default();
    let mut zones = ZoneWorld::new(&settings);
    let loaded = {
        let mut icons = world
            .get_resource_mut::<IconRegistry>()
            .ok_or_else(|| SaveError::MissingResource("IconRegistry".to_string()))?;
        zones.load_records(&list.zones, &mut icons)
    };
    if loaded < list.zones.len() {
        warn!(
            "Dropped {} invalid zone(s) from {}",
            list.zones.len() - loaded,
            path.display()
        );
    }

    // -- Stage 3: Swap --
    world.insert_resource(zones);
    info!("Loaded {} zone(s) from {}", loaded, path.display());
    Ok(loaded)
}
