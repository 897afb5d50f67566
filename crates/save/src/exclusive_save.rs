use std::path::Path;

use bevy::prelude::*;
use zones::ZoneWorld;

use crate::atomic_write::atomic_write;
use crate::save_error::SaveError;
use crate::zone_file::{encode_zone_file, SaveZoneList, ZoneFileFormat};

/// Writes every confirmed zone to `path`. Fresh zones still being placed are
/// not saved. Returns the number of zones written.
pub(crate) fn exclusive_save(world: &mut World, path: &Path) -> Result<usize, SaveError> {
    let zones = world
        .get_resource::<ZoneWorld>()
        .ok_or_else(|| SaveError::MissingResource("ZoneWorld".to_string()))?;
    let list = SaveZoneList::from_world(zones);
    let bytes = encode_zone_file(&list, ZoneFileFormat::for_path(path))?;
    atomic_write(path, &bytes)?;
    info!(
        "Saved {} zone(s) to {} ({} bytes)",
        list.zones.len(),
        path.display(),
        bytes.len()
    );
    Ok(list.zones.len())
}
