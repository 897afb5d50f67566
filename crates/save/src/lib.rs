//! Zone persistence: a headered binary (or JSON) zone file and the events
//! that create, load, save and unload the `ZoneWorld` resource.

mod atomic_write;
mod exclusive_load;
mod exclusive_new_world;
mod exclusive_ops;
mod exclusive_save;
pub mod file_header;
mod save_error;
mod save_plugin;
pub mod zone_file;


pub use save_error::SaveError;
pub use save_plugin::{
    LoadZonesEvent, NewZoneWorldEvent, SaveZonesEvent, UnloadZoneWorldEvent, ZoneFileOutcome,
    ZoneSavePlugin,
};
pub use zone_file::{
    decode_zone_file, encode_zone_file, zones_from_json, zones_to_json, SaveZoneList,
    ZoneFileFormat,
};
