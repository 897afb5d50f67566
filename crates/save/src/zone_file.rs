//! On-disk zone list.
//!
//! Binary files are a bitcode-encoded [`SaveZoneList`] behind the header from
//! `file_header`. Paths ending in `.json` hold the same list as
//! human-readable JSON with no header.

use std::path::Path;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use zones::record::ZoneRecord;
use zones::ZoneWorld;

use crate::file_header::{unwrap_header, wrap_with_header};
use crate::save_error::SaveError;

/// Record schema version. Bump when `ZoneRecord` changes shape.
pub const CURRENT_ZONE_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct SaveZoneList {
    pub version: u32,
    pub zones: Vec<ZoneRecord>,
}

impl SaveZoneList {
    /// Every confirmed, live zone of `world`.
    pub fn from_world(world: &ZoneWorld) -> Self {
        Self {
            version: CURRENT_ZONE_FILE_VERSION,
            zones: world.records(),
        }
    }

    fn check_version(self) -> Result<Self, SaveError> {
        if self.version > CURRENT_ZONE_FILE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected_max: CURRENT_ZONE_FILE_VERSION,
                found: self.version,
            });
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneFileFormat {
    /// Headered, lz4-compressed bitcode.
    Binary,
    Json,
}

impl ZoneFileFormat {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ZoneFileFormat::Json,
            _ => ZoneFileFormat::Binary,
        }
    }
}

pub fn encode_zone_file(list: &SaveZoneList, format: ZoneFileFormat) -> Result<Vec<u8>, SaveError> {
    match format {
        ZoneFileFormat::Binary => Ok(wrap_with_header(&bitcode::encode(list), true)),
        ZoneFileFormat::Json => {
            serde_json::to_vec_pretty(list).map_err(|e| SaveError::Encode(e.to_string()))
        }
    }
}

pub fn decode_zone_file(bytes: &[u8], format: ZoneFileFormat) -> Result<SaveZoneList, SaveError> {
    let list: SaveZoneList = match format {
        ZoneFileFormat::Binary => {
            let (_, payload) = unwrap_header(bytes)?;
            bitcode::decode(&payload)?
        }
        ZoneFileFormat::Json => serde_json::from_slice(bytes)?,
    };
    list.check_version()
}

/// Confirmed zones of `world` as a pretty-printed JSON zone list.
pub fn zones_to_json(world: &ZoneWorld) -> Result<String, SaveError> {
    serde_json::to_string_pretty(&SaveZoneList::from_world(world))
        .map_err(|e| SaveError::Encode(e.to_string()))
}

/// Records of a JSON zone list. Validation happens on `load_records`.
pub fn zones_from_json(json: &str) -> Result<Vec<ZoneRecord>, SaveError> {
    let list: SaveZoneList = serde_json::from_str(json)?;
    Ok(list.check_version()?.zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use zones::{Rgb, TileRect};

    fn record(id: i64, title: &str) -> ZoneRecord {
        ZoneRecord {
            id,
            rect: TileRect::new(id as i32, 0, 2, 2),
            owner: "mayor".into(),
            priority: 0,
            title: title.into(),
            subtitle: "sub".into(),
            title_color: Rgb::WHITE,
            title_stroke: Rgb::BLACK,
            icon: None,
        }
    }

    fn list() -> SaveZoneList {
        SaveZoneList {
            version: CURRENT_ZONE_FILE_VERSION,
            zones: vec![record(1, "North"), record(2, "South")],
        }
    }

    #[test]
    fn test_format_follows_extension() {
        assert_eq!(
            ZoneFileFormat::for_path(&PathBuf::from("a/zones.JSON")),
            ZoneFileFormat::Json
        );
        assert_eq!(
            ZoneFileFormat::for_path(&PathBuf::from("zones.bin")),
            ZoneFileFormat::Binary
        );
        assert_eq!(
            ZoneFileFormat::for_path(&PathBuf::from("zones")),
            ZoneFileFormat::Binary
        );
    }

    #[test]
    fn test_binary_file_starts_with_magic() {
        let bytes = encode_zone_file(&list(), ZoneFileFormat::Binary).unwrap();
        assert_eq!(&bytes[..4], b"ZONE");
        assert_eq!(decode_zone_file(&bytes, ZoneFileFormat::Binary).unwrap(), list());
    }

    #[test]
    fn test_json_file_is_readable() {
        let bytes = encode_zone_file(&list(), ZoneFileFormat::Json).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("\"North\""), "got: {text}");
        assert_eq!(decode_zone_file(&bytes, ZoneFileFormat::Json).unwrap(), list());
    }

    #[test]
    fn test_json_without_optional_fields_loads() {
        let json = r#"{"version":1,"zones":[{"id":5,"rect":{"x":0,"y":0,"width":1,"height":1},
            "owner":"o","priority":2,"title":"T",
            "title_color":{"r":255,"g":255,"b":255},"title_stroke":{"r":0,"g":0,"b":0}}]}"#;
        let list = decode_zone_file(json.as_bytes(), ZoneFileFormat::Json).unwrap();
        assert_eq!(list.zones[0].subtitle, "");
        assert!(list.zones[0].icon.is_none());
    }

    #[test]
    fn test_world_json_export_skips_fresh_zones() {
        let mut world = ZoneWorld::default();
        let mut icons = zones::IconRegistry::with_builtin_sources();
        world.load_records(&[record(4, "Harbor")], &mut icons);
        world.add_zone_local(zones::Zone::new_fresh(TileRect::new(0, 0, 1, 1), "me"));

        let json = zones_to_json(&world).unwrap();
        let records = zones_from_json(&json).unwrap();
        assert_eq!(records, vec![record(4, "Harbor")]);
    }

    #[test]
    fn test_newer_list_version_rejected() {
        let mut future = list();
        future.version = CURRENT_ZONE_FILE_VERSION + 1;
        let bytes = encode_zone_file(&future, ZoneFileFormat::Binary).unwrap();
        assert!(matches!(
            decode_zone_file(&bytes, ZoneFileFormat::Binary),
            Err(SaveError::VersionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_payload_is_decode_error() {
        let bytes = wrap_with_header(&[], false);
        assert!(matches!(
            decode_zone_file(&bytes, ZoneFileFormat::Binary),
            Err(SaveError::Decode(_))
        ));
    }
}
