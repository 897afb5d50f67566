//! Opaque icon handles and the explicit icon-source registration table.
//!
//! The zone core never interprets an icon: it stores an [`IconRef`], forwards
//! it through save files and the wire protocol, and asks it for a texture
//! when a renderer wants one. Sources are registered by tag at startup with
//! [`IconRegistry::register_source`]; there is no discovery.
//!
//! Loaded icons are interned by id, so two zones referring to the same
//! resource share one handle.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::binary::{ByteReader, ByteWriter, DecodeError};

pub type IconRef = Arc<dyn IconHandle>;

/// Description of a ready image the renderer can resolve through its asset server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconImage {
    pub asset_path: String,
    /// Sub-rectangle of the source image as `(x, y, width, height)` pixels.
    pub frame: Option<(u32, u32, u32, u32)>,
}

/// Readiness of an icon's texture. Never blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconTexture {
    Ready(IconImage),
    /// Still being fetched; draw a loading placeholder.
    Loading,
    /// The source gave up; the string is shown to the user.
    Failed(String),
}

/// Capability every icon handle exposes.
pub trait IconHandle: Send + Sync + fmt::Debug {
    /// Resource identity. Handles with equal ids are the same icon.
    fn id(&self) -> &str;
    /// Tag of the source that can reconstruct this handle.
    fn source_tag(&self) -> &str;
    /// Source-specific fields for the tagged (save file) form.
    fn save_fields(&self, fields: &mut BTreeMap<String, String>);
    /// Source-specific fields for the binary (wire) form.
    fn write_fields(&self, writer: &mut ByteWriter);
    fn texture(&self) -> IconTexture;
    fn name(&self) -> Option<String>;
}

/// One registered icon source: constructs handles from each serialized form.
pub trait IconSource: Send + Sync {
    fn tag(&self) -> &'static str;
    fn construct(&self, id: &str, fields: &BTreeMap<String, String>) -> Option<IconRef>;
    /// Must consume exactly the fields written by `IconHandle::write_fields`,
    /// even when the result is discarded in favour of an interned handle.
    fn read_fields(&self, id: &str, reader: &mut ByteReader) -> Result<Option<IconRef>, DecodeError>;
    /// Builds a handle from the remainder of a raw `"<tag> <rest>"` descriptor.
    fn construct_raw(&self, rest: &str) -> Option<IconRef>;
}

/// Tagged form of an icon: `{ id, source, ...fields }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct IconRecord {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

impl IconRecord {
    pub fn from_handle(handle: &dyn IconHandle) -> Self {
        let mut fields = BTreeMap::new();
        handle.save_fields(&mut fields);
        Self {
            id: handle.id().to_string(),
            source: handle.source_tag().to_string(),
            fields,
        }
    }
}

/// Writes `[id][sourceTag][fields...]` for a handle.
pub fn write_icon(handle: &dyn IconHandle, writer: &mut ByteWriter) {
    writer.write_str(handle.id());
    writer.write_str(handle.source_tag());
    handle.write_fields(writer);
}

/// Registration table plus the interned set of loaded icons.
#[derive(Resource, Default)]
pub struct IconRegistry {
    sources: HashMap<String, Box<dyn IconSource>>,
    loaded: Vec<IconRef>,
}

impl IconRegistry {
    /// Registry with the built-in `misc` source registered.
    pub fn with_builtin_sources() -> Self {
        let mut registry = Self::default();
        registry.register_source(KeyedIconSource::misc());
        registry
    }

    pub fn register_source(&mut self, source: impl IconSource + 'static) {
        let tag = source.tag().to_string();
        if self.sources.contains_key(&tag) {
            warn!("IconRegistry: duplicate source tag '{}', ignoring", tag);
            return;
        }
        self.sources.insert(tag, Box::new(source));
    }

    pub fn has_source(&self, tag: &str) -> bool {
        self.sources.contains_key(tag)
    }

    pub fn loaded(&self) -> &[IconRef] {
        &self.loaded
    }

    pub fn get_loaded(&self, id: &str) -> Option<IconRef> {
        self.loaded.iter().find(|icon| icon.id() == id).cloned()
    }

    /// Returns the already-loaded handle with the same id, or registers `handle`.
    pub fn intern(&mut self, handle: IconRef) -> IconRef {
        if let Some(existing) = self.get_loaded(handle.id()) {
            return existing;
        }
        self.loaded.push(handle.clone());
        handle
    }

    /// Resolves `"<tag> <rest>"`. Blank input or an unknown tag yields `None`.
    pub fn resolve_raw(&mut self, raw: &str) -> Option<IconRef> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        let (tag, rest) = match raw.split_once(' ') {
            Some((tag, rest)) => (tag, rest),
            None => (raw, ""),
        };
        let handle = self.sources.get(tag)?.construct_raw(rest)?;
        Some(self.intern(handle))
    }

    pub fn resolve_record(&mut self, record: &IconRecord) -> Option<IconRef> {
        if let Some(existing) = self.get_loaded(&record.id) {
            return Some(existing);
        }
        let source = self.sources.get(&record.source)?;
        let handle = source.construct(&record.id, &record.fields)?;
        Some(self.intern(handle))
    }

    /// Reads `[id][sourceTag][fields...]` as written by [`write_icon`].
    pub fn read_icon(&mut self, reader: &mut ByteReader) -> Result<Option<IconRef>, DecodeError> {
        let id = reader.read_string()?;
        let tag = reader.read_string()?;
        let source = self
            .sources
            .get(&tag)
            .ok_or_else(|| DecodeError::UnknownIconSource(tag.clone()))?;
        let decoded = source.read_fields(&id, reader)?;
        if let Some(existing) = self.get_loaded(&id) {
            return Ok(Some(existing));
        }
        Ok(decoded.map(|handle| self.intern(handle)))
    }
}

// ---------------------------------------------------------------------------
// Built-in keyed source
// ---------------------------------------------------------------------------

/// Icon backed by a fixed key table (`misc` source).
#[derive(Debug)]
pub struct KeyedIcon {
    id: String,
    tag: &'static str,
    key: String,
    name: String,
    image: IconImage,
}

impl KeyedIcon {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl IconHandle for KeyedIcon {
    fn id(&self) -> &str {
        &self.id
    }

    fn source_tag(&self) -> &str {
        self.tag
    }

    fn save_fields(&self, fields: &mut BTreeMap<String, String>) {
        fields.insert("key".to_string(), self.key.clone());
    }

    fn write_fields(&self, writer: &mut ByteWriter) {
        writer.write_str(&self.key);
    }

    fn texture(&self) -> IconTexture {
        IconTexture::Ready(self.image.clone())
    }

    fn name(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

struct KeyedEntry {
    name: &'static str,
    asset_path: &'static str,
    frame: Option<(u32, u32, u32, u32)>,
}

/// Source resolving short keys against a static table of images.
pub struct KeyedIconSource {
    tag: &'static str,
    entries: BTreeMap<&'static str, KeyedEntry>,
}

impl KeyedIconSource {
    pub fn misc() -> Self {
        let table: [(&'static str, &'static str, &'static str, Option<(u32, u32, u32, u32)>); 12] = [
            ("camera", "Camera", "icons/ui/camera.png", None),
            ("settings", "Settings", "icons/ui/settings.png", None),
            ("folder", "Folder", "icons/ui/folder.png", None),
            ("house", "House", "icons/ui/house.png", None),
            ("hammer", "Hammer", "icons/ui/hammer.png", None),
            ("heart", "Heart", "icons/ui/heart.png", None),
            ("lock", "Lock", "icons/ui/lock.png", None),
            ("public", "Public", "icons/ui/public.png", None),
            ("tag", "Tag", "icons/ui/tag.png", None),
            ("exclamation_mark", "Exclamation Mark", "icons/ui/exclamation.png", None),
            ("peace_red", "Peace Red", "icons/ui/pvp.png", Some((0, 38, 36, 36))),
            ("war_red", "War Red", "icons/ui/pvp.png", Some((76, 38, 36, 36))),
        ];
        let entries = table
            .into_iter()
            .map(|(key, name, asset_path, frame)| {
                (
                    key,
                    KeyedEntry {
                        name,
                        asset_path,
                        frame,
                    },
                )
            })
            .collect();
        Self {
            tag: "misc",
            entries,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    fn id_for(&self, key: &str) -> String {
        format!("{}_{}", self.tag, key)
    }

    fn build(&self, key: &str) -> Option<IconRef> {
        let entry = self.entries.get(key)?;
        Some(Arc::new(KeyedIcon {
            id: self.id_for(key),
            tag: self.tag,
            key: key.to_string(),
            name: entry.name.to_string(),
            image: IconImage {
                asset_path: entry.asset_path.to_string(),
                frame: entry.frame,
            },
        }))
    }
}

impl IconSource for KeyedIconSource {
    fn tag(&self) -> &'static str {
        self.tag
    }

    fn construct(&self, _id: &str, fields: &BTreeMap<String, String>) -> Option<IconRef> {
        self.build(fields.get("key")?)
    }

    fn read_fields(&self, _id: &str, reader: &mut ByteReader) -> Result<Option<IconRef>, DecodeError> {
        let key = reader.read_string()?;
        Ok(self.build(&key))
    }

    fn construct_raw(&self, rest: &str) -> Option<IconRef> {
        self.build(rest.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_raw_interns_by_id() {
        let mut registry = IconRegistry::with_builtin_sources();
        let a = registry.resolve_raw("misc house").unwrap();
        let b = registry.resolve_raw("  misc house ").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.id(), "misc_house");
        assert_eq!(a.name().as_deref(), Some("House"));
        assert_eq!(registry.loaded().len(), 1);
    }

    #[test]
    fn test_resolve_raw_rejects_unknown() {
        let mut registry = IconRegistry::with_builtin_sources();
        assert!(registry.resolve_raw("").is_none());
        assert!(registry.resolve_raw("url http://example.com/a.png").is_none());
        assert!(registry.resolve_raw("misc no_such_key").is_none());
    }

    #[test]
    fn test_record_reconstructs_same_resource() {
        let mut registry = IconRegistry::with_builtin_sources();
        let icon = registry.resolve_raw("misc war_red").unwrap();
        let record = IconRecord::from_handle(icon.as_ref());
        assert_eq!(record.source, "misc");
        assert_eq!(record.fields.get("key").map(String::as_str), Some("war_red"));

        let mut fresh = IconRegistry::with_builtin_sources();
        let restored = fresh.resolve_record(&record).unwrap();
        assert_eq!(restored.id(), icon.id());
        assert_eq!(restored.texture(), icon.texture());
        assert_eq!(restored.name(), icon.name());
    }

    #[test]
    fn test_binary_read_consumes_fields_when_interned() {
        let mut registry = IconRegistry::with_builtin_sources();
        let icon = registry.resolve_raw("misc lock").unwrap();

        let mut w = ByteWriter::new();
        write_icon(icon.as_ref(), &mut w);
        w.write_i32(77);

        let mut r = ByteReader::new(w.as_slice());
        let read = registry.read_icon(&mut r).unwrap().unwrap();
        assert!(Arc::ptr_eq(&read, &icon));
        assert_eq!(r.read_i32().unwrap(), 77);
    }

    #[test]
    fn test_binary_read_unknown_source_errors() {
        let mut w = ByteWriter::new();
        w.write_str("bestiary_12");
        w.write_str("bestiary");
        let mut registry = IconRegistry::with_builtin_sources();
        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(
            registry.read_icon(&mut r).unwrap_err(),
            DecodeError::UnknownIconSource("bestiary".to_string())
        );
    }
}
