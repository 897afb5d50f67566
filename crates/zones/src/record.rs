//! Flat persisted form of a zone.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::geometry::TileRect;
use crate::icons::{IconRecord, IconRegistry};
use crate::world::ZoneWorld;
use crate::zone::{Rgb, Zone, ZoneVisual};

/// One saved zone. Field composition matches the wire `rect + visual` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ZoneRecord {
    pub id: i64,
    pub rect: TileRect,
    pub owner: String,
    pub priority: i32,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub title_color: Rgb,
    pub title_stroke: Rgb,
    #[serde(default)]
    pub icon: Option<IconRecord>,
}

impl ZoneRecord {
    pub fn from_zone(zone: &Zone) -> Self {
        Self {
            id: zone.id(),
            rect: zone.rect(),
            owner: zone.owner.clone(),
            priority: zone.priority(),
            title: zone.title().to_string(),
            subtitle: zone.subtitle.clone(),
            title_color: zone.title_color,
            title_stroke: zone.title_stroke,
            icon: zone
                .icon
                .as_ref()
                .map(|icon| IconRecord::from_handle(icon.as_ref())),
        }
    }

    /// Rebuilds a zone. The rectangle is assigned without clamping so that
    /// `check_errors` sees exactly what was stored.
    pub fn to_zone(&self, icons: &mut IconRegistry) -> Zone {
        let mut zone = Zone::with_id(self.id);
        zone.set_rect_silent(self.rect);
        let icon = self.icon.as_ref().and_then(|record| {
            let resolved = icons.resolve_record(record);
            if resolved.is_none() {
                warn!(
                    "Zone {}: icon '{}' from source '{}' could not be restored",
                    self.id, record.id, record.source
                );
            }
            resolved
        });
        zone.apply_visual(ZoneVisual {
            owner: self.owner.clone(),
            priority: self.priority,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            title_color: self.title_color,
            title_stroke: self.title_stroke,
            icon,
        });
        zone
    }
}

impl ZoneWorld {
    /// Records of every confirmed, live zone in list order.
    pub fn records(&self) -> Vec<ZoneRecord> {
        self.iter()
            .filter(|zone| !zone.is_fresh())
            .map(ZoneRecord::from_zone)
            .collect()
    }

    /// Adds every valid record without broadcasting. Invalid records and
    /// duplicates of an already-present id are dropped with a warning.
    /// Returns the number of zones added.
    pub fn load_records(&mut self, records: &[ZoneRecord], icons: &mut IconRegistry) -> usize {
        let mut zones = Vec::with_capacity(records.len());
        for record in records {
            let zone = record.to_zone(icons);
            let errors = zone.check_errors();
            if !errors.is_empty() {
                let keys: Vec<&str> = errors.iter().map(|e| e.key()).collect();
                warn!("Dropping saved zone {}: {}", record.id, keys.join(", "));
                continue;
            }
            if record.id == 0 {
                warn!("Dropping saved zone without an id");
                continue;
            }
            let duplicate = self.find_by_id(record.id).is_some()
                || zones.iter().any(|z: &Zone| z.id() == record.id);
            if duplicate {
                warn!("Dropping saved zone {}: duplicate id", record.id);
                continue;
            }
            zones.push(zone);
        }
        let added = zones.len();
        self.add_zones_local(zones);
        added
    }
}
