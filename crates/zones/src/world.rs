//! `ZoneWorld` – the authoritative zone list of one loaded world.
//!
//! Inserted as a resource on world load and removed on unload. Owns the live
//! list, the spatial index over it, the visible set maintained by culling, and
//! the outbox of changes waiting to be broadcast.
//!
//! Removal is deferred: `remove_zone_local` only marks a zone as trashed, and
//! `housekeeping` compacts the list at the start of the next tick. Queries
//! skip trashed zones in the meantime.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;

use crate::config::ZoneSettings;
use crate::display_state::{FixedAdvanceMeasure, TextMeasure};
use crate::geometry::{BorderMask, TileRect};
use crate::spatial_index::ZoneIndex;
use crate::zone::{Edge, Zone, ZoneKey, ZoneVisual};

/// A local change waiting to be broadcast to peers.
///
/// Payloads are snapshots taken when the change was made.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneChange {
    AddOrUpdate {
        id: i64,
        rect: TileRect,
        visual: ZoneVisual,
    },
    Rect {
        id: i64,
        rect: TileRect,
    },
    Visual {
        id: i64,
        visual: ZoneVisual,
    },
    Remove {
        id: i64,
    },
}

impl ZoneChange {
    pub fn zone_id(&self) -> i64 {
        match self {
            ZoneChange::AddOrUpdate { id, .. }
            | ZoneChange::Rect { id, .. }
            | ZoneChange::Visual { id, .. }
            | ZoneChange::Remove { id } => *id,
        }
    }
}

#[derive(Resource)]
pub struct ZoneWorld {
    pub(crate) zones: Vec<Zone>,
    pub(crate) index: ZoneIndex,
    pub(crate) visible: Vec<ZoneKey>,
    pub(crate) viewport: Option<TileRect>,
    pub(crate) measure: Arc<dyn TextMeasure>,
    outbox: Vec<ZoneChange>,
    sync_enabled: bool,
    next_key: u64,
    last_issued_id: i64,
}

impl Default for ZoneWorld {
    fn default() -> Self {
        Self::with_measure(Arc::new(FixedAdvanceMeasure::default()))
    }
}

impl ZoneWorld {
    pub fn new(settings: &ZoneSettings) -> Self {
        Self::with_measure(settings.measure.clone())
    }

    pub fn with_measure(measure: Arc<dyn TextMeasure>) -> Self {
        Self {
            zones: Vec::new(),
            index: ZoneIndex::default(),
            visible: Vec::new(),
            viewport: None,
            measure,
            outbox: Vec::new(),
            sync_enabled: false,
            next_key: 1,
            last_issued_id: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Sync gate
    // -----------------------------------------------------------------------

    /// Enables queuing of outgoing changes. Off in single-writer mode.
    pub fn set_sync_enabled(&mut self, enabled: bool) {
        self.sync_enabled = enabled;
        if !enabled {
            self.outbox.clear();
        }
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    /// Drains the changes queued since the last call.
    pub fn take_outbox(&mut self) -> Vec<ZoneChange> {
        std::mem::take(&mut self.outbox)
    }

    fn queue(&mut self, change: ZoneChange) {
        if self.sync_enabled && change.zone_id() != 0 {
            self.outbox.push(change);
        }
    }

    fn queue_full(&mut self, key: ZoneKey) {
        if let Some(zone) = self.get(key) {
            let change = ZoneChange::AddOrUpdate {
                id: zone.id(),
                rect: zone.rect(),
                visual: zone.visual(),
            };
            self.queue(change);
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Adds a zone and broadcasts it unless it is fresh.
    pub fn add_zone(&mut self, zone: Zone) -> ZoneKey {
        let key = self.add_zone_local(zone);
        self.queue_full(key);
        key
    }

    /// Adds a zone without broadcasting.
    pub fn add_zone_local(&mut self, zone: Zone) -> ZoneKey {
        let key = self.push_zone(zone);
        self.rebuild_index();
        key
    }

    /// Adds many zones with a single index rebuild, without broadcasting.
    pub fn add_zones_local(&mut self, zones: impl IntoIterator<Item = Zone>) -> Vec<ZoneKey> {
        let keys: Vec<ZoneKey> = zones.into_iter().map(|z| self.push_zone(z)).collect();
        if !keys.is_empty() {
            self.rebuild_index();
        }
        keys
    }

    fn push_zone(&mut self, mut zone: Zone) -> ZoneKey {
        let key = ZoneKey(self.next_key);
        self.next_key += 1;
        zone.key = key;
        zone.trashed = false;
        zone.display = None;
        if self.viewport.is_some_and(|view| view.intersects(&zone.rect())) {
            zone.materialize_display(self.measure.as_ref());
            self.visible.push(key);
        }
        if zone.id() != 0 {
            self.last_issued_id = self.last_issued_id.max(zone.id());
        }
        self.zones.push(zone);
        key
    }

    /// Broadcasts the removal, then trashes the zone.
    pub fn remove_zone(&mut self, key: ZoneKey) -> bool {
        let Some(id) = self.get(key).map(Zone::id) else {
            return false;
        };
        self.queue(ZoneChange::Remove { id });
        self.remove_zone_local(key)
    }

    /// Marks the zone trashed; it disappears at the next `housekeeping`.
    pub fn remove_zone_local(&mut self, key: ZoneKey) -> bool {
        match self.slot_of(key) {
            Some(slot) => {
                self.zones[slot].trashed = true;
                true
            }
            None => false,
        }
    }

    /// Flushes trashed zones from the live and visible lists. Returns how
    /// many were flushed; the index is rebuilt if any were.
    pub fn housekeeping(&mut self) -> usize {
        let before = self.zones.len();
        let mut flushed = Vec::new();
        self.zones.retain(|zone| {
            if zone.trashed {
                flushed.push(zone.key);
            }
            !zone.trashed
        });
        if flushed.is_empty() {
            return 0;
        }
        self.visible.retain(|key| !flushed.contains(key));
        self.rebuild_index();
        debug!("ZoneWorld: flushed {} trashed zone(s)", before - self.zones.len());
        flushed.len()
    }

    pub fn rebuild_index(&mut self) {
        self.index = ZoneIndex::build(&self.zones);
    }

    pub fn index(&self) -> &ZoneIndex {
        &self.index
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// Assigns a real id to a fresh zone and broadcasts it.
    pub fn confirm_zone(&mut self, key: ZoneKey) -> Option<i64> {
        let slot = self.slot_of(key)?;
        if !self.zones[slot].is_fresh() {
            return Some(self.zones[slot].id());
        }
        let id = self.issue_id();
        self.zones[slot].id = id;
        self.queue_full(key);
        Some(id)
    }

    /// Time-derived id in 100 ns ticks, unique among live zones.
    ///
    /// Ids count up from the last one seen. Once that reaches `i64::MAX`
    /// the search wraps around to the current time.
    fn issue_id(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos() / 100).unwrap_or(i64::MAX))
            .unwrap_or(0)
            .max(1);
        let start = self
            .last_issued_id
            .checked_add(1)
            .map_or(now, |next| now.max(next));
        let candidate = (start..=i64::MAX)
            .chain(now.min(start)..start)
            .find(|&id| !self.zones.iter().any(|z| z.id() == id))
            .unwrap_or(now);
        self.last_issued_id = candidate;
        candidate
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    fn slot_of(&self, key: ZoneKey) -> Option<usize> {
        self.zones
            .iter()
            .position(|z| z.key == key && !z.trashed)
    }

    pub fn get(&self, key: ZoneKey) -> Option<&Zone> {
        self.slot_of(key).map(|slot| &self.zones[slot])
    }

    /// Geometry changed through this handle is not indexed until
    /// `rebuild_index` runs; prefer the `set_zone_*` methods.
    pub fn get_mut(&mut self, key: ZoneKey) -> Option<&mut Zone> {
        self.slot_of(key).map(|slot| &mut self.zones[slot])
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Zone> {
        self.iter().find(|z| z.id() == id)
    }

    pub fn key_of(&self, id: i64) -> Option<ZoneKey> {
        self.find_by_id(id).map(Zone::key)
    }

    /// Looks a zone up by its `zone_<id>` string.
    pub fn find_by_key_string(&self, key: &str) -> Option<&Zone> {
        let id: i64 = key.strip_prefix("zone_")?.parse().ok()?;
        self.find_by_id(id)
    }

    /// Live (non-trashed) zones in list order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(|z| !z.trashed)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of zones that currently hold a display state.
    pub fn visible(&self) -> &[ZoneKey] {
        &self.visible
    }

    pub fn viewport(&self) -> Option<TileRect> {
        self.viewport
    }

    /// Highest-priority zone containing `tile`.
    pub fn zone_at_point(&self, tile: IVec2) -> Option<&Zone> {
        self.index
            .find_best(&self.zones, tile)
            .map(|slot| &self.zones[slot])
    }

    /// Every zone containing `tile`, in no particular order.
    pub fn zones_at_point(&self, tile: IVec2) -> Vec<&Zone> {
        self.index
            .find_all(&self.zones, tile)
            .into_iter()
            .map(|slot| &self.zones[slot])
            .collect()
    }

    /// Every zone containing `tile`, highest priority first.
    pub fn zones_at_point_by_priority(&self, tile: IVec2) -> Vec<&Zone> {
        let mut zones = self.zones_at_point(tile);
        zones.sort_by(|a, b| b.priority().cmp(&a.priority()));
        zones
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    pub fn set_zone_rect(&mut self, key: ZoneKey, rect: TileRect) -> bool {
        self.update_rect(key, true, |zone| zone.set_rect(rect))
    }

    pub fn set_zone_rect_local(&mut self, key: ZoneKey, rect: TileRect) -> bool {
        self.update_rect(key, false, |zone| zone.set_rect(rect))
    }

    /// Moves one edge, flipping the rectangle if it crosses the opposite edge.
    pub fn set_zone_edge(&mut self, key: ZoneKey, edge: Edge, value: i32) -> bool {
        self.update_rect(key, true, |zone| zone.set_edge(edge, value))
    }

    fn update_rect(
        &mut self,
        key: ZoneKey,
        broadcast: bool,
        mutate: impl FnOnce(&mut Zone) -> bool,
    ) -> bool {
        let Some(slot) = self.slot_of(key) else {
            return false;
        };
        if !mutate(&mut self.zones[slot]) {
            return false;
        }
        self.rebuild_index();
        if broadcast {
            let zone = &self.zones[slot];
            let change = ZoneChange::Rect {
                id: zone.id(),
                rect: zone.rect(),
            };
            self.queue(change);
        }
        true
    }

    pub fn set_zone_title(&mut self, key: ZoneKey, title: impl Into<String>) -> bool {
        let title = title.into();
        self.update_visual(key, true, |zone| zone.set_title(title))
    }

    pub fn set_zone_priority(&mut self, key: ZoneKey, priority: i32) -> bool {
        self.update_visual(key, true, |zone| zone.set_priority(priority))
    }

    pub fn set_zone_visual(&mut self, key: ZoneKey, visual: ZoneVisual) -> bool {
        self.update_visual(key, true, |zone| {
            zone.apply_visual(visual);
            true
        })
    }

    pub fn set_zone_visual_local(&mut self, key: ZoneKey, visual: ZoneVisual) -> bool {
        self.update_visual(key, false, |zone| {
            zone.apply_visual(visual);
            true
        })
    }

    /// `mutate` returns whether the visual changed at all.
    fn update_visual(
        &mut self,
        key: ZoneKey,
        broadcast: bool,
        mutate: impl FnOnce(&mut Zone) -> bool,
    ) -> bool {
        let Some(slot) = self.slot_of(key) else {
            return false;
        };
        let zone = &mut self.zones[slot];
        let before = (zone.title().to_string(), zone.priority());
        if !mutate(zone) {
            return false;
        }
        if before.0 != zone.title() || before.1 != zone.priority() {
            zone.refresh_layout(self.measure.as_ref());
        }
        if broadcast {
            let change = ZoneChange::Visual {
                id: zone.id(),
                visual: zone.visual(),
            };
            self.queue(change);
        }
        true
    }

    // -----------------------------------------------------------------------
    // Interactive placement
    // -----------------------------------------------------------------------

    /// Starts dragging `mask` edges of a zone, materializing its display
    /// state if it has none yet.
    pub fn start_drag_borders(&mut self, key: ZoneKey, mask: BorderMask, with_secondary: bool) -> bool {
        let Some(slot) = self.slot_of(key) else {
            return false;
        };
        let zone = &mut self.zones[slot];
        if zone.display.is_none() {
            zone.materialize_display(self.measure.as_ref());
            self.visible.push(key);
        }
        if let Some(display) = zone.display.as_mut() {
            display.set_drag(mask, with_secondary);
        }
        true
    }

    /// Creates a fresh 1x1 zone at `tile` and starts a secondary-button drag
    /// of its bottom-right corner.
    pub fn begin_placement(&mut self, tile: IVec2, owner: impl Into<String>) -> ZoneKey {
        let zone = Zone::new_fresh(TileRect::new(tile.x, tile.y, 1, 1), owner);
        let key = self.add_zone(zone);
        self.start_drag_borders(key, BorderMask::RIGHT | BorderMask::BOTTOM, true);
        key
    }

    /// Whether any zone has an edge being dragged.
    pub fn any_dragging(&self) -> bool {
        self.iter()
            .any(|z| z.display().is_some_and(|d| d.drag_any()))
    }
}
