use std::path::PathBuf;

use bevy::prelude::*;
use zones::ZoneSet;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Replaces the current zone world (if any) with an empty one.
#[derive(Event, Debug, Clone)]
pub struct NewZoneWorldEvent;

#[derive(Event, Debug, Clone)]
pub struct LoadZonesEvent {
    pub path: PathBuf,
}

#[derive(Event, Debug, Clone)]
pub struct SaveZonesEvent {
    pub path: PathBuf,
}

/// Drops the zone world. Zone systems are skipped until a new one is loaded.
#[derive(Event, Debug, Clone)]
pub struct UnloadZoneWorldEvent;

/// Result of one zone file operation, sent after it completes.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum ZoneFileOutcome {
    Created,
    Loaded { path: PathBuf, zones: usize },
    Saved { path: PathBuf, zones: usize },
    Unloaded,
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// Buffer resources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ZoneFileOp {
    Save(PathBuf),
    Unload,
    New,
    Load(PathBuf),
}

/// Operations collected this frame, in execution order.
#[derive(Resource, Default)]
pub(crate) struct PendingZoneFileOps(pub(crate) Vec<ZoneFileOp>);

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

pub struct ZoneSavePlugin;

impl Plugin for ZoneSavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<NewZoneWorldEvent>()
            .add_event::<LoadZonesEvent>()
            .add_event::<SaveZonesEvent>()
            .add_event::<UnloadZoneWorldEvent>()
            .add_event::<ZoneFileOutcome>()
            .init_resource::<PendingZoneFileOps>();

        // Event detection is a lightweight system; the work itself runs in an
        // exclusive system so the world resource can be swapped immediately,
        // before any zone system of the same frame.
        app.add_systems(
            Update,
            (
                detect_zone_file_events,
                crate::exclusive_ops::exclusive_zone_file_ops,
            )
                .chain()
                .before(ZoneSet::Housekeeping),
        );
    }
}

// ---------------------------------------------------------------------------
// Event detection
// ---------------------------------------------------------------------------

/// Queues this frame's requests. Saves run first so they capture the world
/// as it was before any unload, new or load requested alongside them.
fn detect_zone_file_events(
    mut saves: EventReader<SaveZonesEvent>,
    mut unloads: EventReader<UnloadZoneWorldEvent>,
    mut news: EventReader<NewZoneWorldEvent>,
    mut loads: EventReader<LoadZonesEvent>,
    mut pending: ResMut<PendingZoneFileOps>,
) {
    pending
        .0
        .extend(saves.read().map(|e| ZoneFileOp::Save(e.path.clone())));
    if unloads.read().count() > 0 {
        pending.0.push(ZoneFileOp::Unload);
    }
    if news.read().count() > 0 {
        pending.0.push(ZoneFileOp::New);
    }
    // Only the last load matters; earlier ones would be replaced anyway.
    if let Some(load) = loads.read().last() {
        pending.0.push(ZoneFileOp::Load(load.path.clone()));
    }
}
