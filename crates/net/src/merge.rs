//! Merge-on-receive rules.
//!
//! Messages are applied in arrival order with the `_local` world operations,
//! so nothing applied here is queued for broadcast again. Relaying is the
//! caller's decision, based on the return value of [`apply_message`].

use bevy::log::debug;
use zones::{Zone, ZoneWorld};

use crate::message::{SnapshotEntry, ZoneMessage};

/// Applies one message. Returns `true` when a hub should forward it.
///
/// Updates for ids this node has never seen are dropped silently, and so is
/// anything addressed to id 0, which only ever names local unconfirmed zones.
pub fn apply_message(world: &mut ZoneWorld, message: &ZoneMessage) -> bool {
    if message.zone_id() == Some(0) {
        debug!("Zone sync: dropped {:?} for unconfirmed id 0", message.message_type());
        return false;
    }
    match message {
        ZoneMessage::AddOrUpdate { id, rect, visual } => {
            match world.key_of(*id) {
                Some(key) => {
                    world.set_zone_rect_local(key, *rect);
                    world.set_zone_visual_local(key, visual.clone());
                }
                None => {
                    let mut zone = Zone::with_id(*id);
                    zone.set_rect(*rect);
                    zone.apply_visual(visual.clone());
                    world.add_zone_local(zone);
                }
            }
            true
        }
        ZoneMessage::ChangeRect { id, rect } => match world.key_of(*id) {
            Some(key) => {
                world.set_zone_rect_local(key, *rect);
                true
            }
            None => false,
        },
        ZoneMessage::ChangeVisual { id, visual } => match world.key_of(*id) {
            Some(key) => {
                world.set_zone_visual_local(key, visual.clone());
                true
            }
            None => false,
        },
        ZoneMessage::Remove { id } => match world.key_of(*id) {
            Some(key) => world.remove_zone_local(key),
            None => false,
        },
        ZoneMessage::Snapshot(entries) => {
            apply_snapshot(world, entries);
            false
        }
    }
}

/// Merges every entry with add-or-update semantics.
pub fn apply_snapshot(world: &mut ZoneWorld, entries: &[SnapshotEntry]) {
    for entry in entries {
        apply_message(
            world,
            &ZoneMessage::AddOrUpdate {
                id: entry.id,
                rect: entry.rect,
                visual: entry.visual.clone(),
            },
        );
    }
}

/// Every confirmed, live zone as a join snapshot.
pub fn encode_snapshot(world: &ZoneWorld) -> ZoneMessage {
    ZoneMessage::Snapshot(
        world
            .iter()
            .filter(|zone| !zone.is_fresh())
            .map(|zone| SnapshotEntry {
                id: zone.id(),
                rect: zone.rect(),
                visual: zone.visual(),
            })
            .collect(),
    )
}
