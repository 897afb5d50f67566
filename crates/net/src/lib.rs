//! Zone synchronization between nodes.
//!
//! Local edits queued in the `ZoneWorld` outbox are encoded and sent in
//! `ZoneSet::Send`; incoming messages are merged in `ZoneSet::Receive`. A
//! hub relays every applied message to all peers except its sender and sends
//! a full snapshot to each peer that joins.

use bevy::prelude::*;

use zones::{IconRegistry, ZoneSet, ZoneWorld};

pub mod loopback;
pub mod merge;
pub mod message;
pub mod transport;


pub use loopback::{LoopbackClient, LoopbackHub, LoopbackNetwork};
pub use merge::{apply_message, apply_snapshot, encode_snapshot};
pub use message::{decode_message, encode_message, MessageType, ZoneMessage};
pub use transport::{NetLink, NetRole, PeerId, SendTarget, Transport, TransportEvent};

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerJoined {
    pub peer: PeerId,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerLeft {
    pub peer: PeerId,
}

/// Keeps the world's outbox gate in step with the node's role.
fn sync_gate(mut world: ResMut<ZoneWorld>, link: Res<NetLink>) {
    let enabled = link.role.syncs();
    if world.sync_enabled() != enabled {
        world.set_sync_enabled(enabled);
    }
}

fn receive_zone_messages(
    mut world: ResMut<ZoneWorld>,
    mut link: ResMut<NetLink>,
    mut icons: ResMut<IconRegistry>,
    mut joined: EventWriter<PeerJoined>,
    mut left: EventWriter<PeerLeft>,
) {
    for event in link.poll() {
        match event {
            TransportEvent::Connected(peer) => {
                info!("Zone sync: {} joined", peer);
                joined.send(PeerJoined { peer });
            }
            TransportEvent::Disconnected(peer) => {
                info!("Zone sync: {} left", peer);
                left.send(PeerLeft { peer });
            }
            TransportEvent::Received { from, bytes } => {
                let message = match decode_message(&bytes, &mut icons) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Zone sync: ignoring message from {}: {}", from, e);
                        continue;
                    }
                };
                let relay = apply_message(&mut world, &message);
                if relay && link.role == NetRole::Hub {
                    link.send(SendTarget::All { except: Some(from) }, &bytes);
                }
            }
        }
    }
}

fn send_join_snapshots(
    world: Res<ZoneWorld>,
    mut link: ResMut<NetLink>,
    mut joined: EventReader<PeerJoined>,
) {
    for PeerJoined { peer } in joined.read().copied() {
        if link.role != NetRole::Hub {
            continue;
        }
        let snapshot = encode_snapshot(&world);
        if let ZoneMessage::Snapshot(entries) = &snapshot {
            debug!("Zone sync: sending {} zone(s) to {}", entries.len(), peer);
        }
        link.send(SendTarget::To(peer), &encode_message(&snapshot));
    }
}

fn flush_outbox(mut world: ResMut<ZoneWorld>, mut link: ResMut<NetLink>) {
    let local = link.local;
    for change in world.take_outbox() {
        let bytes = encode_message(&ZoneMessage::from(change));
        link.send(
            SendTarget::All {
                except: Some(local),
            },
            &bytes,
        );
    }
}

/// Zone synchronization over the `NetLink` resource.
///
/// Inserts a standalone link if the host has not provided one.
pub struct NetSyncPlugin;

impl Plugin for NetSyncPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<NetLink>() {
            app.insert_resource(NetLink::standalone());
        }
        app.add_event::<PeerJoined>().add_event::<PeerLeft>().add_systems(
            Update,
            (
                (sync_gate, receive_zone_messages)
                    .chain()
                    .in_set(ZoneSet::Receive),
                (send_join_snapshots, flush_outbox)
                    .chain()
                    .in_set(ZoneSet::Send),
            )
                .run_if(resource_exists::<ZoneWorld>),
        );
    }
}
