use std::fmt;

use bevy::prelude::*;

/// Identity of a node on the zone network. The hub is always [`PeerId::HUB`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerId(pub u32);

impl PeerId {
    pub const HUB: PeerId = PeerId(0);
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetRole {
    /// Single writer, nothing is sent or received.
    #[default]
    Standalone,
    Client,
    /// Applies received messages and relays them to every other peer.
    Hub,
}

impl NetRole {
    pub fn syncs(self) -> bool {
        self != NetRole::Standalone
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendTarget {
    /// Every reachable peer except `except` (if any).
    All { except: Option<PeerId> },
    To(PeerId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected(PeerId),
    Disconnected(PeerId),
    Received { from: PeerId, bytes: Vec<u8> },
}

/// Message transport. Delivery is ordered per sender; `poll` never blocks.
pub trait Transport: Send + Sync {
    fn send(&mut self, target: SendTarget, bytes: &[u8]);
    fn poll(&mut self) -> Vec<TransportEvent>;
    /// Inbound messages waiting to be polled, where the transport can tell.
    fn pending(&self) -> usize {
        0
    }
}

/// This node's place on the network.
#[derive(Resource)]
pub struct NetLink {
    pub role: NetRole,
    pub local: PeerId,
    transport: Box<dyn Transport>,
}

impl NetLink {
    pub fn new(role: NetRole, local: PeerId, transport: impl Transport + 'static) -> Self {
        Self {
            role,
            local,
            transport: Box::new(transport),
        }
    }

    pub fn standalone() -> Self {
        Self::new(NetRole::Standalone, PeerId::HUB, NullTransport)
    }

    pub fn send(&mut self, target: SendTarget, bytes: &[u8]) {
        if self.role.syncs() {
            self.transport.send(target, bytes);
        }
    }

    pub fn poll(&mut self) -> Vec<TransportEvent> {
        if self.role.syncs() {
            self.transport.poll()
        } else {
            Vec::new()
        }
    }

    pub fn pending(&self) -> usize {
        self.transport.pending()
    }
}

/// Transport of a standalone node.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&mut self, _target: SendTarget, _bytes: &[u8]) {}

    fn poll(&mut self) -> Vec<TransportEvent> {
        Vec::new()
    }
}
