//! In-process star network over crossbeam channels.
//!
//! Used by the headless host and by tests. Clients only talk to the hub; the
//! hub addresses clients individually.

use std::collections::BTreeMap;

use bevy::prelude::*;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::transport::{PeerId, SendTarget, Transport, TransportEvent};

#[derive(Debug)]
enum Envelope {
    Hello(PeerId),
    Bye(PeerId),
    Data { from: PeerId, bytes: Vec<u8> },
}

pub struct LoopbackNetwork;

impl LoopbackNetwork {
    /// A hub plus `clients` connected clients with ids `1..=clients`.
    pub fn star(clients: u32) -> (LoopbackHub, Vec<LoopbackClient>) {
        let (hub_tx, hub_rx) = crossbeam_channel::unbounded();
        let mut hub = LoopbackHub {
            inbox: hub_rx,
            inbox_tx: hub_tx,
            peers: BTreeMap::new(),
            next_peer: 1,
        };
        let clients = (1..=clients).map(|_| hub.connect_client()).collect();
        (hub, clients)
    }
}

pub struct LoopbackHub {
    inbox: Receiver<Envelope>,
    inbox_tx: Sender<Envelope>,
    peers: BTreeMap<PeerId, Sender<Envelope>>,
    /// Ids are never reused, even after the peer holding one leaves.
    next_peer: u32,
}

impl LoopbackHub {
    /// Attaches a new client. The hub sees it as `Connected` on its next poll.
    pub fn connect_client(&mut self) -> LoopbackClient {
        let id = PeerId(self.next_peer);
        self.next_peer = self.next_peer.wrapping_add(1).max(1);
        let (tx, rx) = crossbeam_channel::unbounded();
        self.peers.insert(id, tx);
        // Cannot fail: the hub owns the receiver.
        let _ = self.inbox_tx.send(Envelope::Hello(id));
        LoopbackClient {
            id,
            to_hub: self.inbox_tx.clone(),
            inbox: rx,
        }
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    fn deliver(&mut self, peer: PeerId, bytes: &[u8]) {
        let Some(tx) = self.peers.get(&peer) else {
            return;
        };
        let envelope = Envelope::Data {
            from: PeerId::HUB,
            bytes: bytes.to_vec(),
        };
        if tx.send(envelope).is_err() {
            debug!("Loopback hub: {} is gone, dropping it", peer);
            self.peers.remove(&peer);
        }
    }
}

impl Transport for LoopbackHub {
    fn send(&mut self, target: SendTarget, bytes: &[u8]) {
        match target {
            SendTarget::To(peer) => self.deliver(peer, bytes),
            SendTarget::All { except } => {
                let peers: Vec<PeerId> = self
                    .peers
                    .keys()
                    .copied()
                    .filter(|p| Some(*p) != except)
                    .collect();
                for peer in peers {
                    self.deliver(peer, bytes);
                }
            }
        }
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        loop {
            match self.inbox.try_recv() {
                Ok(Envelope::Hello(peer)) => events.push(TransportEvent::Connected(peer)),
                Ok(Envelope::Bye(peer)) => {
                    self.peers.remove(&peer);
                    events.push(TransportEvent::Disconnected(peer));
                }
                Ok(Envelope::Data { from, bytes }) => {
                    events.push(TransportEvent::Received { from, bytes })
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        events
    }

    fn pending(&self) -> usize {
        self.inbox.len()
    }
}

pub struct LoopbackClient {
    id: PeerId,
    to_hub: Sender<Envelope>,
    inbox: Receiver<Envelope>,
}

impl LoopbackClient {
    pub fn id(&self) -> PeerId {
        self.id
    }
}

impl Transport for LoopbackClient {
    fn send(&mut self, target: SendTarget, bytes: &[u8]) {
        let reaches_hub = match target {
            SendTarget::To(peer) => peer == PeerId::HUB,
            SendTarget::All { except } => except != Some(PeerId::HUB),
        };
        if !reaches_hub {
            return;
        }
        let envelope = Envelope::Data {
            from: self.id,
            bytes: bytes.to_vec(),
        };
        if self.to_hub.send(envelope).is_err() {
            warn!("Loopback {}: hub is gone, message dropped", self.id);
        }
    }

    fn poll(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        while let Ok(envelope) = self.inbox.try_recv() {
            if let Envelope::Data { from, bytes } = envelope {
                events.push(TransportEvent::Received { from, bytes });
            }
        }
        events
    }

    fn pending(&self) -> usize {
        self.inbox.len()
    }
}

impl Drop for LoopbackClient {
    fn drop(&mut self) {
        let _ = self.to_hub.send(Envelope::Bye(self.id));
    }
}
