// ---------------------------------------------------------------------------
// message – zone sync wire format
// ---------------------------------------------------------------------------
//
// Every message is `[messageType: u8][payload]`:
//
//   0 AddOrUpdateZone   [id: i64][rect][visual]
//   1 ChangeZoneRect    [id: i64][rect]
//   2 ChangeZoneVisual  [id: i64][visual]
//   3 RemoveZone        [id: i64]
//   4 WorldSnapshot     [count: i32] count x [id: i64][rect][visual]
//
// `rect` is four i32 (x, y, w, h); `visual` is the zone visual payload with
// its optional icon (see `zones::zone::ZoneVisual::write`).

use zones::binary::{ByteReader, ByteWriter, DecodeError};
use zones::zone::{read_rect, write_rect};
use zones::{IconRegistry, TileRect, ZoneChange, ZoneVisual};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    AddOrUpdateZone = 0,
    ChangeZoneRect = 1,
    ChangeZoneVisual = 2,
    RemoveZone = 3,
    WorldSnapshot = 4,
}

impl TryFrom<u8> for MessageType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => MessageType::AddOrUpdateZone,
            1 => MessageType::ChangeZoneRect,
            2 => MessageType::ChangeZoneVisual,
            3 => MessageType::RemoveZone,
            4 => MessageType::WorldSnapshot,
            other => return Err(DecodeError::UnknownMessageType(other)),
        })
    }
}

/// One full zone inside a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub id: i64,
    pub rect: TileRect,
    pub visual: ZoneVisual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ZoneMessage {
    AddOrUpdate {
        id: i64,
        rect: TileRect,
        visual: ZoneVisual,
    },
    ChangeRect {
        id: i64,
        rect: TileRect,
    },
    ChangeVisual {
        id: i64,
        visual: ZoneVisual,
    },
    Remove {
        id: i64,
    },
    Snapshot(Vec<SnapshotEntry>),
}

impl ZoneMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            ZoneMessage::AddOrUpdate { .. } => MessageType::AddOrUpdateZone,
            ZoneMessage::ChangeRect { .. } => MessageType::ChangeZoneRect,
            ZoneMessage::ChangeVisual { .. } => MessageType::ChangeZoneVisual,
            ZoneMessage::Remove { .. } => MessageType::RemoveZone,
            ZoneMessage::Snapshot(_) => MessageType::WorldSnapshot,
        }
    }

    /// Target zone id; `None` for snapshots.
    pub fn zone_id(&self) -> Option<i64> {
        match self {
            ZoneMessage::AddOrUpdate { id, .. }
            | ZoneMessage::ChangeRect { id, .. }
            | ZoneMessage::ChangeVisual { id, .. }
            | ZoneMessage::Remove { id } => Some(*id),
            ZoneMessage::Snapshot(_) => None,
        }
    }
}

impl From<ZoneChange> for ZoneMessage {
    fn from(change: ZoneChange) -> Self {
        match change {
            ZoneChange::AddOrUpdate { id, rect, visual } => {
                ZoneMessage::AddOrUpdate { id, rect, visual }
            }
            ZoneChange::Rect { id, rect } => ZoneMessage::ChangeRect { id, rect },
            ZoneChange::Visual { id, visual } => ZoneMessage::ChangeVisual { id, visual },
            ZoneChange::Remove { id } => ZoneMessage::Remove { id },
        }
    }
}

pub fn encode_message(message: &ZoneMessage) -> Vec<u8> {
    let mut w = ByteWriter::with_capacity(64);
    w.write_u8(message.message_type() as u8);
    match message {
        ZoneMessage::AddOrUpdate { id, rect, visual } => {
            w.write_i64(*id);
            write_rect(&mut w, rect);
            visual.write(&mut w);
        }
        ZoneMessage::ChangeRect { id, rect } => {
            w.write_i64(*id);
            write_rect(&mut w, rect);
        }
        ZoneMessage::ChangeVisual { id, visual } => {
            w.write_i64(*id);
            visual.write(&mut w);
        }
        ZoneMessage::Remove { id } => w.write_i64(*id),
        ZoneMessage::Snapshot(entries) => {
            w.write_i32(entries.len() as i32);
            for entry in entries {
                w.write_i64(entry.id);
                write_rect(&mut w, &entry.rect);
                entry.visual.write(&mut w);
            }
        }
    }
    w.into_bytes()
}

/// Decodes one message. Icons are resolved (and interned) through `icons`.
pub fn decode_message(bytes: &[u8], icons: &mut IconRegistry) -> Result<ZoneMessage, DecodeError> {
    let mut r = ByteReader::new(bytes);
    let message = match MessageType::try_from(r.read_u8()?)? {
        MessageType::AddOrUpdateZone => ZoneMessage::AddOrUpdate {
            id: r.read_i64()?,
            rect: read_rect(&mut r)?,
            visual: ZoneVisual::read(&mut r, icons)?,
        },
        MessageType::ChangeZoneRect => ZoneMessage::ChangeRect {
            id: r.read_i64()?,
            rect: read_rect(&mut r)?,
        },
        MessageType::ChangeZoneVisual => ZoneMessage::ChangeVisual {
            id: r.read_i64()?,
            visual: ZoneVisual::read(&mut r, icons)?,
        },
        MessageType::RemoveZone => ZoneMessage::Remove { id: r.read_i64()? },
        MessageType::WorldSnapshot => {
            let count = r.read_i32()?;
            if count < 0 {
                return Err(DecodeError::InvalidValue(format!(
                    "negative snapshot count {count}"
                )));
            }
            let mut entries = Vec::new();
            for _ in 0..count {
                entries.push(SnapshotEntry {
                    id: r.read_i64()?,
                    rect: read_rect(&mut r)?,
                    visual: ZoneVisual::read(&mut r, icons)?,
                });
            }
            ZoneMessage::Snapshot(entries)
        }
    };
    Ok(message)
}
