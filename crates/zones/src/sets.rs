//! Per-tick ordering of zone work.
//!
//! ```text
//! Housekeeping  →  Receive  →  Culling  →  Edit  →  Send
//! ```
//!
//! * **Housekeeping** – flush trashed zones, rebuild the index.
//! * **Receive** – apply network messages in arrival order.
//! * **Culling** – update display state against the camera.
//! * **Edit** – edge-drag controller.
//! * **Send** – broadcast changes queued during the tick.
//!
//! Every set only runs while a `ZoneWorld` is loaded.

use bevy::prelude::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoneSet {
    Housekeeping,
    Receive,
    Culling,
    Edit,
    Send,
}
