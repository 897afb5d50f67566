//! Interactive edge dragging.
//!
//! Runs only on ticks where an input tool has armed [`ZoneEditMode`]; the
//! flag is cleared again at the end of every tick.

use bevy::prelude::*;

use crate::config::{world_to_nearest_edge, world_to_tile, ZoneSettings, TILE_SIZE};
use crate::world::ZoneWorld;
use crate::zone::{Edge, ZoneKey};

/// Pointer position in world pixels plus whether a UI surface is under it.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct ZonePointer {
    pub world_pos: Vec2,
    pub over_ui: bool,
    /// Multiplier applied to the on-screen border width.
    pub zoom: f32,
}

impl Default for ZonePointer {
    fn default() -> Self {
        Self {
            world_pos: Vec2::ZERO,
            over_ui: false,
            zoom: 1.0,
        }
    }
}

/// Must be re-armed every tick by whichever tool wants edge editing.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct ZoneEditMode {
    pub enabled: bool,
}

/// Border interaction state other tools read to avoid conflicting input.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BorderInteraction {
    pub hovered: bool,
    pub dragging: bool,
}

impl BorderInteraction {
    pub fn drag_hint_visible(&self) -> bool {
        self.hovered || self.dragging
    }
}

/// A fresh zone finished its first drag and needs confirming in an editor.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenZoneEditor {
    pub zone: ZoneKey,
}

/// One tick of pointer input as seen by the drag controller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerSample {
    pub world_pos: Vec2,
    pub over_ui: bool,
    pub zoom: f32,
    pub primary_just_pressed: bool,
    pub primary_just_released: bool,
    pub secondary_just_released: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DragOutcome {
    pub hovered: bool,
    pub dragging: bool,
    /// Fresh zones whose drag ended this tick.
    pub open_editor: Vec<ZoneKey>,
}

impl ZoneWorld {
    /// Advances the hover/drag state machine of every visible zone.
    pub fn update_edge_drag(&mut self, sample: &PointerSample, border_width: f32) -> DragOutcome {
        let mut outcome = DragOutcome::default();
        let keys: Vec<ZoneKey> = self.visible.clone();

        // Releases first, so a zone let go this tick does not block hovering.
        for &key in &keys {
            let Some(zone) = self.get_mut(key) else {
                continue;
            };
            let fresh = zone.is_fresh();
            let Some(display) = zone.display_mut() else {
                continue;
            };
            if !display.drag_any() {
                continue;
            }
            let released = if display.drag_with_secondary {
                sample.secondary_just_released
            } else {
                sample.primary_just_released
            };
            if released {
                display.reset_drag();
                if fresh {
                    outcome.open_editor.push(key);
                }
            }
        }

        let mut dragging = self.any_dragging();
        let tile = world_to_tile(sample.world_pos);
        let band = border_width * sample.zoom;
        let p = sample.world_pos;

        for &key in &keys {
            let Some(zone) = self.get_mut(key) else {
                continue;
            };
            let rect = zone.rect();
            let Some(display) = zone.display_mut() else {
                continue;
            };
            display.reset_hover();
            if dragging || sample.over_ui || !rect.contains(tile) {
                continue;
            }
            let left = rect.left() as f32 * TILE_SIZE;
            let right = rect.right() as f32 * TILE_SIZE;
            let top = rect.top() as f32 * TILE_SIZE;
            let bottom = rect.bottom() as f32 * TILE_SIZE;
            let within_x = p.x > left && p.x < right;
            let within_y = p.y > top && p.y < bottom;
            display.hover_left = within_y && p.x > left && p.x < left + band;
            display.hover_right = within_y && p.x < right && p.x > right - band;
            display.hover_top = within_x && p.y > top && p.y < top + band;
            display.hover_bottom = within_x && p.y < bottom && p.y > bottom - band;

            if display.hover_any() {
                outcome.hovered = true;
                if sample.primary_just_pressed {
                    display.hover_to_drag();
                    display.drag_with_secondary = false;
                    dragging = true;
                }
            }
        }

        let edge_x = world_to_nearest_edge(p.x);
        let edge_y = world_to_nearest_edge(p.y);
        for &key in &keys {
            for (edge, value) in [
                (Edge::Left, edge_x),
                (Edge::Right, edge_x),
                (Edge::Top, edge_y),
                (Edge::Bottom, edge_y),
            ] {
                let active = self
                    .get(key)
                    .and_then(|z| z.display())
                    .is_some_and(|d| match edge {
                        Edge::Left => d.drag_left,
                        Edge::Right => d.drag_right,
                        Edge::Top => d.drag_top,
                        Edge::Bottom => d.drag_bottom,
                    });
                if active {
                    self.set_zone_edge(key, edge, value);
                }
            }
        }

        outcome.dragging = self.any_dragging();
        outcome
    }

    /// Drops every hover and drag flag, e.g. when edge editing is switched off.
    pub fn cancel_edge_drags(&mut self) {
        for zone in self.zones.iter_mut() {
            if let Some(display) = zone.display.as_mut() {
                display.reset_hover();
                display.reset_drag();
            }
        }
    }
}

pub fn drag_zone_edges(
    mut world: ResMut<ZoneWorld>,
    mut edit_mode: ResMut<ZoneEditMode>,
    pointer: Res<ZonePointer>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    settings: Res<ZoneSettings>,
    mut interaction: ResMut<BorderInteraction>,
    mut editor_events: EventWriter<OpenZoneEditor>,
) {
    if !edit_mode.enabled {
        if interaction.drag_hint_visible() || world.any_dragging() {
            world.cancel_edge_drags();
        }
        *interaction = BorderInteraction::default();
        return;
    }
    edit_mode.enabled = false;

    let (pressed, released_primary, released_secondary) = match buttons.as_deref() {
        Some(b) => (
            b.just_pressed(MouseButton::Left),
            b.just_released(MouseButton::Left),
            b.just_released(MouseButton::Right),
        ),
        None => (false, false, false),
    };
    let sample = PointerSample {
        world_pos: pointer.world_pos,
        over_ui: pointer.over_ui,
        zoom: pointer.zoom,
        primary_just_pressed: pressed,
        primary_just_released: released_primary,
        secondary_just_released: released_secondary,
    };

    let outcome = world.update_edge_drag(&sample, settings.border_width);
    interaction.hovered = outcome.hovered;
    interaction.dragging = outcome.dragging;
    for zone in outcome.open_editor {
        editor_events.send(OpenZoneEditor { zone });
    }
}
