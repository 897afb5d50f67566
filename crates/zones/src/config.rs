use std::sync::Arc;

use bevy::prelude::*;

use crate::display_state::{FixedAdvanceMeasure, TextMeasure};
use crate::zone::Rgb;

/// World pixels per tile.
pub const TILE_SIZE: f32 = 16.0;

/// Width of the grabbable border band in screen pixels at zoom 1.0.
pub const BORDER_WIDTH: f32 = 4.0;

/// Extra tiles added to each axis of the camera rectangle before culling.
pub const CULL_SLACK_TILES: i32 = 1;

/// Title given to zones created interactively before the editor renames them.
pub const DEFAULT_TITLE: &str = "New Zone";

pub const DEFAULT_TITLE_COLOR: Rgb = Rgb::WHITE;
pub const DEFAULT_TITLE_STROKE: Rgb = Rgb::BLACK;

/// Vertical overlap between the title line and the priority line of a label.
pub const LABEL_LINE_OVERLAP: f32 = 10.0;

/// Runtime tunables read by the culling and edge-drag systems.
///
/// Hosts may replace this resource before the first `ZoneWorld` is created,
/// e.g. to plug in real font metrics for label layout.
#[derive(Resource, Clone)]
pub struct ZoneSettings {
    /// Border band thickness in screen pixels (scaled by zoom when hit-testing).
    pub border_width: f32,
    /// Slack tiles added to the camera rectangle on each axis.
    pub cull_slack_tiles: i32,
    /// Font metrics used for cached label layout.
    pub measure: Arc<dyn TextMeasure>,
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            border_width: BORDER_WIDTH,
            cull_slack_tiles: CULL_SLACK_TILES,
            measure: Arc::new(FixedAdvanceMeasure::default()),
        }
    }
}

/// Converts a world-pixel coordinate to the tile containing it.
#[inline]
pub fn world_to_tile(world: Vec2) -> IVec2 {
    IVec2::new(
        (world.x / TILE_SIZE).floor() as i32,
        (world.y / TILE_SIZE).floor() as i32,
    )
}

/// Converts a world-pixel coordinate to the nearest tile boundary.
#[inline]
pub fn world_to_nearest_edge(world: f32) -> i32 {
    (world / TILE_SIZE).round() as i32
}
