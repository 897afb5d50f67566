use bevy::prelude::*;

use crate::config::{world_to_tile, ZoneSettings, TILE_SIZE};
use crate::geometry::TileRect;
use crate::world::ZoneWorld;
use crate::zone::ZoneKey;

/// Camera footprint in world pixels; `position` is the top-left corner.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ZoneCamera {
    pub position: Vec2,
    pub size: Vec2,
}

impl ZoneCamera {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Tile rectangle covered by the camera, grown by `slack` tiles per axis.
    pub fn tile_rect(&self, slack: i32) -> TileRect {
        let origin = world_to_tile(self.position);
        TileRect::new(
            origin.x,
            origin.y,
            ((self.size.x / TILE_SIZE) as i32).saturating_add(slack),
            ((self.size.y / TILE_SIZE) as i32).saturating_add(slack),
        )
    }
}

/// Sent once per visibility crossing.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneVisibilityChanged {
    pub zone: ZoneKey,
    pub visible: bool,
}

/// Zones that crossed the viewport boundary during one culling pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CullingDelta {
    pub entered: Vec<ZoneKey>,
    pub left: Vec<ZoneKey>,
}

impl CullingDelta {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

impl ZoneWorld {
    /// Promotes zones intersecting `view` to visible and demotes the rest.
    /// Label layout is only computed for zones entering view.
    pub fn update_culling(&mut self, view: TileRect) -> CullingDelta {
        self.viewport = Some(view);
        let mut delta = CullingDelta::default();

        if self.index.is_empty() {
            for key in self.visible.drain(..) {
                if let Some(zone) = self.zones.iter_mut().find(|z| z.key == key) {
                    zone.display = None;
                }
                delta.left.push(key);
            }
            return delta;
        }

        let mut leaves = Vec::with_capacity(self.index.len());
        self.index.for_each_leaf(|slot, _| leaves.push(slot));

        for slot in leaves {
            let zone = &mut self.zones[slot];
            let inside = zone.rect().intersects(&view);
            match (inside, zone.display.is_some()) {
                (true, false) => {
                    zone.materialize_display(self.measure.as_ref());
                    self.visible.push(zone.key);
                    delta.entered.push(zone.key);
                }
                (false, true) => {
                    zone.display = None;
                    let key = zone.key;
                    self.visible.retain(|k| *k != key);
                    delta.left.push(key);
                }
                _ => {}
            }
        }
        delta
    }
}

pub fn cull_zones(
    mut world: ResMut<ZoneWorld>,
    camera: Option<Res<ZoneCamera>>,
    settings: Res<ZoneSettings>,
    mut events: EventWriter<ZoneVisibilityChanged>,
) {
    let Some(camera) = camera else {
        return;
    };
    let delta = world.update_culling(camera.tile_rect(settings.cull_slack_tiles));
    for zone in delta.entered {
        events.send(ZoneVisibilityChanged {
            zone,
            visible: true,
        });
    }
    for zone in delta.left {
        events.send(ZoneVisibilityChanged {
            zone,
            visible: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;

    fn add(world: &mut ZoneWorld, rect: TileRect) -> ZoneKey {
        world.add_zone_local(Zone::new_fresh(rect, "owner"))
    }

    #[test]
    fn test_camera_rect_floors_and_adds_slack() {
        let camera = ZoneCamera::new(Vec2::new(-8.0, 40.0), Vec2::new(320.0, 170.0));
        assert_eq!(camera.tile_rect(1), TileRect::new(-1, 2, 21, 11));
    }

    #[test]
    fn test_transitions_happen_once_per_crossing() {
        let mut world = ZoneWorld::default();
        let key = add(&mut world, TileRect::new(100, 100, 4, 4));
        let away = TileRect::new(0, 0, 20, 20);
        let over = TileRect::new(90, 90, 20, 20);

        assert!(world.update_culling(away).is_empty());
        assert!(world.get(key).unwrap().display().is_none());

        let delta = world.update_culling(over);
        assert_eq!(delta.entered, vec![key]);
        assert!(world.get(key).unwrap().display().is_some());
        assert!(world.update_culling(over).is_empty());

        let delta = world.update_culling(away);
        assert_eq!(delta.left, vec![key]);
        assert!(world.visible().is_empty());
        assert!(world.update_culling(away).is_empty());
    }

    #[test]
    fn test_layout_computed_only_on_entry() {
        let mut world = ZoneWorld::default();
        let key = add(&mut world, TileRect::new(0, 0, 4, 4));
        let view = TileRect::new(0, 0, 10, 10);
        world.update_culling(view);
        world.update_culling(view);
        world.update_culling(view);
        let display = world.get(key).and_then(Zone::display).unwrap();
        assert_eq!(display.layout_revision, 1);
    }

    #[test]
    fn test_touching_edge_is_not_visible() {
        let mut world = ZoneWorld::default();
        add(&mut world, TileRect::new(10, 0, 4, 4));
        let delta = world.update_culling(TileRect::new(0, 0, 10, 10));
        assert!(delta.entered.is_empty());
    }

    #[test]
    fn test_empty_index_clears_visible_set() {
        let mut world = ZoneWorld::default();
        let key = add(&mut world, TileRect::new(0, 0, 4, 4));
        world.update_culling(TileRect::new(0, 0, 10, 10));
        assert_eq!(world.visible(), &[key]);

        world.remove_zone_local(key);
        world.housekeeping();
        let delta = world.update_culling(TileRect::new(0, 0, 10, 10));
        assert!(delta.left.is_empty(), "flushed zones leave the visible set during housekeeping");
        assert!(world.visible().is_empty());
    }
}
