//! Programmatic zone creation for other collaborators.
//!
//! ```ignore
//! let key = ZoneDescriptor::new("alice", TileRect::new(0, 0, 8, 8))
//!     .title("Market")
//!     .priority(2)
//!     .icon(IconSpec::Raw("misc house".into()))
//!     .add_to(&mut world, &mut icons)?;
//! ```

use std::fmt;

use bevy::prelude::*;

use crate::geometry::TileRect;
use crate::icons::{IconRef, IconRegistry};
use crate::world::ZoneWorld;
use crate::zone::{Rgb, Zone, ZoneError, ZoneKey};

/// Icon given either as a ready handle or as a raw `"<tag> <rest>"` string.
#[derive(Debug, Clone)]
pub enum IconSpec {
    Handle(IconRef),
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    Invalid(Vec<ZoneError>),
    UnresolvedIcon(String),
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::Invalid(errors) => {
                let keys: Vec<&str> = errors.iter().map(|e| e.key()).collect();
                write!(f, "zone descriptor rejected: {}", keys.join(", "))
            }
            DescriptorError::UnresolvedIcon(raw) => {
                write!(f, "icon descriptor '{raw}' matches no registered source")
            }
        }
    }
}

impl std::error::Error for DescriptorError {}

#[derive(Debug, Clone)]
pub struct ZoneDescriptor {
    pub owner: String,
    pub rect: TileRect,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub title_color: Option<Rgb>,
    pub title_stroke: Option<Rgb>,
    pub priority: Option<i32>,
    pub icon: Option<IconSpec>,
    /// Confirm the zone (assign an id and broadcast) instead of leaving it fresh.
    pub persistent: bool,
}

impl ZoneDescriptor {
    pub fn new(owner: impl Into<String>, rect: TileRect) -> Self {
        Self {
            owner: owner.into(),
            rect,
            title: None,
            subtitle: None,
            title_color: None,
            title_stroke: None,
            priority: None,
            icon: None,
            persistent: true,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn colors(mut self, title: Rgb, stroke: Rgb) -> Self {
        self.title_color = Some(title);
        self.title_stroke = Some(stroke);
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn icon(mut self, icon: IconSpec) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Builds the zone without adding it.
    pub fn build(&self, icons: &mut IconRegistry) -> Result<Zone, DescriptorError> {
        let mut zone = Zone::new_fresh(TileRect::default(), self.owner.clone());
        zone.set_rect_silent(self.rect);
        if let Some(title) = &self.title {
            zone.set_title(title.clone());
        }
        if let Some(subtitle) = &self.subtitle {
            zone.subtitle = subtitle.clone();
        }
        if let Some(color) = self.title_color {
            zone.title_color = color;
        }
        if let Some(stroke) = self.title_stroke {
            zone.title_stroke = stroke;
        }
        if let Some(priority) = self.priority {
            zone.set_priority(priority);
        }
        zone.icon = match &self.icon {
            None => None,
            Some(IconSpec::Handle(handle)) => Some(icons.intern(handle.clone())),
            Some(IconSpec::Raw(raw)) => Some(
                icons
                    .resolve_raw(raw)
                    .ok_or_else(|| DescriptorError::UnresolvedIcon(raw.clone()))?,
            ),
        };

        let errors = zone.check_errors();
        if !errors.is_empty() {
            return Err(DescriptorError::Invalid(errors));
        }
        Ok(zone)
    }

    /// Validates, adds and (if persistent) confirms the zone.
    pub fn add_to(
        &self,
        world: &mut ZoneWorld,
        icons: &mut IconRegistry,
    ) -> Result<ZoneKey, DescriptorError> {
        let zone = self.build(icons).inspect_err(|e| {
            error!("AddZone from descriptor (owner '{}'): {}", self.owner, e);
        })?;
        let key = world.add_zone(zone);
        if self.persistent {
            world.confirm_zone(key);
        }
        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ZoneChange;

    #[test]
    fn test_descriptor_adds_confirmed_zone() {
        let mut world = ZoneWorld::default();
        world.set_sync_enabled(true);
        let mut icons = IconRegistry::with_builtin_sources();

        let key = ZoneDescriptor::new("alice", TileRect::new(0, 0, 8, 8))
            .title("Market")
            .subtitle("open daily")
            .priority(2)
            .colors(Rgb::new(255, 0, 0), Rgb::BLACK)
            .icon(IconSpec::Raw("misc house".into()))
            .add_to(&mut world, &mut icons)
            .unwrap();

        let zone = world.get(key).unwrap();
        assert!(!zone.is_fresh());
        assert_eq!(zone.title(), "Market");
        assert_eq!(zone.priority(), 2);
        assert_eq!(zone.icon.as_ref().map(|i| i.id().to_string()), Some("misc_house".into()));

        let outbox = world.take_outbox();
        assert!(matches!(outbox.as_slice(), [ZoneChange::AddOrUpdate { .. }]));
    }

    #[test]
    fn test_descriptor_defaults_title() {
        let mut icons = IconRegistry::with_builtin_sources();
        let zone = ZoneDescriptor::new("alice", TileRect::new(0, 0, 1, 1))
            .build(&mut icons)
            .unwrap();
        assert_eq!(zone.title(), crate::config::DEFAULT_TITLE);
    }

    #[test]
    fn test_descriptor_rejects_invalid_input() {
        let mut world = ZoneWorld::default();
        let mut icons = IconRegistry::with_builtin_sources();

        let err = ZoneDescriptor::new(" ", TileRect::new(0, 0, 0, 4))
            .title("")
            .add_to(&mut world, &mut icons)
            .unwrap_err();
        assert_eq!(
            err,
            DescriptorError::Invalid(vec![
                ZoneError::InvalidRect,
                ZoneError::InvalidOwner,
                ZoneError::InvalidTitle
            ])
        );

        let err = ZoneDescriptor::new("bob", TileRect::new(0, 0, 2, 2))
            .icon(IconSpec::Raw("bestiary 12".into()))
            .add_to(&mut world, &mut icons)
            .unwrap_err();
        assert_eq!(err, DescriptorError::UnresolvedIcon("bestiary 12".into()));
        assert!(world.is_empty());
    }

    #[test]
    fn test_handle_icons_are_interned() {
        let mut icons = IconRegistry::with_builtin_sources();
        let mut other = IconRegistry::with_builtin_sources();
        let handle = other.resolve_raw("misc tag").unwrap();
        let zone = ZoneDescriptor::new("o", TileRect::new(0, 0, 1, 1))
            .icon(IconSpec::Handle(handle))
            .build(&mut icons)
            .unwrap();
        assert!(zone.icon.is_some());
        assert_eq!(icons.loaded().len(), 1);
    }
}
