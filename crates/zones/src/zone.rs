//! The zone entity: a titled, owned rectangle with edge mutators that keep a
//! continuously draggable handle when the rectangle inverts.

use std::fmt;

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::binary::{ByteReader, ByteWriter, DecodeError};
use crate::config::{DEFAULT_TITLE, DEFAULT_TITLE_COLOR, DEFAULT_TITLE_STROKE};
use crate::display_state::{DisplayState, TextMeasure};
use crate::geometry::TileRect;
use crate::icons::{write_icon, IconRef, IconRegistry};

/// 8-bit RGB colour used for zone titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::WHITE
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::srgb_u8(c.r, c.g, c.b)
    }
}

/// Process-local handle of a zone inside a [`crate::ZoneWorld`].
///
/// Unlike the persisted `id`, a key exists for fresh zones too and is never
/// sent over the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneKey(pub(crate) u64);

impl ZoneKey {
    /// Key of a zone that has not been added to a world yet.
    pub const UNASSIGNED: ZoneKey = ZoneKey(0);

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// One of the four rectangle edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Validation failures reported by [`Zone::check_errors`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneError {
    InvalidRect,
    InvalidOwner,
    InvalidTitle,
}

impl ZoneError {
    /// Stable localisation key.
    pub fn key(&self) -> &'static str {
        match self {
            ZoneError::InvalidRect => "InvalidRect",
            ZoneError::InvalidOwner => "InvalidOwner",
            ZoneError::InvalidTitle => "InvalidTitle",
        }
    }
}

impl fmt::Display for ZoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneError::InvalidRect => write!(f, "zone rectangle has no area"),
            ZoneError::InvalidOwner => write!(f, "zone has no owner"),
            ZoneError::InvalidTitle => write!(f, "zone has no title"),
        }
    }
}

impl std::error::Error for ZoneError {}

/// Everything about a zone except its identity and geometry.
#[derive(Debug, Clone)]
pub struct ZoneVisual {
    pub owner: String,
    pub priority: i32,
    pub title: String,
    pub subtitle: String,
    pub title_color: Rgb,
    pub title_stroke: Rgb,
    pub icon: Option<IconRef>,
}

impl Default for ZoneVisual {
    fn default() -> Self {
        Self {
            owner: String::new(),
            priority: 0,
            title: String::new(),
            subtitle: String::new(),
            title_color: DEFAULT_TITLE_COLOR,
            title_stroke: DEFAULT_TITLE_STROKE,
            icon: None,
        }
    }
}

impl PartialEq for ZoneVisual {
    fn eq(&self, other: &Self) -> bool {
        let same_icon = match (&self.icon, &other.icon) {
            (None, None) => true,
            (Some(a), Some(b)) => a.id() == b.id(),
            _ => false,
        };
        same_icon
            && self.owner == other.owner
            && self.priority == other.priority
            && self.title == other.title
            && self.subtitle == other.subtitle
            && self.title_color == other.title_color
            && self.title_stroke == other.title_stroke
    }
}

impl ZoneVisual {
    /// `owner, priority, title, subtitle, titleColor, titleStroke, hasIcon[, icon]`
    pub fn write(&self, w: &mut ByteWriter) {
        w.write_str(&self.owner);
        w.write_i32(self.priority);
        w.write_str(&self.title);
        w.write_str(&self.subtitle);
        write_rgb(w, self.title_color);
        write_rgb(w, self.title_stroke);
        match &self.icon {
            Some(icon) => {
                w.write_bool(true);
                write_icon(icon.as_ref(), w);
            }
            None => w.write_bool(false),
        }
    }

    pub fn read(r: &mut ByteReader, icons: &mut IconRegistry) -> Result<Self, DecodeError> {
        let owner = r.read_string()?;
        let priority = r.read_i32()?;
        let title = r.read_string()?;
        let subtitle = r.read_string()?;
        let title_color = read_rgb(r)?;
        let title_stroke = read_rgb(r)?;
        let icon = if r.read_bool()? {
            icons.read_icon(r)?
        } else {
            None
        };
        Ok(Self {
            owner,
            priority,
            title,
            subtitle,
            title_color,
            title_stroke,
            icon,
        })
    }
}

fn write_rgb(w: &mut ByteWriter, c: Rgb) {
    w.write_u8(c.r);
    w.write_u8(c.g);
    w.write_u8(c.b);
}

fn read_rgb(r: &mut ByteReader) -> Result<Rgb, DecodeError> {
    Ok(Rgb::new(r.read_u8()?, r.read_u8()?, r.read_u8()?))
}

/// Four little-endian int32: `x, y, width, height`.
pub fn write_rect(w: &mut ByteWriter, rect: &TileRect) {
    w.write_i32(rect.x);
    w.write_i32(rect.y);
    w.write_i32(rect.width);
    w.write_i32(rect.height);
}

/// Rejects rectangles whose right or bottom edge does not fit in an `i32`.
pub fn read_rect(r: &mut ByteReader) -> Result<TileRect, DecodeError> {
    let rect = TileRect::new(
        r.read_i32()?,
        r.read_i32()?,
        r.read_i32()?,
        r.read_i32()?,
    );
    if !rect.edges_fit() {
        return Err(DecodeError::InvalidValue(format!(
            "rect {rect:?} overflows the tile range"
        )));
    }
    Ok(rect)
}

#[derive(Debug, Clone)]
pub struct Zone {
    pub(crate) key: ZoneKey,
    pub(crate) id: i64,
    rect: TileRect,
    pub owner: String,
    priority: i32,
    title: String,
    pub subtitle: String,
    pub title_color: Rgb,
    pub title_stroke: Rgb,
    pub icon: Option<IconRef>,
    pub(crate) trashed: bool,
    pub(crate) display: Option<DisplayState>,
}

impl Zone {
    /// Unconfirmed zone as created by a placement action.
    pub fn new_fresh(rect: TileRect, owner: impl Into<String>) -> Self {
        Self {
            key: ZoneKey::UNASSIGNED,
            id: 0,
            rect: rect.with_min_extent(),
            owner: owner.into(),
            priority: 0,
            title: DEFAULT_TITLE.to_string(),
            subtitle: String::new(),
            title_color: DEFAULT_TITLE_COLOR,
            title_stroke: DEFAULT_TITLE_STROKE,
            icon: None,
            trashed: false,
            display: None,
        }
    }

    /// Empty stub carrying only an id, filled in by a load or a network merge.
    pub fn with_id(id: i64) -> Self {
        Self {
            key: ZoneKey::UNASSIGNED,
            id,
            rect: TileRect::default(),
            owner: String::new(),
            priority: 0,
            title: String::new(),
            subtitle: String::new(),
            title_color: DEFAULT_TITLE_COLOR,
            title_stroke: DEFAULT_TITLE_STROKE,
            icon: None,
            trashed: false,
            display: None,
        }
    }

    pub fn key(&self) -> ZoneKey {
        self.key
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// A fresh zone has never been confirmed and is never saved or synced.
    pub fn is_fresh(&self) -> bool {
        self.id == 0
    }

    pub fn is_trashed(&self) -> bool {
        self.trashed
    }

    /// Key used by external title integrations.
    pub fn zone_key_string(&self) -> String {
        format!("zone_{}", self.id)
    }

    pub fn rect(&self) -> TileRect {
        self.rect
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn display(&self) -> Option<&DisplayState> {
        self.display.as_ref()
    }

    pub fn display_mut(&mut self) -> Option<&mut DisplayState> {
        self.display.as_mut()
    }

    pub fn is_visible(&self) -> bool {
        self.display.is_some()
    }

    /// Assigns the rectangle, bumping zero extents to one tile.
    pub fn set_rect(&mut self, rect: TileRect) -> bool {
        self.set_rect_silent(rect.with_min_extent())
    }

    /// Assigns the rectangle as-is so that validation can see degenerate input.
    pub fn set_rect_silent(&mut self, rect: TileRect) -> bool {
        if self.rect == rect {
            return false;
        }
        self.rect = rect;
        true
    }

    pub fn set_edge(&mut self, edge: Edge, value: i32) -> bool {
        match edge {
            Edge::Left => self.set_left(value),
            Edge::Right => self.set_right(value),
            Edge::Top => self.set_top(value),
            Edge::Bottom => self.set_bottom(value),
        }
    }

    /// Moves the left edge. Pushing it past the right edge flips the
    /// rectangle and hands an active left drag over to the right edge.
    pub fn set_left(&mut self, value: i32) -> bool {
        let r = self.rect;
        if value == r.left() || value == r.right() {
            return false;
        }
        if value < r.right() {
            self.rect = TileRect::from_edges(value, r.top(), r.right(), r.bottom());
        } else {
            self.rect = TileRect::from_edges(r.right(), r.top(), value, r.bottom());
            if let Some(d) = self.display.as_mut().filter(|d| d.drag_left) {
                d.drag_left = false;
                d.drag_right = true;
            }
        }
        true
    }

    pub fn set_right(&mut self, value: i32) -> bool {
        let r = self.rect;
        if value == r.right() || value == r.left() {
            return false;
        }
        if value > r.left() {
            self.rect = TileRect::from_edges(r.left(), r.top(), value, r.bottom());
        } else {
            self.rect = TileRect::from_edges(value, r.top(), r.left(), r.bottom());
            if let Some(d) = self.display.as_mut().filter(|d| d.drag_right) {
                d.drag_right = false;
                d.drag_left = true;
            }
        }
        true
    }

    pub fn set_top(&mut self, value: i32) -> bool {
        let r = self.rect;
        if value == r.top() || value == r.bottom() {
            return false;
        }
        if value < r.bottom() {
            self.rect = TileRect::from_edges(r.left(), value, r.right(), r.bottom());
        } else {
            self.rect = TileRect::from_edges(r.left(), r.bottom(), r.right(), value);
            if let Some(d) = self.display.as_mut().filter(|d| d.drag_top) {
                d.drag_top = false;
                d.drag_bottom = true;
            }
        }
        true
    }

    pub fn set_bottom(&mut self, value: i32) -> bool {
        let r = self.rect;
        if value == r.bottom() || value == r.top() {
            return false;
        }
        if value > r.top() {
            self.rect = TileRect::from_edges(r.left(), r.top(), r.right(), value);
        } else {
            self.rect = TileRect::from_edges(r.left(), value, r.right(), r.top());
            if let Some(d) = self.display.as_mut().filter(|d| d.drag_bottom) {
                d.drag_bottom = false;
                d.drag_top = true;
            }
        }
        true
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> bool {
        let title = title.into();
        if self.title == title {
            return false;
        }
        self.title = title;
        true
    }

    pub fn set_priority(&mut self, priority: i32) -> bool {
        if self.priority == priority {
            return false;
        }
        self.priority = priority;
        true
    }

    pub fn visual(&self) -> ZoneVisual {
        ZoneVisual {
            owner: self.owner.clone(),
            priority: self.priority,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            title_color: self.title_color,
            title_stroke: self.title_stroke,
            icon: self.icon.clone(),
        }
    }

    /// Overwrites every visual field. Returns whether the label text changed.
    pub fn apply_visual(&mut self, visual: ZoneVisual) -> bool {
        let title_changed = self.set_title(visual.title);
        let priority_changed = self.set_priority(visual.priority);
        self.owner = visual.owner;
        self.subtitle = visual.subtitle;
        self.title_color = visual.title_color;
        self.title_stroke = visual.title_stroke;
        self.icon = visual.icon;
        title_changed || priority_changed
    }

    /// Recomputes the cached label layout if the zone is on screen.
    pub fn refresh_layout(&mut self, measure: &dyn TextMeasure) {
        let (title, priority) = (self.title.as_str(), self.priority);
        if let Some(display) = self.display.as_mut() {
            display.info_changed(title, priority, measure);
        }
    }

    pub(crate) fn materialize_display(&mut self, measure: &dyn TextMeasure) {
        if self.display.is_none() {
            self.display = Some(DisplayState::new(&self.title, self.priority, measure));
        }
    }

    /// Validation used by interactive creation and bulk load.
    pub fn check_errors(&self) -> Vec<ZoneError> {
        let mut errors = Vec::new();
        if self.rect.is_degenerate() {
            errors.push(ZoneError::InvalidRect);
        }
        if self.owner.trim().is_empty() {
            errors.push(ZoneError::InvalidOwner);
        }
        if self.title.trim().is_empty() {
            errors.push(ZoneError::InvalidTitle);
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display_state::FixedAdvanceMeasure;

    fn zone(rect: TileRect) -> Zone {
        Zone::new_fresh(rect, "alice")
    }

    #[test]
    fn test_right_edge_past_left_flips() {
        let mut z = zone(TileRect::new(0, 0, 10, 10));
        assert!(z.set_right(-5));
        assert_eq!(z.rect().left(), -5);
        assert_eq!(z.rect().right(), 0);
        assert_eq!(z.rect().width, 5);
        assert_eq!(z.rect().height, 10);
    }

    #[test]
    fn test_left_edge_past_right_flips() {
        let mut z = zone(TileRect::new(0, 0, 10, 10));
        assert!(z.set_left(14));
        assert_eq!(z.rect(), TileRect::from_edges(10, 0, 14, 10));
    }

    #[test]
    fn test_vertical_edges_flip() {
        let mut z = zone(TileRect::new(0, 0, 10, 10));
        assert!(z.set_top(12));
        assert_eq!(z.rect(), TileRect::from_edges(0, 10, 10, 12));

        let mut z = zone(TileRect::new(0, 0, 10, 10));
        assert!(z.set_bottom(-3));
        assert_eq!(z.rect(), TileRect::from_edges(0, -3, 10, 0));
    }

    #[test]
    fn test_edge_on_opposite_edge_is_noop() {
        let mut z = zone(TileRect::new(0, 0, 10, 10));
        assert!(!z.set_left(10));
        assert!(!z.set_right(0));
        assert!(!z.set_top(10));
        assert!(!z.set_bottom(0));
        assert!(!z.set_right(10));
        assert_eq!(z.rect(), TileRect::new(0, 0, 10, 10));
    }

    #[test]
    fn test_plain_edge_move_keeps_opposite_edge() {
        let mut z = zone(TileRect::new(0, 0, 10, 10));
        assert!(z.set_left(3));
        assert_eq!(z.rect(), TileRect::from_edges(3, 0, 10, 10));
        assert!(z.set_bottom(20));
        assert_eq!(z.rect(), TileRect::from_edges(3, 0, 10, 20));
    }

    #[test]
    fn test_flip_transfers_drag_focus() {
        let measure = FixedAdvanceMeasure::default();
        let mut z = zone(TileRect::new(0, 0, 10, 10));
        z.materialize_display(&measure);
        z.display_mut().unwrap().drag_right = true;

        z.set_right(-5);
        let d = z.display().unwrap();
        assert!(d.drag_left);
        assert!(!d.drag_right);

        // Continuing the drag keeps moving the same handle.
        z.set_left(-8);
        assert_eq!(z.rect(), TileRect::from_edges(-8, 0, 0, 10));
    }

    #[test]
    fn test_set_rect_clamps_but_silent_does_not() {
        let mut z = zone(TileRect::new(0, 0, 1, 1));
        z.set_rect(TileRect::new(4, 4, 0, 0));
        assert_eq!(z.rect(), TileRect::new(4, 4, 1, 1));
        z.set_rect_silent(TileRect::new(4, 4, 0, 3));
        assert_eq!(z.check_errors(), vec![ZoneError::InvalidRect]);
    }

    #[test]
    fn test_check_errors_reports_every_failure() {
        let z = Zone::with_id(7);
        assert_eq!(
            z.check_errors(),
            vec![
                ZoneError::InvalidRect,
                ZoneError::InvalidOwner,
                ZoneError::InvalidTitle
            ]
        );
        assert_eq!(ZoneError::InvalidOwner.key(), "InvalidOwner");
        assert!(zone(TileRect::new(0, 0, 2, 2)).check_errors().is_empty());
    }

    #[test]
    fn test_zone_key_string() {
        assert_eq!(Zone::with_id(42).zone_key_string(), "zone_42");
    }

    #[test]
    fn test_visual_binary_form_preserves_icon_capability() {
        let mut icons = IconRegistry::with_builtin_sources();
        let visual = ZoneVisual {
            owner: "alice".into(),
            priority: -2,
            title: "Harbor".into(),
            subtitle: "no fishing".into(),
            title_color: Rgb::new(10, 200, 30),
            title_stroke: Rgb::BLACK,
            icon: icons.resolve_raw("misc heart"),
        };
        let mut w = ByteWriter::new();
        write_rect(&mut w, &TileRect::new(1, 2, 3, 4));
        visual.write(&mut w);

        let mut receiver_icons = IconRegistry::with_builtin_sources();
        let mut r = ByteReader::new(w.as_slice());
        assert_eq!(read_rect(&mut r).unwrap(), TileRect::new(1, 2, 3, 4));
        let decoded = ZoneVisual::read(&mut r, &mut receiver_icons).unwrap();
        assert!(r.is_empty());
        assert_eq!(decoded, visual);
        let (a, b) = (decoded.icon.unwrap(), visual.icon.unwrap());
        assert_eq!(a.name(), b.name());
        assert_eq!(a.texture(), b.texture());
    }

    #[test]
    fn test_read_rect_rejects_overflowing_edges() {
        for rect in [
            TileRect::new(i32::MAX - 1, 0, 5, 5),
            TileRect::new(0, i32::MIN, 1, -1),
        ] {
            let mut w = ByteWriter::new();
            write_rect(&mut w, &rect);
            let mut r = ByteReader::new(w.as_slice());
            assert!(matches!(read_rect(&mut r), Err(DecodeError::InvalidValue(_))));
        }
        let edge = TileRect::new(i32::MAX - 5, 0, 5, 5);
        let mut w = ByteWriter::new();
        write_rect(&mut w, &edge);
        assert_eq!(read_rect(&mut ByteReader::new(w.as_slice())).unwrap(), edge);
    }

    #[test]
    fn test_apply_visual_reports_label_change() {
        let mut z = zone(TileRect::new(0, 0, 2, 2));
        let mut v = z.visual();
        v.subtitle = "only subtitle".into();
        assert!(!z.apply_visual(v.clone()));
        v.priority = 3;
        assert!(z.apply_visual(v));
        assert_eq!(z.priority(), 3);
    }
}
