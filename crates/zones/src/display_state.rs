//! Per-zone presentation state that only exists while a zone is on screen.

use bevy::math::Vec2;

use crate::config::LABEL_LINE_OVERLAP;
use crate::geometry::BorderMask;

/// Font metrics capability used to lay out zone labels.
pub trait TextMeasure: Send + Sync {
    /// Size of `text` in unscaled screen pixels.
    fn measure(&self, text: &str) -> Vec2;
}

/// Monospace approximation used when the host provides no font.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasure {
    pub advance: f32,
    pub line_height: f32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self {
            advance: 8.0,
            line_height: 22.0,
        }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn measure(&self, text: &str) -> Vec2 {
        Vec2::new(text.chars().count() as f32 * self.advance, self.line_height)
    }
}

/// Signed priority label: `+5`, `-3`. Zero priority has no label.
pub fn priority_label(priority: i32) -> Option<String> {
    match priority {
        0 => None,
        p if p > 0 => Some(format!("+{p}")),
        p => Some(p.to_string()),
    }
}

/// Cached label geometry, recomputed only when title or priority change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelLayout {
    pub info_size: Vec2,
    pub title_offset: Vec2,
    pub priority_offset: Vec2,
    pub priority_text: Option<String>,
}

impl LabelLayout {
    pub fn compute(title: &str, priority: i32, measure: &dyn TextMeasure) -> Self {
        let title_size = measure.measure(title);
        let priority_text = priority_label(priority);

        let mut info_size = title_size;
        let mut priority_offset = Vec2::ZERO;
        if let Some(text) = &priority_text {
            let priority_size = measure.measure(text);
            info_size.x = info_size.x.max(priority_size.x);
            info_size.y += priority_size.y - LABEL_LINE_OVERLAP;
            priority_offset = Vec2::new(
                (info_size.x - priority_size.x) / 2.0,
                title_size.y - LABEL_LINE_OVERLAP,
            );
        }

        Self {
            info_size,
            title_offset: Vec2::new((info_size.x - title_size.x) / 2.0, 0.0),
            priority_offset,
            priority_text,
        }
    }
}

/// Hover/drag flags per edge plus the cached label layout.
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    pub hover_left: bool,
    pub hover_right: bool,
    pub hover_top: bool,
    pub hover_bottom: bool,
    pub drag_left: bool,
    pub drag_right: bool,
    pub drag_top: bool,
    pub drag_bottom: bool,
    /// The active drag ends on release of the secondary button instead of the primary.
    pub drag_with_secondary: bool,
    pub layout: LabelLayout,
    /// Number of times `layout` has been computed for this state.
    pub layout_revision: u32,
}

impl DisplayState {
    pub fn new(title: &str, priority: i32, measure: &dyn TextMeasure) -> Self {
        let mut state = Self::default();
        state.info_changed(title, priority, measure);
        state
    }

    pub fn info_changed(&mut self, title: &str, priority: i32, measure: &dyn TextMeasure) {
        self.layout = LabelLayout::compute(title, priority, measure);
        self.layout_revision += 1;
    }

    pub fn hover_any(&self) -> bool {
        self.hover_left || self.hover_right || self.hover_top || self.hover_bottom
    }

    pub fn drag_any(&self) -> bool {
        self.drag_left || self.drag_right || self.drag_top || self.drag_bottom
    }

    pub fn reset_hover(&mut self) {
        self.hover_left = false;
        self.hover_right = false;
        self.hover_top = false;
        self.hover_bottom = false;
    }

    pub fn reset_drag(&mut self) {
        self.drag_left = false;
        self.drag_right = false;
        self.drag_top = false;
        self.drag_bottom = false;
        self.drag_with_secondary = false;
    }

    /// Promotes the currently hovered edges to dragged edges.
    pub fn hover_to_drag(&mut self) {
        self.drag_left = self.hover_left;
        self.drag_right = self.hover_right;
        self.drag_top = self.hover_top;
        self.drag_bottom = self.hover_bottom;
    }

    pub fn set_drag(&mut self, mask: BorderMask, with_secondary: bool) {
        self.drag_left = mask.contains(BorderMask::LEFT);
        self.drag_right = mask.contains(BorderMask::RIGHT);
        self.drag_top = mask.contains(BorderMask::TOP);
        self.drag_bottom = mask.contains(BorderMask::BOTTOM);
        self.drag_with_secondary = with_secondary;
    }

    pub fn drag_mask(&self) -> BorderMask {
        let mut mask = BorderMask::NONE;
        if self.drag_left {
            mask |= BorderMask::LEFT;
        }
        if self.drag_right {
            mask |= BorderMask::RIGHT;
        }
        if self.drag_top {
            mask |= BorderMask::TOP;
        }
        if self.drag_bottom {
            mask |= BorderMask::BOTTOM;
        }
        mask
    }

    pub fn hover_mask(&self) -> BorderMask {
        let mut mask = BorderMask::NONE;
        if self.hover_left {
            mask |= BorderMask::LEFT;
        }
        if self.hover_right {
            mask |= BorderMask::RIGHT;
        }
        if self.hover_top {
            mask |= BorderMask::TOP;
        }
        if self.hover_bottom {
            mask |= BorderMask::BOTTOM;
        }
        mask
    }
}
