//! Integer tile rectangles.
//!
//! Containment and intersection are half-open: a rectangle covers
//! `[left, right) x [top, bottom)`, so two zones sharing an edge never both
//! claim the tiles on that edge.
//!
//! Edge math saturates at the `i32` range, so a far edge that would overflow
//! sits at `i32::MAX` instead.

use bevy::math::IVec2;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in tile coordinates. `y` grows downwards.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub struct TileRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl TileRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from its four edges. `right`/`bottom` are exclusive.
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right.saturating_sub(left), bottom.saturating_sub(top))
    }

    #[inline]
    pub const fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    #[inline]
    pub const fn top(&self) -> i32 {
        self.y
    }

    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Integer center, truncated towards the rectangle origin.
    pub const fn center(&self) -> IVec2 {
        IVec2::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// Whether both far edges are representable without saturating.
    pub const fn edges_fit(&self) -> bool {
        self.x.checked_add(self.width).is_some() && self.y.checked_add(self.height).is_some()
    }

    pub const fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns a copy whose zero extents are bumped up to one tile.
    pub const fn with_min_extent(mut self) -> Self {
        if self.width == 0 {
            self.width = 1;
        }
        if self.height == 0 {
            self.height = 1;
        }
        self
    }

    #[inline]
    pub fn contains(&self, point: IVec2) -> bool {
        self.x <= point.x && point.x < self.right() && self.y <= point.y && point.y < self.bottom()
    }

    #[inline]
    pub fn intersects(&self, other: &TileRect) -> bool {
        other.left() < self.right()
            && self.left() < other.right()
            && other.top() < self.bottom()
            && self.top() < other.bottom()
    }

    /// Smallest rectangle covering both inputs.
    pub fn union(&self, other: &TileRect) -> TileRect {
        TileRect::from_edges(
            self.left().min(other.left()),
            self.top().min(other.top()),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Overlapping region, if any.
    pub fn intersection(&self, other: &TileRect) -> Option<TileRect> {
        if !self.intersects(other) {
            return None;
        }
        Some(TileRect::from_edges(
            self.left().max(other.left()),
            self.top().max(other.top()),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        ))
    }
}

/// Set of rectangle edges, used to start or describe border drags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BorderMask(u8);

impl BorderMask {
    pub const NONE: BorderMask = BorderMask(0);
    pub const LEFT: BorderMask = BorderMask(1);
    pub const RIGHT: BorderMask = BorderMask(2);
    pub const TOP: BorderMask = BorderMask(4);
    pub const BOTTOM: BorderMask = BorderMask(8);

    pub const fn contains(self, other: BorderMask) -> bool {
        self.0 & other.0 == other.0 && other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl std::ops::BitOr for BorderMask {
    type Output = BorderMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        BorderMask(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for BorderMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_derived() {
        let r = TileRect::new(10, 20, 5, 3);
        assert_eq!(r.left(), 10);
        assert_eq!(r.right(), 15);
        assert_eq!(r.top(), 20);
        assert_eq!(r.bottom(), 23);
        assert_eq!(TileRect::from_edges(10, 20, 15, 23), r);
    }

    #[test]
    fn test_contains_is_half_open() {
        let r = TileRect::new(0, 0, 4, 4);
        assert!(r.contains(IVec2::new(0, 0)));
        assert!(r.contains(IVec2::new(3, 3)));
        assert!(!r.contains(IVec2::new(4, 0)));
        assert!(!r.contains(IVec2::new(0, 4)));
        assert!(!r.contains(IVec2::new(-1, 2)));
    }

    #[test]
    fn test_adjacent_rects_share_no_tile() {
        let a = TileRect::new(0, 0, 4, 4);
        let b = TileRect::new(4, 0, 4, 4);
        assert!(!a.intersects(&b));
        let edge = IVec2::new(4, 2);
        assert!(!a.contains(edge));
        assert!(b.contains(edge));
    }

    #[test]
    fn test_union_and_intersection() {
        let a = TileRect::new(10, 10, 5, 5);
        let b = TileRect::new(12, 12, 5, 5);
        assert_eq!(a.union(&b), TileRect::from_edges(10, 10, 17, 17));
        assert_eq!(
            a.intersection(&b),
            Some(TileRect::from_edges(12, 12, 15, 15))
        );
        assert_eq!(a.intersection(&TileRect::new(40, 40, 1, 1)), None);
    }

    #[test]
    fn test_min_extent_only_bumps_zero() {
        assert_eq!(
            TileRect::new(3, 3, 0, 0).with_min_extent(),
            TileRect::new(3, 3, 1, 1)
        );
        assert_eq!(
            TileRect::new(3, 3, 2, 0).with_min_extent(),
            TileRect::new(3, 3, 2, 1)
        );
    }

    #[test]
    fn test_far_edges_saturate_near_i32_max() {
        let r = TileRect::new(i32::MAX - 1, 0, 5, 5);
        assert!(!r.edges_fit());
        assert_eq!(r.right(), i32::MAX);
        assert!(r.contains(IVec2::new(i32::MAX - 1, 1)));
        assert!(r.intersects(&TileRect::new(i32::MAX - 3, 0, 3, 3)));
        assert_eq!(r.center(), IVec2::new(i32::MAX, 2));
        let wide = r.union(&TileRect::new(i32::MIN, 0, 1, 1));
        assert_eq!(wide.left(), i32::MIN);
        assert_eq!(wide.width, i32::MAX);
        assert!(TileRect::new(-5, -5, 10, 10).edges_fit());
    }

    #[test]
    fn test_border_mask_ops() {
        let mask = BorderMask::RIGHT | BorderMask::BOTTOM;
        assert!(mask.contains(BorderMask::RIGHT));
        assert!(mask.contains(BorderMask::BOTTOM));
        assert!(!mask.contains(BorderMask::LEFT));
        assert!(!mask.contains(BorderMask::NONE));
        assert!(BorderMask::NONE.is_empty());
    }
}
