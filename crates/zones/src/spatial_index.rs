//! Static AABB tree over the live zone list.
//!
//! The tree is rebuilt from scratch after every geometry change. Nodes live in
//! a flat arena; leaves refer to zones by their slot in the owning
//! `ZoneWorld`'s list, so the index must be rebuilt whenever that list is
//! compacted.
//!
//! Construction sorts zones by rectangle-center x and splits each range at
//! `n / 2`, giving a balanced tree. Queries walk the tree with an explicit
//! stack, pruning every subtree whose bounds do not contain the point.

use bevy::math::IVec2;

use crate::geometry::TileRect;
use crate::zone::Zone;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { slot: usize },
    Branch { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    rect: TileRect,
    kind: NodeKind,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneIndex {
    nodes: Vec<Node>,
    root: Option<usize>,
    leaf_count: usize,
}

impl ZoneIndex {
    /// Builds the tree over every non-trashed zone in `zones`.
    pub fn build(zones: &[Zone]) -> Self {
        let mut slots: Vec<usize> = (0..zones.len()).filter(|&i| !zones[i].trashed).collect();
        // Stable, so equal centers keep list order and builds are reproducible.
        slots.sort_by_key(|&i| zones[i].rect().center().x);

        let mut index = ZoneIndex {
            nodes: Vec::with_capacity(slots.len().saturating_mul(2)),
            root: None,
            leaf_count: slots.len(),
        };
        if !slots.is_empty() {
            let root = index.build_range(zones, &slots);
            index.root = Some(root);
        }
        index
    }

    fn build_range(&mut self, zones: &[Zone], slots: &[usize]) -> usize {
        if let [slot] = slots {
            self.nodes.push(Node {
                rect: zones[*slot].rect(),
                kind: NodeKind::Leaf { slot: *slot },
            });
            return self.nodes.len() - 1;
        }
        let mid = slots.len() / 2;
        let left = self.build_range(zones, &slots[..mid]);
        let right = self.build_range(zones, &slots[mid..]);
        self.nodes.push(Node {
            rect: self.nodes[left].rect.union(&self.nodes[right].rect),
            kind: NodeKind::Branch { left, right },
        });
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of zones indexed.
    pub fn len(&self) -> usize {
        self.leaf_count
    }

    /// Bounds of the whole tree.
    pub fn bounds(&self) -> Option<TileRect> {
        self.root.map(|root| self.nodes[root].rect)
    }

    /// Slots of every live zone whose rectangle contains `point`.
    pub fn find_all(&self, zones: &[Zone], point: IVec2) -> Vec<usize> {
        let mut found = Vec::new();
        self.walk_containing(point, |slot| {
            if zones.get(slot).is_some_and(|z| !z.trashed) {
                found.push(slot);
            }
        });
        found
    }

    /// Slot of the highest-priority live zone containing `point`.
    ///
    /// Equal priorities keep whichever zone the traversal reached first.
    pub fn find_best(&self, zones: &[Zone], point: IVec2) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        self.walk_containing(point, |slot| {
            let Some(zone) = zones.get(slot).filter(|z| !z.trashed) else {
                return;
            };
            match best {
                Some((_, priority)) if zone.priority() <= priority => {}
                _ => best = Some((slot, zone.priority())),
            }
        });
        best.map(|(slot, _)| slot)
    }

    fn walk_containing(&self, point: IVec2, mut visit: impl FnMut(usize)) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.rect.contains(point) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { slot } => visit(slot),
                NodeKind::Branch { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }

    /// Visits every leaf as `(slot, rect)` in traversal order.
    pub fn for_each_leaf(&self, mut visit: impl FnMut(usize, TileRect)) {
        let Some(root) = self.root else {
            return;
        };
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            match node.kind {
                NodeKind::Leaf { slot } => visit(slot, node.rect),
                NodeKind::Branch { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
    }

    /// Depth of the deepest leaf; 0 for an empty tree, 1 for a single zone.
    pub fn depth(&self) -> usize {
        let Some(root) = self.root else {
            return 0;
        };
        let mut deepest = 0;
        let mut stack = vec![(root, 1usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes[idx].kind {
                NodeKind::Leaf { .. } => deepest = deepest.max(depth),
                NodeKind::Branch { left, right } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }
}
