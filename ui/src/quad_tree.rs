//! Spatial index over clickable areas.
//!
//! A quad tree splits the indexed region at each node's midpoint.
//! Receivers whose bounds fit inside a single quadrant sink into the
//! matching child; a receiver spanning the split stays at the node
//! that covers it. A point query therefore walks one root-to-leaf
//! path and only tests receivers stored along that path.

use glam::Vec2;
use marigold_core::PointerButton;

use crate::receiver::Receiver;

/// Receivers a node may hold before redistributing into quadrants.
const SPLIT_THRESHOLD: usize = 8;

/// Depth at which nodes stop splitting and simply grow.
const MAX_DEPTH: usize = 8;

// Quadrants are numbered upper-left 0, upper-right 1, lower-left 2,
// lower-right 3. Splits are half-open: a coordinate exactly on the
// midline belongs to the right or upper side.

fn quadrant_of(mid: Vec2, min: Vec2, max: Vec2) -> Option<usize> {
    let column = if min.x >= mid.x {
        1
    } else if max.x < mid.x {
        0
    } else {
        return None;
    };
    let row = if min.y >= mid.y {
        0
    } else if max.y < mid.y {
        1
    } else {
        return None;
    };
    Some(row * 2 + column)
}

fn point_quadrant(mid: Vec2, point: Vec2) -> usize {
    let column = usize::from(point.x >= mid.x);
    let row = usize::from(point.y < mid.y);
    row * 2 + column
}

#[derive(Debug)]
struct QuadNode {
    min: Vec2,
    max: Vec2,
    receivers: Vec<Receiver>,
    children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min,
            max,
            receivers: Vec::new(),
            children: Default::default(),
        }
    }

    fn mid(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    fn child_bounds(&self, quadrant: usize) -> (Vec2, Vec2) {
        let mid = self.mid();
        match quadrant {
            0 => (Vec2::new(self.min.x, mid.y), Vec2::new(mid.x, self.max.y)),
            1 => (mid, self.max),
            2 => (self.min, mid),
            _ => (Vec2::new(mid.x, self.min.y), Vec2::new(self.max.x, mid.y)),
        }
    }

    fn child(&mut self, quadrant: usize) -> &mut QuadNode {
        let (min, max) = self.child_bounds(quadrant);
        self.children[quadrant].get_or_insert_with(|| Box::new(QuadNode::new(min, max)))
    }

    fn is_empty(&self) -> bool {
        self.receivers.is_empty() && self.children.iter().all(Option::is_none)
    }

    fn insert(&mut self, receiver: Receiver, depth: usize) {
        self.receivers.push(receiver);
        if self.receivers.len() < SPLIT_THRESHOLD || depth >= MAX_DEPTH {
            return;
        }
        // Push every receiver that fits a single quadrant down one
        // level. Straddlers keep living here, and removal preserves
        // registration order so z-order ties stay stable.
        let mid = self.mid();
        let mut i = 0;
        while i < self.receivers.len() {
            let (min, max) = self.receivers[i].bounds();
            match quadrant_of(mid, min, max) {
                Some(quadrant) => {
                    let value = self.receivers.remove(i);
                    self.child(quadrant).insert(value, depth + 1);
                }
                None => i += 1,
            }
        }
    }

    fn erase(&mut self, receiver: &Receiver, min: Vec2, max: Vec2) -> bool {
        if let Some(quadrant) = quadrant_of(self.mid(), min, max)
            && let Some(child) = self.children[quadrant].as_mut()
            && child.erase(receiver, min, max)
        {
            if child.is_empty() {
                self.children[quadrant] = None;
            }
            return true;
        }
        if let Some(found) = self.receivers.iter().position(|held| held == receiver) {
            self.receivers.remove(found);
            return true;
        }
        false
    }

    fn query<'t>(
        &'t self,
        point: Vec2,
        button: PointerButton,
        mut best: Option<&'t Receiver>,
    ) -> Option<&'t Receiver> {
        for held in &self.receivers {
            if held.button == button
                && held.contains(point)
                && best.is_none_or(|b| b.z_order < held.z_order)
            {
                best = Some(held);
            }
        }
        match &self.children[point_quadrant(self.mid(), point)] {
            Some(child) => child.query(point, button, best),
            None => best,
        }
    }

    fn retain<F: FnMut(&Receiver) -> bool>(&mut self, keep: &mut F) -> usize {
        let before = self.receivers.len();
        self.receivers.retain(|held| keep(held));
        let mut removed = before - self.receivers.len();
        for slot in &mut self.children {
            if let Some(child) = slot {
                removed += child.retain(keep);
                if child.is_empty() {
                    *slot = None;
                }
            }
        }
        removed
    }

    #[cfg(test)]
    fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    #[cfg(test)]
    fn max_leaf_len(&self) -> usize {
        if self.children.iter().all(Option::is_none) {
            return self.receivers.len();
        }
        self.children
            .iter()
            .flatten()
            .map(|child| child.max_leaf_len())
            .max()
            .unwrap_or(0)
    }
}

/// Spatial index over [`Receiver`] polygons.
#[derive(Debug)]
pub struct QuadTree {
    root: QuadNode,
    len: usize,
}

impl QuadTree {
    /// Builds an index partitioning the region from `min` to `max`.
    ///
    /// Receivers outside the region still land in the tree, they just
    /// stop benefiting from partitioning, so the region should cover
    /// the pointer-reachable world space.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            root: QuadNode::new(min, max),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Indexes a receiver. A polygon without vertices is rejected.
    pub fn insert(&mut self, receiver: Receiver) {
        if receiver.vertices.is_empty() {
            log::warn!("refusing to index a receiver without vertices");
            return;
        }
        self.root.insert(receiver, 0);
        self.len += 1;
    }

    /// Removes the first entry structurally equal to `receiver`.
    ///
    /// Entries are treated as immutable while indexed: removal descends
    /// by the bounds of the shape it is given, so callers must pass the
    /// exact shape they registered, not a moved copy of it.
    pub fn erase(&mut self, receiver: &Receiver) {
        if receiver.vertices.is_empty() {
            log::warn!("refusing to erase a receiver without vertices");
            return;
        }
        let (min, max) = receiver.bounds();
        if self.root.erase(receiver, min, max) {
            self.len -= 1;
        }
    }

    /// Drops every receiver failing the predicate and prunes emptied
    /// quadrants. Sweeps entries whose owner died without
    /// unregistering.
    pub fn retain<F: FnMut(&Receiver) -> bool>(&mut self, mut keep: F) {
        self.len -= self.root.retain(&mut keep);
    }

    /// The topmost receiver under `point` for `button`, if any.
    /// Z-order ties keep the earliest registration.
    pub fn query(&self, point: Vec2, button: PointerButton) -> Option<&Receiver> {
        self.root.query(point, button, None)
    }

    /// Drops every entry, keeping the region.
    pub fn clear(&mut self) {
        self.root.receivers.clear();
        self.root.children = Default::default();
        self.len = 0;
    }
}
