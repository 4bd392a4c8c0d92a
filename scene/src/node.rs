//! Tree node data: child slots, component entries, optional transform.

use glam::Vec2;

use crate::arena::{ComponentId, NodeId};

/// One child edge. Removal nulls `node` in place; the empty slot is
/// pruned by the next update pass over the parent, never mid-iteration.
#[derive(Debug, Clone)]
pub struct ChildSlot {
    pub name: String,
    pub node: Option<NodeId>,
}

/// 2D transform state carried by entity nodes.
///
/// Global values are caches, recomputed top-down whenever a local setter
/// runs on this node or an ancestor. Composition is additive: global
/// position is the parent's global position plus the local offset,
/// rotation is the sum, scale is the componentwise product.
#[derive(Debug, Clone, PartialEq)]
pub struct Spatial {
    pub(crate) position: Vec2,
    pub(crate) scale: Vec2,
    pub(crate) rotation: f32,
    pub(crate) anchor: Vec2,
    pub(crate) z_order: i32,
    pub(crate) global_position: Vec2,
    pub(crate) global_scale: Vec2,
    pub(crate) global_rotation: f32,
}

impl Spatial {
    pub(crate) fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::ONE,
            rotation: 0.0,
            anchor: Vec2::new(0.5, 0.5),
            z_order: 0,
            global_position: Vec2::ZERO,
            global_scale: Vec2::ONE,
            global_rotation: 0.0,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn global_position(&self) -> Vec2 {
        self.global_position
    }

    pub fn global_scale(&self) -> Vec2 {
        self.global_scale
    }

    pub fn global_rotation(&self) -> f32 {
        self.global_rotation
    }
}

impl Default for Spatial {
    fn default() -> Self {
        Self::new()
    }
}

/// A scene-graph node: shared-ownership child edges plus exclusively
/// owned components, and a transform when the node is an entity.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<ChildSlot>,
    pub(crate) components: Vec<(String, ComponentId)>,
    pub(crate) spatial: Option<Spatial>,
}

impl Node {
    /// A plain grouping node with no transform of its own.
    pub(crate) fn plain() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            spatial: None,
        }
    }

    /// An entity node carrying a [`Spatial`] transform.
    pub(crate) fn entity() -> Self {
        Self {
            spatial: Some(Spatial::new()),
            ..Self::plain()
        }
    }

    pub fn is_entity(&self) -> bool {
        self.spatial.is_some()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn spatial(&self) -> Option<&Spatial> {
        self.spatial.as_ref()
    }

    /// Live child ids in insertion order, skipping removed slots.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().filter_map(|slot| slot.node)
    }

    /// Component `(name, id)` entries in insertion order.
    pub fn components(&self) -> impl Iterator<Item = (&str, ComponentId)> + '_ {
        self.components.iter().map(|(name, id)| (name.as_str(), *id))
    }
}
