//! The scene graph: node tree, component attachment and the frame walk.
//!
//! All nodes and components live in two generational arenas owned by
//! [`Scene`]. Nodes are shared-ownership (a parent edge is one owner,
//! callers can retain more); components are owned exclusively by their
//! node. Component dispatch moves the component out of its slot for the
//! duration of the call, so hooks get `&mut Scene` without aliasing the
//! component they run on.

use glam::Vec2;
use serde_json::Value;

use crate::arena::{ComponentId, NodeId, Release, Slots};
use crate::component::{Component, PointerEvent, SceneError};
use crate::context::{Services, UpdateContext};
use crate::node::{ChildSlot, Node, Spatial};
use crate::observer::Observer;

/// Arena entry for one attached component.
///
/// `boxed` is `None` while the component is moved out for a hook call.
/// Dirty marks arriving during that window are parked in `pending_dirty`
/// and applied when the component is put back.
pub(crate) struct ComponentSlot {
    pub(crate) boxed: Option<Box<dyn Component>>,
    pub(crate) owner: NodeId,
    pub(crate) name: String,
    pub(crate) pending_dirty: bool,
}

/// The node and component arenas plus every tree operation.
#[derive(Default)]
pub struct Scene {
    nodes: Slots<Node>,
    components: Slots<ComponentSlot>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached grouping node with one owner (the caller).
    pub fn create_node(&mut self) -> NodeId {
        let (index, generation) = self.nodes.insert(Node::plain());
        NodeId::new(index, generation)
    }

    /// Creates a detached entity node with one owner (the caller).
    pub fn create_entity(&mut self) -> NodeId {
        let (index, generation) = self.nodes.insert(Node::entity());
        NodeId::new(index, generation)
    }

    pub fn is_alive(&self, node: NodeId) -> bool {
        self.nodes.is_alive(node.index(), node.generation())
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.index(), node.generation())
    }

    /// Adds an owner to a node. Stale ids are rejected.
    pub fn retain_node(&mut self, node: NodeId) -> bool {
        self.nodes.retain(node.index(), node.generation())
    }

    /// Drops one owner from a node. When the last owner goes, the node is
    /// freed together with its components, and each child loses the owner
    /// the parent edge held.
    pub fn release_node(&mut self, node: NodeId) {
        match self.nodes.release(node.index(), node.generation()) {
            Release::StillHeld => {}
            Release::Dead => log::warn!("release of dead node {node:?}"),
            Release::Freed(freed) => {
                for (_, component) in &freed.components {
                    self.free_component(*component);
                }
                for slot in &freed.children {
                    if let Some(child) = slot.node {
                        if let Some(c) = self.nodes.get_mut(child.index(), child.generation())
                            && c.parent == Some(node)
                        {
                            c.parent = None;
                        }
                        self.release_node(child);
                    }
                }
            }
        }
    }

    pub fn node_owners(&self, node: NodeId) -> Option<u32> {
        self.nodes.owners(node.index(), node.generation())
    }

    pub fn live_nodes(&self) -> u32 {
        self.nodes.live()
    }

    pub fn live_components(&self) -> u32 {
        self.components.live()
    }

    /// Frees everything regardless of owner counts. Shutdown teardown.
    pub fn clear(&mut self) {
        self.components.clear();
        self.nodes.clear();
    }

    // ----- tree edges -----

    /// Links `child` under `parent` with the given slot name and adds the
    /// edge's owner to the child. Rejects stale ids, nodes that already
    /// have a parent, and links that would close a cycle.
    pub fn add_child(&mut self, parent: NodeId, name: &str, child: NodeId) -> bool {
        if parent == child {
            log::warn!("cannot add {child:?} as its own child");
            return false;
        }
        if !self.is_alive(parent) || !self.is_alive(child) {
            log::warn!("add_child({parent:?}, {child:?}) with a dead node");
            return false;
        }
        if self.node(child).is_some_and(|n| n.parent.is_some()) {
            log::warn!("{child:?} already has a parent");
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("adding {child:?} under {parent:?} would close a cycle");
            return false;
        }

        self.nodes.retain(child.index(), child.generation());
        if let Some(c) = self.nodes.get_mut(child.index(), child.generation()) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.nodes.get_mut(parent.index(), parent.generation()) {
            p.children.push(ChildSlot {
                name: name.to_owned(),
                node: Some(child),
            });
        }
        // The child now composes against its new parent.
        self.refresh_global(child);
        true
    }

    /// Unlinks `child` from `parent` and drops the edge's owner. The
    /// child slot is nulled in place; the entry itself is pruned by the
    /// next update pass over the parent. Unknown edges are ignored.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let Some(slot) = self
            .nodes
            .get_mut(parent.index(), parent.generation())
            .and_then(|p| p.children.iter_mut().find(|s| s.node == Some(child)))
        else {
            log::debug!("remove_child({parent:?}, {child:?}): no such edge");
            return;
        };
        slot.node = None;
        if let Some(c) = self.nodes.get_mut(child.index(), child.generation())
            && c.parent == Some(parent)
        {
            c.parent = None;
        }
        self.release_node(child);
    }

    /// Unlinks every child of `parent`, dropping each edge's owner.
    pub fn remove_all_children(&mut self, parent: NodeId) {
        let Some(p) = self.nodes.get_mut(parent.index(), parent.generation()) else {
            return;
        };
        let removed: Vec<NodeId> = p.children.iter_mut().filter_map(|s| s.node.take()).collect();
        for child in removed {
            if let Some(c) = self.nodes.get_mut(child.index(), child.generation())
                && c.parent == Some(parent)
            {
                c.parent = None;
            }
            self.release_node(child);
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    /// Live child ids of `node`, in insertion order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| n.children().collect())
            .unwrap_or_default()
    }

    /// First live child attached under `name`. Duplicate names are
    /// allowed; lookup finds the earliest.
    pub fn child_by_name(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.node(parent)?
            .children
            .iter()
            .find(|s| s.node.is_some() && s.name == name)
            .and_then(|s| s.node)
    }

    pub fn has_child(&self, parent: NodeId, child: NodeId) -> bool {
        self.node(parent)
            .is_some_and(|n| n.children.iter().any(|s| s.node == Some(child)))
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut cursor = self.parent(of);
        while let Some(ancestor) = cursor {
            if ancestor == candidate {
                return true;
            }
            cursor = self.parent(ancestor);
        }
        false
    }

    fn prune_children(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(node.index(), node.generation()) {
            n.children.retain(|s| s.node.is_some());
        }
    }

    // ----- components -----

    /// Attaches a component under `name`. Names are unique per node;
    /// duplicates are rejected and the component is dropped.
    pub fn add_component(
        &mut self,
        node: NodeId,
        name: &str,
        component: Box<dyn Component>,
    ) -> Option<ComponentId> {
        let Some(n) = self.node(node) else {
            log::warn!("add_component on dead node {node:?}");
            return None;
        };
        if n.components.iter().any(|(existing, _)| existing == name) {
            log::warn!("{node:?} already has a component named `{name}`");
            return None;
        }

        let (index, generation) = self.components.insert(ComponentSlot {
            boxed: Some(component),
            owner: node,
            name: name.to_owned(),
            pending_dirty: false,
        });
        let id = ComponentId::new(index, generation);
        if let Some(n) = self.nodes.get_mut(node.index(), node.generation()) {
            n.components.push((name.to_owned(), id));
        }
        Some(id)
    }

    /// Detaches and destroys the component attached under `name`.
    /// Removal is immediate: the entry leaves the node's list now, not at
    /// the end of the frame.
    pub fn remove_component(&mut self, node: NodeId, name: &str) -> bool {
        let Some(position) = self
            .node(node)
            .and_then(|n| n.components.iter().position(|(existing, _)| existing == name))
        else {
            log::debug!("remove_component({node:?}, `{name}`): no such component");
            return false;
        };
        let Some(n) = self.nodes.get_mut(node.index(), node.generation()) else {
            return false;
        };
        let (_, id) = n.components.remove(position);
        self.free_component(id);
        true
    }

    fn free_component(&mut self, component: ComponentId) {
        if let Release::Dead = self
            .components
            .release(component.index(), component.generation())
        {
            log::warn!("component {component:?} was already dead");
        }
    }

    pub fn component_by_name(&self, node: NodeId, name: &str) -> Option<ComponentId> {
        self.node(node)?
            .components
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, id)| *id)
    }

    /// Component ids attached to `node`, in attachment order.
    pub fn components_of(&self, node: NodeId) -> Vec<ComponentId> {
        self.node(node)
            .map(|n| n.components.iter().map(|(_, id)| *id).collect())
            .unwrap_or_default()
    }

    pub fn is_component_alive(&self, component: ComponentId) -> bool {
        self.components
            .is_alive(component.index(), component.generation())
    }

    pub fn component_owner(&self, component: ComponentId) -> Option<NodeId> {
        self.components
            .get(component.index(), component.generation())
            .map(|slot| slot.owner)
    }

    pub fn component_name(&self, component: ComponentId) -> Option<&str> {
        self.components
            .get(component.index(), component.generation())
            .map(|slot| slot.name.as_str())
    }

    /// Runs `f` against the component downcast to `T`. Returns `None` if
    /// the component is dead, currently dispatched, or of another type.
    pub fn with_component_mut<T: Component, R>(
        &mut self,
        component: ComponentId,
        f: impl FnOnce(&mut T) -> R,
    ) -> Option<R> {
        let slot = self
            .components
            .get_mut(component.index(), component.generation())?;
        let boxed = slot.boxed.as_mut()?;
        let concrete = boxed.as_any_mut().downcast_mut::<T>()?;
        Some(f(concrete))
    }

    /// Moves a component out of its slot for a hook call.
    pub(crate) fn take_component(&mut self, component: ComponentId) -> Option<Box<dyn Component>> {
        self.components
            .get_mut(component.index(), component.generation())
            .and_then(|slot| slot.boxed.take())
    }

    /// Returns a component to its slot, applying any dirty mark that
    /// arrived while it was out. If the slot died mid-call the component
    /// is dropped here.
    pub(crate) fn put_back_component(&mut self, component: ComponentId, mut boxed: Box<dyn Component>) {
        match self
            .components
            .get_mut(component.index(), component.generation())
        {
            Some(slot) => {
                if slot.pending_dirty {
                    boxed.set_dirty();
                    slot.pending_dirty = false;
                }
                slot.boxed = Some(boxed);
            }
            None => log::debug!("discarding component {component:?} returned to a freed slot"),
        }
    }

    /// Marks every component of `node` dirty. Components moved out for a
    /// hook call get the mark parked and applied on return.
    pub fn mark_components_dirty(&mut self, node: NodeId) {
        for id in self.components_of(node) {
            if let Some(slot) = self.components.get_mut(id.index(), id.generation()) {
                match slot.boxed.as_mut() {
                    Some(component) => component.set_dirty(),
                    None => slot.pending_dirty = true,
                }
            }
        }
    }

    // ----- transform -----

    pub fn position(&self, node: NodeId) -> Option<Vec2> {
        self.spatial(node).map(Spatial::position)
    }

    pub fn scale(&self, node: NodeId) -> Option<Vec2> {
        self.spatial(node).map(Spatial::scale)
    }

    pub fn rotation(&self, node: NodeId) -> Option<f32> {
        self.spatial(node).map(Spatial::rotation)
    }

    pub fn anchor(&self, node: NodeId) -> Option<Vec2> {
        self.spatial(node).map(Spatial::anchor)
    }

    pub fn z_order(&self, node: NodeId) -> Option<i32> {
        self.spatial(node).map(Spatial::z_order)
    }

    pub fn global_position(&self, node: NodeId) -> Option<Vec2> {
        self.spatial(node).map(Spatial::global_position)
    }

    pub fn global_scale(&self, node: NodeId) -> Option<Vec2> {
        self.spatial(node).map(Spatial::global_scale)
    }

    pub fn global_rotation(&self, node: NodeId) -> Option<f32> {
        self.spatial(node).map(Spatial::global_rotation)
    }

    fn spatial(&self, node: NodeId) -> Option<&Spatial> {
        self.node(node).and_then(Node::spatial)
    }

    pub fn set_position(&mut self, node: NodeId, position: Vec2) {
        if self.set_local(node, |sp| sp.position = position) {
            self.refresh_global(node);
        } else {
            log::warn!("set_position on {node:?}, which has no transform");
        }
    }

    pub fn set_scale(&mut self, node: NodeId, scale: Vec2) {
        if self.set_local(node, |sp| sp.scale = scale) {
            self.refresh_global(node);
        } else {
            log::warn!("set_scale on {node:?}, which has no transform");
        }
    }

    pub fn set_rotation(&mut self, node: NodeId, rotation: f32) {
        if self.set_local(node, |sp| sp.rotation = rotation) {
            self.refresh_global(node);
        } else {
            log::warn!("set_rotation on {node:?}, which has no transform");
        }
    }

    /// Draw order is per node, not inherited. Changing it only redraws
    /// this node's own components.
    pub fn set_z_order(&mut self, node: NodeId, z_order: i32) {
        if self.set_local(node, |sp| sp.z_order = z_order) {
            self.mark_components_dirty(node);
        } else {
            log::warn!("set_z_order on {node:?}, which has no transform");
        }
    }

    pub fn set_anchor(&mut self, node: NodeId, anchor: Vec2) {
        if self.set_local(node, |sp| sp.anchor = anchor) {
            self.mark_components_dirty(node);
        } else {
            log::warn!("set_anchor on {node:?}, which has no transform");
        }
    }

    fn set_local(&mut self, node: NodeId, f: impl FnOnce(&mut Spatial)) -> bool {
        match self
            .nodes
            .get_mut(node.index(), node.generation())
            .and_then(|n| n.spatial.as_mut())
        {
            Some(sp) => {
                f(sp);
                true
            }
            None => false,
        }
    }

    /// Recomputes cached global transforms for `node` and its subtree,
    /// marking every touched node's components dirty. Composition is
    /// additive and restarts from identity under a non-entity parent.
    fn refresh_global(&mut self, node: NodeId) {
        let (base_position, base_scale, base_rotation) = self
            .node(node)
            .and_then(|n| n.parent)
            .and_then(|p| self.node(p))
            .and_then(Node::spatial)
            .map(|sp| (sp.global_position, sp.global_scale, sp.global_rotation))
            .unwrap_or((Vec2::ZERO, Vec2::ONE, 0.0));

        if let Some(n) = self.nodes.get_mut(node.index(), node.generation())
            && let Some(sp) = n.spatial.as_mut()
        {
            sp.global_position = base_position + sp.position;
            sp.global_scale = base_scale * sp.scale;
            sp.global_rotation = base_rotation + sp.rotation;
        }
        self.mark_components_dirty(node);
        for child in self.children(node) {
            self.refresh_global(child);
        }
    }

    // ----- dispatch -----

    /// Walks the tree from `root`, updating each node's components in
    /// attachment order and then its children in insertion order.
    /// Children removed earlier in the same pass are skipped; their
    /// nulled slots are pruned once the pass over their parent ends.
    pub fn update(
        &mut self,
        root: NodeId,
        dt: f32,
        observer: &mut Observer,
        services: &mut Services<'_>,
    ) {
        self.update_node(root, dt, observer, services);
    }

    fn update_node(
        &mut self,
        node: NodeId,
        dt: f32,
        observer: &mut Observer,
        services: &mut Services<'_>,
    ) {
        if !self.is_alive(node) {
            return;
        }
        for component in self.components_of(node) {
            let Some(mut boxed) = self.take_component(component) else {
                continue;
            };
            let mut ctx = UpdateContext::new(self, observer, services, node, component);
            boxed.update(dt, &mut ctx);
            self.put_back_component(component, boxed);
        }
        for child in self.children(node) {
            if !self.has_child(node, child) {
                // Removed by an earlier component this pass.
                continue;
            }
            self.update_node(child, dt, observer, services);
        }
        self.prune_children(node);
    }

    /// Delivers a pointer event to every component of `node`.
    pub fn dispatch_pointer(
        &mut self,
        node: NodeId,
        event: PointerEvent,
        observer: &mut Observer,
        services: &mut Services<'_>,
    ) {
        for component in self.components_of(node) {
            let Some(mut boxed) = self.take_component(component) else {
                continue;
            };
            let mut ctx = UpdateContext::new(self, observer, services, node, component);
            boxed.on_pointer(event, &mut ctx);
            self.put_back_component(component, boxed);
        }
    }

    /// Runs a freshly attached component's `init`. On error the
    /// component is detached again, so a failed init never leaves a
    /// half-configured component in the tree.
    pub fn init_component(
        &mut self,
        component: ComponentId,
        config: &Value,
        observer: &mut Observer,
        services: &mut Services<'_>,
    ) -> Result<(), SceneError> {
        let Some(owner) = self.component_owner(component) else {
            log::debug!("init of dead component {component:?}");
            return Ok(());
        };
        let Some(mut boxed) = self.take_component(component) else {
            return Ok(());
        };
        let result = {
            let mut ctx = UpdateContext::new(self, observer, services, owner, component);
            boxed.init(config, &mut ctx)
        };
        match result {
            Ok(()) => {
                self.put_back_component(component, boxed);
                Ok(())
            }
            Err(error) => {
                if let Some(name) = self.component_name(component).map(str::to_owned) {
                    self.remove_component(owner, &name);
                }
                Err(error)
            }
        }
    }
}
