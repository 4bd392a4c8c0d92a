//! Execution context handed to components.
//!
//! A component never stores engine references. Every hook receives an
//! [`UpdateContext`] that borrows the scene, the observer and the
//! frame-shared [`Services`] for exactly the duration of the call.

use std::sync::Arc;

use glam::Vec2;
use marigold_core::{
    AudioHost, PointerButton, ReadSource, ResourceCache, ResourceError, ScriptHost,
};
use marigold_render::{FontResource, RenderQueue, Texture, TextureFactory};

use crate::arena::{ComponentId, NodeId};
use crate::commands::{GameCommands, SceneCommands};
use crate::observer::Observer;
use crate::scene::Scene;

/// Spatial registry of pointer-sensitive areas.
///
/// Interactive components register convex polygons here; the input
/// router queries the registry to decide which node a pointer event
/// lands on. Areas are value-identified: unregistering passes the same
/// shape that was registered.
pub trait PointerIndex {
    fn register(&mut self, owner: NodeId, button: PointerButton, z_order: i32, vertices: &[Vec2]);
    fn unregister(&mut self, owner: NodeId, button: PointerButton, z_order: i32, vertices: &[Vec2]);
}

/// Index that ignores every registration, for headless setups.
#[derive(Debug, Default)]
pub struct NullPointerIndex;

impl PointerIndex for NullPointerIndex {
    fn register(&mut self, _: NodeId, _: PointerButton, _: i32, _: &[Vec2]) {}

    fn unregister(&mut self, _: NodeId, _: PointerButton, _: i32, _: &[Vec2]) {}
}

/// Engine services shared by every component dispatched this frame.
pub struct Services<'w> {
    pub resources: &'w mut ResourceCache,
    pub source: &'w dyn ReadSource,
    pub textures: &'w mut dyn TextureFactory,
    pub audio: &'w mut dyn AudioHost,
    pub script: &'w mut dyn ScriptHost,
    pub queue: &'w mut RenderQueue,
    pub pointer_index: &'w mut dyn PointerIndex,
    pub game: &'w GameCommands,
    pub commands: &'w SceneCommands,
}

/// Per-dispatch context: which component is running, on which node,
/// with mutable access to the scene and observer.
pub struct UpdateContext<'a, 'w> {
    pub scene: &'a mut Scene,
    pub observer: &'a mut Observer,
    pub services: &'a mut Services<'w>,
    owner: NodeId,
    component: ComponentId,
}

impl<'a, 'w> UpdateContext<'a, 'w> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        observer: &'a mut Observer,
        services: &'a mut Services<'w>,
        owner: NodeId,
        component: ComponentId,
    ) -> Self {
        Self {
            scene,
            observer,
            services,
            owner,
            component,
        }
    }

    /// The node this component is attached to.
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    /// The running component's own id.
    pub fn component(&self) -> ComponentId {
        self.component
    }

    /// The name the component was attached under.
    pub fn component_name(&self) -> Option<&str> {
        self.scene.component_name(self.component)
    }

    /// Queues a scene mutation to run once the current walk finishes.
    pub fn defer(&self, command: impl FnOnce(&mut Scene) + Send + 'static) {
        self.services.commands.push(command);
    }

    /// Loads a texture through the resource cache, decoding it with the
    /// active backend on a cache miss.
    pub fn load_texture(&mut self, path: &str) -> Result<Arc<Texture>, ResourceError> {
        let Services {
            resources,
            source,
            textures,
            ..
        } = &mut *self.services;
        resources.load_with(path, || {
            let bytes = source.read(path)?;
            textures
                .create_texture(&bytes)
                .map_err(|error| ResourceError::Load {
                    path: path.to_owned(),
                    reason: error.to_string(),
                })
        })
    }

    /// Fetches a preloaded font from the resource cache.
    pub fn load_font(&mut self, path: &str) -> Result<Arc<FontResource>, ResourceError> {
        self.services.resources.acquire(path)
    }

    pub fn position(&self) -> Vec2 {
        self.scene.position(self.owner).unwrap_or(Vec2::ZERO)
    }

    pub fn global_position(&self) -> Vec2 {
        self.scene.global_position(self.owner).unwrap_or(Vec2::ZERO)
    }

    pub fn scale(&self) -> Vec2 {
        self.scene.scale(self.owner).unwrap_or(Vec2::ONE)
    }

    pub fn global_scale(&self) -> Vec2 {
        self.scene.global_scale(self.owner).unwrap_or(Vec2::ONE)
    }

    pub fn rotation(&self) -> f32 {
        self.scene.rotation(self.owner).unwrap_or(0.0)
    }

    pub fn global_rotation(&self) -> f32 {
        self.scene.global_rotation(self.owner).unwrap_or(0.0)
    }

    pub fn z_order(&self) -> i32 {
        self.scene.z_order(self.owner).unwrap_or(0)
    }

    pub fn anchor(&self) -> Vec2 {
        self.scene.anchor(self.owner).unwrap_or(Vec2::splat(0.5))
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.scene.set_position(self.owner, position);
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.scene.set_scale(self.owner, scale);
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.scene.set_rotation(self.owner, rotation);
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        self.scene.set_z_order(self.owner, z_order);
    }

    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.scene.set_anchor(self.owner, anchor);
    }
}
