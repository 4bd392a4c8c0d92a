//! Support for driving scenes without a windowed application.
//!
//! [`TestBench`] owns a scene plus headless stand-ins for every engine
//! service and wires them together the way the game loop does. Tests
//! and benchmarks across the workspace build worlds against it.

use std::any::Any;

use marigold_core::{MemorySource, NativeScriptHost, NullAudio, ResourceCache};
use marigold_render::{HeadlessBackend, RenderQueue};
use serde_json::Value;

use crate::arena::{ComponentId, NodeId};
use crate::commands::{GameCommands, SceneCommands};
use crate::component::{Component, ComponentRegistry, PointerEvent, SceneError};
use crate::context::{NullPointerIndex, PointerIndex, Services, UpdateContext};
use crate::observer::Observer;
use crate::scene::Scene;
use crate::world::{World, WorldError, load_world};

/// A scene with headless services, stepped manually.
pub struct TestBench {
    pub scene: Scene,
    pub observer: Observer,
    pub resources: ResourceCache,
    pub source: MemorySource,
    pub backend: HeadlessBackend,
    pub audio: NullAudio,
    pub script: NativeScriptHost,
    pub queue: RenderQueue,
    pub pointer_index: NullPointerIndex,
    pub game: GameCommands,
    pub commands: SceneCommands,
}

impl TestBench {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            // Seeded so single-subscriber picks are reproducible.
            observer: Observer::with_seed(0xD1CE),
            resources: ResourceCache::new(),
            source: MemorySource::new(),
            backend: HeadlessBackend::new(),
            audio: NullAudio,
            script: NativeScriptHost::new(),
            queue: RenderQueue::new(),
            pointer_index: NullPointerIndex,
            game: GameCommands::new(),
            commands: SceneCommands::new(),
        }
    }

    fn split(&mut self) -> (&mut Scene, &mut Observer, Services<'_>) {
        let Self {
            scene,
            observer,
            resources,
            source,
            backend,
            audio,
            script,
            queue,
            pointer_index,
            game,
            commands,
        } = self;
        (
            scene,
            observer,
            Services {
                resources,
                source: &*source,
                textures: backend,
                audio,
                script,
                queue,
                pointer_index,
                game: &*game,
                commands: &*commands,
            },
        )
    }

    /// Splits the bench around a caller-supplied pointer index.
    ///
    /// The built-in index swallows registrations; tests that route real
    /// pointer hits borrow their own index into the services instead.
    pub fn split_with_index<'a>(
        &'a mut self,
        pointer_index: &'a mut dyn PointerIndex,
    ) -> (&'a mut Scene, &'a mut Observer, Services<'a>) {
        let Self {
            scene,
            observer,
            resources,
            source,
            backend,
            audio,
            script,
            queue,
            pointer_index: _,
            game,
            commands,
        } = self;
        (
            scene,
            observer,
            Services {
                resources,
                source: &*source,
                textures: backend,
                audio,
                script,
                queue,
                pointer_index,
                game: &*game,
                commands: &*commands,
            },
        )
    }

    /// Walks the tree from `root` once.
    pub fn update(&mut self, root: NodeId, dt: f32) {
        let (scene, observer, mut services) = self.split();
        scene.update(root, dt, observer, &mut services);
    }

    /// Delivers a pointer event to `node`'s components.
    pub fn pointer(&mut self, node: NodeId, event: PointerEvent) {
        let (scene, observer, mut services) = self.split();
        scene.dispatch_pointer(node, event, observer, &mut services);
    }

    /// Runs a component's init against this bench's services.
    pub fn init(&mut self, component: ComponentId, config: &Value) -> Result<(), SceneError> {
        let (scene, observer, mut services) = self.split();
        scene.init_component(component, config, observer, &mut services)
    }

    /// Loads a world from the in-memory source.
    pub fn load_world(
        &mut self,
        registry: &ComponentRegistry,
        name: &str,
    ) -> Result<World, WorldError> {
        let (scene, observer, mut services) = self.split();
        load_world(name, scene, registry, observer, &mut services)
    }

    /// Applies deferred scene commands.
    pub fn apply_commands(&mut self) {
        self.commands.apply(&mut self.scene);
    }

    /// Delivers every queued bus message.
    pub fn drain(&mut self) {
        crate::observer::drain(&mut self.scene, &mut self.observer, &self.game);
    }

    /// One full frame: update, deferred commands, message drain.
    pub fn frame(&mut self, root: NodeId, dt: f32) {
        self.update(root, dt);
        self.apply_commands();
        self.drain();
    }
}

impl Default for TestBench {
    fn default() -> Self {
        Self::new()
    }
}

/// A component with no behavior, for wiring tests.
pub struct Noop;

impl Component for Noop {
    fn update(&mut self, _dt: f32, _ctx: &mut UpdateContext<'_, '_>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
