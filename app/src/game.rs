//! The game driver.
//!
//! [`Game`] owns the whole engine context and runs the fixed frame
//! order: poll input, route pointer events, update the active world,
//! apply deferred scene commands, drain the observer, flush the render
//! queue, present. World-stack requests queued through [`GameCommands`]
//! apply between frames, because the requesting component is usually
//! part of the world being torn down.

use std::collections::HashMap;

use glam::{Affine2, Vec2};
use marigold_core::{AudioHost, Color, Input, ReadSource, ResourceCache, ScriptHost};
use marigold_render::{Camera, RenderBackend, RenderQueue, TextureFactory};
use marigold_scene::{
    ComponentRegistry, GameCommand, GameCommands, Observer, Scene, SceneCommands, Services, World,
    WorldError, drain, load_world,
};
use marigold_ui::{ClickIndex, EventRouter};

use crate::settings::Settings;
use crate::timer::LoopTimer;
use crate::window::Window;

/// What the driver needs from one backend object: executing draw
/// commands and decoding textures.
pub trait EngineBackend: RenderBackend + TextureFactory {}

impl<T: RenderBackend + TextureFactory> EngineBackend for T {}

/// The engine context, the world stack, and the frame loop.
///
/// Worlds are cached by name: switching away pauses a world in place,
/// switching back resumes it with all its state. Only the explicit
/// destroy operations ([`Game::pop_and_load`], [`Game::destroy_and_load`])
/// release a cached world's tree.
pub struct Game<B: EngineBackend> {
    settings: Settings,
    window: Box<dyn Window>,
    backend: B,
    source: Box<dyn ReadSource>,
    audio: Box<dyn AudioHost>,
    script: Box<dyn ScriptHost>,

    scene: Scene,
    observer: Observer,
    registry: ComponentRegistry,
    resources: ResourceCache,
    queue: RenderQueue,
    index: ClickIndex,
    router: EventRouter,
    input: Input,
    game_commands: GameCommands,
    scene_commands: SceneCommands,

    worlds: HashMap<String, World>,
    stack: Vec<String>,
    current: Option<String>,
    running: bool,
}

impl<B: EngineBackend> Game<B> {
    pub fn new(
        settings: Settings,
        window: Box<dyn Window>,
        backend: B,
        source: Box<dyn ReadSource>,
        audio: Box<dyn AudioHost>,
        script: Box<dyn ScriptHost>,
        registry: ComponentRegistry,
    ) -> Self {
        let extent = Vec2::new(settings.window_width as f32, settings.window_height as f32);
        Self {
            window,
            backend,
            source,
            audio,
            script,
            scene: Scene::new(),
            observer: Observer::new(),
            registry,
            resources: ResourceCache::new(),
            queue: RenderQueue::new(),
            index: ClickIndex::new(Vec2::ZERO, extent),
            router: EventRouter::new(),
            input: Input::new(),
            game_commands: GameCommands::new(),
            scene_commands: SceneCommands::new(),
            worlds: HashMap::new(),
            stack: Vec::new(),
            current: None,
            running: false,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The active world's name.
    pub fn current_world(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// A cached world, active or suspended.
    pub fn world(&self, name: &str) -> Option<&World> {
        self.worlds.get(name)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The resource cache, for preloading resources that cannot be built
    /// from source bytes on demand. Fonts must be inserted here before a
    /// world with labels loads.
    pub fn resources_mut(&mut self) -> &mut ResourceCache {
        &mut self.resources
    }

    /// The driver-command buffer, for shells that push requests from
    /// outside the scene walk.
    pub fn commands(&self) -> &GameCommands {
        &self.game_commands
    }

    fn split(&mut self) -> (&mut Scene, &mut Observer, &ComponentRegistry, Services<'_>) {
        let Self {
            scene,
            observer,
            registry,
            resources,
            source,
            backend,
            audio,
            script,
            queue,
            index,
            game_commands,
            scene_commands,
            ..
        } = self;
        (
            scene,
            observer,
            &*registry,
            Services {
                resources,
                source: &**source,
                textures: backend,
                audio: &mut **audio,
                script: &mut **script,
                queue,
                pointer_index: index,
                game: &*game_commands,
                commands: &*scene_commands,
            },
        )
    }

    /// Makes `name` the active world, loading and caching it on first
    /// use. The previously active world stays cached, paused.
    pub fn load_world(&mut self, name: &str) -> Result<(), WorldError> {
        if !self.worlds.contains_key(name) {
            let (scene, observer, registry, mut services) = self.split();
            let world = load_world(name, scene, registry, observer, &mut services)?;
            self.worlds.insert(name.to_owned(), world);
        }
        self.current = Some(name.to_owned());
        Ok(())
    }

    /// Suspends the active world on the stack and activates `name`.
    pub fn push_and_load(&mut self, name: &str) -> Result<(), WorldError> {
        let suspended = self.current.clone();
        self.load_world(name)?;
        // Pushing a world onto itself would make the later pop destroy
        // the world it resumes.
        if let Some(previous) = suspended
            && self.current.as_deref() != Some(previous.as_str())
        {
            self.stack.push(previous);
        }
        Ok(())
    }

    /// Destroys the active world and resumes the most recently pushed
    /// one. With nothing on the stack the active world stays.
    pub fn pop_and_load(&mut self) {
        let Some(resumed) = self.stack.pop() else {
            log::warn!("pop requested with an empty world stack");
            return;
        };
        let popped = self.current.replace(resumed);
        if let Some(name) = popped
            && self.current.as_deref() != Some(name.as_str())
        {
            self.destroy_world(&name);
        }
    }

    /// Activates `name` and destroys the world it replaces. Replacing a
    /// world with itself reloads nothing and destroys nothing.
    pub fn destroy_and_load(&mut self, name: &str) -> Result<(), WorldError> {
        let replaced = self.current.clone();
        self.load_world(name)?;
        if let Some(old) = replaced
            && old != name
        {
            self.destroy_world(&old);
        }
        Ok(())
    }

    /// Stops the loop at the end of the current frame.
    pub fn quit(&mut self) {
        self.running = false;
    }

    fn destroy_world(&mut self, name: &str) {
        if let Some(world) = self.worlds.remove(name) {
            self.scene.release_node(world.root);
            log::info!("destroyed world `{name}`");
        }
    }

    /// Loads the welcome world, then runs frames until the window
    /// closes or something calls [`Game::quit`].
    pub fn run(&mut self) -> Result<(), WorldError> {
        let welcome = self.settings.welcome_world.clone();
        self.load_world(&welcome)?;

        let mut timer = LoopTimer::new(self.settings.max_frame_rate);
        let mut dt = timer.min_duration();
        self.running = true;
        timer.start();
        while self.running && !self.window.should_close() {
            self.frame(dt);
            dt = timer.tick();
        }
        self.running = false;
        Ok(())
    }

    /// Runs one frame. Public so shells with their own event loop can
    /// drive frames from a redraw callback instead of [`Game::run`].
    pub fn frame(&mut self, dt: f32) {
        self.window.poll(&mut self.input);
        if self.input.quit_requested() {
            self.running = false;
        }

        let routed = self
            .router
            .route(&self.input, &self.scene, &mut self.index, &mut self.observer);

        let active = self
            .current
            .as_ref()
            .and_then(|name| self.worlds.get(name))
            .map(|world| (world.root, world.background, world.camera_center));

        if let Some((root, background, center)) = active {
            {
                let (scene, observer, _, mut services) = self.split();
                for (node, event) in routed {
                    scene.dispatch_pointer(node, event, observer, &mut services);
                }
                scene.update(root, dt, observer, &mut services);
            }
            self.scene_commands.apply(&mut self.scene);
            drain(&mut self.scene, &mut self.observer, &self.game_commands);

            let view = Vec2::new(self.window.width() as f32, self.window.height() as f32);
            let camera = Camera::with_view_size(center, view);
            self.queue
                .flush(&mut self.backend, background, camera.view_transform());
        } else {
            self.queue
                .flush(&mut self.backend, Color::BLACK, Affine2::IDENTITY);
        }
        self.window.present();

        for command in self.game_commands.drain() {
            self.apply_command(command);
        }
    }

    /// Applies one queued world-stack request. A failure is logged and
    /// leaves the stack as it was.
    fn apply_command(&mut self, command: GameCommand) {
        let result = match command {
            GameCommand::PushWorld(name) => self.push_and_load(&name),
            GameCommand::PopWorld => {
                self.pop_and_load();
                Ok(())
            }
            GameCommand::ReplaceWorld(name) => self.destroy_and_load(&name),
            GameCommand::Quit => {
                self.quit();
                Ok(())
            }
        };
        if let Err(error) = result {
            log::error!("world-stack request failed: {error}");
        }
    }
}
