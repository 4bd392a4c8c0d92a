//! Deferred mutation buffers.
//!
//! Structural changes requested while the tree is being walked, or from
//! code that only holds a shared reference, are queued here and applied
//! at fixed points in the frame: scene commands after the world update,
//! game commands at the end of the frame.

use parking_lot::Mutex;

use crate::arena::NodeId;
use crate::scene::Scene;

type SceneCommand = Box<dyn FnOnce(&mut Scene) + Send>;

/// A buffer for deferred scene mutations.
///
/// Pushing needs only `&self`, so components and routers can queue
/// structural changes mid-walk; the driver applies the queue once the
/// walk is done.
#[derive(Default)]
pub struct SceneCommands {
    queue: Mutex<Vec<SceneCommand>>,
}

impl SceneCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a raw command closure.
    pub fn push(&self, command: impl FnOnce(&mut Scene) + Send + 'static) {
        self.queue.lock().push(Box::new(command));
    }

    /// Queues removal of a child edge.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) {
        self.push(move |scene| {
            scene.remove_child(parent, child);
        });
    }

    /// Queues removal of a component by name.
    pub fn remove_component(&self, node: NodeId, name: impl Into<String>) {
        let name = name.into();
        self.push(move |scene| {
            scene.remove_component(node, &name);
        });
    }

    /// Queues a release of one node ownership.
    pub fn release_node(&self, node: NodeId) {
        self.push(move |scene| {
            scene.release_node(node);
        });
    }

    /// Applies and clears every queued command, in push order.
    pub fn apply(&self, scene: &mut Scene) {
        let commands = std::mem::take(&mut *self.queue.lock());
        for command in commands {
            command(scene);
        }
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

/// A frame-deferred request to the game driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    /// Push a world onto the stack and switch to it.
    PushWorld(String),
    /// Destroy the current world and resume the one below it.
    PopWorld,
    /// Destroy the current world and load a replacement in place.
    ReplaceWorld(String),
    /// Stop the game loop.
    Quit,
}

/// Buffer of [`GameCommand`]s, drained by the driver between frames.
///
/// World switching cannot happen mid-frame: the requesting script is
/// itself part of the world being torn down.
#[derive(Default)]
pub struct GameCommands {
    queue: Mutex<Vec<GameCommand>>,
}

impl GameCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, command: GameCommand) {
        self.queue.lock().push(command);
    }

    /// Takes every queued command in push order.
    pub fn drain(&self) -> Vec<GameCommand> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}
