//! Script-driven state machine component.
//!
//! A machine owns one script instance and dispatches lifecycle hooks on
//! it: `enter` once on the first frame, `update<State>` every frame,
//! `on<Message>` for bus messages, `exit` when halting. Hooks talk back
//! through [`ScriptApi`]; requests that change the machine itself (state
//! moves, halting) are collected and applied after the hook returns, so
//! a hook never mutates the machine it is running on.

use std::any::Any;
use std::collections::{HashMap, HashSet};

use glam::Vec2;
use marigold_core::{ConfigExt, ScriptApi, ScriptInstance, ScriptValue};
use serde_json::Value;

use crate::arena::{ComponentId, NodeId};
use crate::commands::{GameCommand, GameCommands};
use crate::component::{Component, SceneError};
use crate::context::UpdateContext;
use crate::observer::Observer;
use crate::scene::Scene;

/// Whitelist entry that accepts a message in every state.
pub const ANY_STATE: &str = "__all__";

const ENTER_HOOK: &str = "enter";
const EXIT_HOOK: &str = "exit";

/// Cached resolution of the current state's update hook. Invalidated by
/// every state move; `Missing` keeps the "no such hook" warning to one
/// per state entry.
enum HookCache {
    Unresolved,
    Missing,
    Resolved(String),
}

pub struct StateMachine {
    module: String,
    class: String,
    component_name: String,
    instance: Option<Box<dyn ScriptInstance>>,
    state: String,
    entered: bool,
    update_hook: HookCache,
    whitelist: HashMap<String, HashSet<String>>,
    halted: bool,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            module: String::new(),
            class: String::new(),
            component_name: String::new(),
            instance: None,
            state: String::new(),
            entered: false,
            update_hook: HookCache::Unresolved,
            whitelist: HashMap::new(),
            halted: false,
        }
    }

    pub fn factory() -> Box<dyn Component> {
        Box::new(Self::new())
    }

    /// The current state name; empty until a hook moves somewhere.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Reads a field off the script instance; `Nil` once halted.
    pub fn field(&self, name: &str) -> ScriptValue {
        self.instance
            .as_ref()
            .map(|instance| instance.get(name))
            .unwrap_or_default()
    }

    /// Writes a field on the script instance. No-op once halted.
    pub fn instance_set(&mut self, field: &str, value: ScriptValue) {
        if let Some(instance) = self.instance.as_mut() {
            instance.set(field, value);
        }
    }

    /// Delivers a bus message. `filtered` messages pass the state
    /// whitelist first; sibling messages skip it.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn deliver(
        &mut self,
        name: &str,
        sender: &ScriptValue,
        data: &ScriptValue,
        filtered: bool,
        scene: &mut Scene,
        observer: &mut Observer,
        game: &GameCommands,
        owner: NodeId,
        component: ComponentId,
    ) {
        if self.halted {
            return;
        }
        if filtered && !self.accepts(name) {
            log::debug!(
                "`{}` dropped `{name}` in state `{}`",
                self.component_name,
                self.state
            );
            return;
        }
        let hook = format!("on{name}");
        if !self.has_hook(&hook) {
            log::debug!("`{}` has no `{hook}` hook", self.class);
            return;
        }
        let args = [sender.clone(), data.clone()];
        self.run_hook(&hook, &args, scene, observer, game, owner, component);
    }

    fn accepts(&self, name: &str) -> bool {
        self.whitelist.get(name).is_some_and(|states| {
            states.contains(ANY_STATE) || states.contains(self.state.as_str())
        })
    }

    fn has_hook(&self, hook: &str) -> bool {
        self.instance
            .as_ref()
            .is_some_and(|instance| instance.has_fn(hook))
    }

    #[allow(clippy::too_many_arguments)]
    fn run_hook(
        &mut self,
        hook: &str,
        args: &[ScriptValue],
        scene: &mut Scene,
        observer: &mut Observer,
        game: &GameCommands,
        owner: NodeId,
        component: ComponentId,
    ) {
        let Some(mut instance) = self.instance.take() else {
            return;
        };
        let effects = if instance.has_fn(hook) {
            let mut api = MachineApi {
                scene: &mut *scene,
                observer: &mut *observer,
                game,
                owner,
                component,
                sender_name: &self.component_name,
                current_state: &self.state,
                effects: MachineEffects::default(),
            };
            if let Err(error) = instance.call(hook, &mut api, args) {
                log::error!("`{}`.{hook} failed: {error}", self.class);
            }
            api.effects
        } else {
            log::debug!("`{}` has no `{hook}` hook", self.class);
            MachineEffects::default()
        };
        self.instance = Some(instance);
        self.apply_effects(effects, scene, observer, game, owner, component);
    }

    fn apply_effects(
        &mut self,
        effects: MachineEffects,
        scene: &mut Scene,
        observer: &mut Observer,
        game: &GameCommands,
        owner: NodeId,
        component: ComponentId,
    ) {
        for (name, states) in effects.subscribed {
            let entry = self.whitelist.entry(name).or_default();
            if states.is_empty() {
                entry.insert(ANY_STATE.to_owned());
            } else {
                entry.extend(states);
            }
        }
        for name in effects.cancelled {
            self.whitelist.remove(&name);
        }
        if let Some(next) = effects.moved {
            self.move_to(next);
        }
        if effects.halted {
            self.run_halt(scene, observer, game, owner, component);
        }
    }

    fn move_to(&mut self, state: String) {
        log::debug!("`{}` moves to state `{state}`", self.component_name);
        self.state = state;
        self.update_hook = HookCache::Unresolved;
    }

    /// Runs the optional exit hook, then drops every subscription and
    /// the script instance. The component stays attached but inert.
    fn run_halt(
        &mut self,
        scene: &mut Scene,
        observer: &mut Observer,
        game: &GameCommands,
        owner: NodeId,
        component: ComponentId,
    ) {
        if self.halted {
            return;
        }
        if let Some(mut instance) = self.instance.take() {
            if instance.has_fn(EXIT_HOOK) {
                let mut api = MachineApi {
                    scene: &mut *scene,
                    observer: &mut *observer,
                    game,
                    owner,
                    component,
                    sender_name: &self.component_name,
                    current_state: &self.state,
                    effects: MachineEffects::default(),
                };
                if let Err(error) = instance.call(EXIT_HOOK, &mut api, &[]) {
                    log::error!("`{}`.exit failed: {error}", self.class);
                }
                let effects = api.effects;
                if effects.moved.is_some()
                    || effects.halted
                    || !effects.subscribed.is_empty()
                    || !effects.cancelled.is_empty()
                {
                    log::debug!("ignoring machine changes requested by `{}`.exit", self.class);
                }
            }
        }
        observer.unsubscribe_all(component);
        self.whitelist.clear();
        self.halted = true;
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StateMachine {
    fn init(&mut self, config: &Value, ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        self.module = config.str_field("driver-script")?.to_owned();
        self.class = config.str_field("classname")?.to_owned();
        self.component_name = ctx.component_name().unwrap_or_default().to_owned();
        ctx.services.script.load_module(&self.module)?;
        let mut instance = ctx.services.script.instantiate(&self.class)?;
        // Remaining config keys become instance fields, so worlds can
        // parameterize scripts without code changes.
        if let Some(object) = config.as_object() {
            for (key, value) in object {
                if matches!(key.as_str(), "driver-script" | "classname" | "type" | "name") {
                    continue;
                }
                instance.set(key, ScriptValue::from_json(value));
            }
        }
        self.instance = Some(instance);
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext<'_, '_>) {
        if self.halted {
            return;
        }
        let owner = ctx.owner();
        let component = ctx.component();

        // The first update is the enter frame; per-state updates start
        // on the next one.
        if !self.entered {
            self.entered = true;
            self.run_hook(
                ENTER_HOOK,
                &[],
                ctx.scene,
                ctx.observer,
                ctx.services.game,
                owner,
                component,
            );
            return;
        }

        if let HookCache::Unresolved = self.update_hook {
            let name = format!("update{}", self.state);
            self.update_hook = if self.has_hook(&name) {
                HookCache::Resolved(name)
            } else {
                log::warn!("`{}` has no `{name}` hook", self.class);
                HookCache::Missing
            };
        }
        if let HookCache::Resolved(name) = &self.update_hook {
            let name = name.clone();
            self.run_hook(
                &name,
                &[ScriptValue::from(dt)],
                ctx.scene,
                ctx.observer,
                ctx.services.game,
                owner,
                component,
            );
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Requests a hook made against its own machine, applied after the hook
/// returns.
#[derive(Default)]
struct MachineEffects {
    subscribed: Vec<(String, Vec<String>)>,
    cancelled: Vec<String>,
    moved: Option<String>,
    halted: bool,
}

/// [`ScriptApi`] implementation backing one hook invocation.
///
/// Notifications and subscriptions hit the observer immediately; world
/// requests go to the game command buffer; machine-directed requests
/// land in `effects`.
struct MachineApi<'a> {
    scene: &'a mut Scene,
    observer: &'a mut Observer,
    game: &'a GameCommands,
    owner: NodeId,
    component: ComponentId,
    sender_name: &'a str,
    current_state: &'a str,
    effects: MachineEffects,
}

impl MachineApi<'_> {
    fn sender(&self) -> ScriptValue {
        ScriptValue::Str(self.sender_name.to_owned())
    }
}

impl ScriptApi for MachineApi<'_> {
    fn notify(&mut self, name: &str, data: ScriptValue) {
        let sender = self.sender();
        self.observer.notify(sender, name, data);
    }

    fn notify_all(&mut self, name: &str, data: ScriptValue) {
        let sender = self.sender();
        self.observer.notify_all(sender, name, data);
    }

    fn notify_siblings(&mut self, name: &str, data: ScriptValue) {
        let sender = self.sender();
        self.observer.notify_siblings(sender, name, self.owner, data);
    }

    fn subscribe(&mut self, name: &str, states: Vec<String>) {
        self.observer.subscribe(self.component, name);
        self.effects.subscribed.push((name.to_owned(), states));
    }

    fn cancel(&mut self, name: &str) {
        self.observer.cancel(self.component, name);
        self.effects.cancelled.push(name.to_owned());
    }

    fn move_state(&mut self, state: &str) {
        self.effects.moved = Some(state.to_owned());
    }

    fn halt(&mut self) {
        self.effects.halted = true;
    }

    fn push_world(&mut self, name: &str) {
        self.game.push(GameCommand::PushWorld(name.to_owned()));
    }

    fn pop_world(&mut self) {
        self.game.push(GameCommand::PopWorld);
    }

    fn replace_world(&mut self, name: &str) {
        self.game.push(GameCommand::ReplaceWorld(name.to_owned()));
    }

    fn quit(&mut self) {
        self.game.push(GameCommand::Quit);
    }

    fn state(&self) -> &str {
        self.current_state
    }

    fn position(&self) -> Vec2 {
        self.scene.position(self.owner).unwrap_or(Vec2::ZERO)
    }

    fn set_position(&mut self, position: Vec2) {
        self.scene.set_position(self.owner, position);
    }
}
