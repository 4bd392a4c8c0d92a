//! Scripting-host capability interfaces.
//!
//! State machines treat script objects as opaque instances with named
//! fields, some of which are callable hooks (`enter`, `exit`,
//! `update<State>`, `on<Message>`). The engine reaches the scripting
//! runtime only through [`ScriptHost`] / [`ScriptInstance`], and a hook
//! reaches back into the engine only through the [`ScriptApi`] capability
//! handed to every call. [`NativeScriptHost`] is the in-tree runtime:
//! classes are tables of Rust closures, which is all the demos and tests
//! need.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use glam::Vec2;
use thiserror::Error;

/// Errors from the scripting host boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unknown script module `{0}`")]
    UnknownModule(String),
    #[error("unknown script class `{0}`")]
    UnknownClass(String),
    #[error("`{class}` has no function `{function}`")]
    NoSuchFunction { class: String, function: String },
    /// A hook body failed.
    #[error("script error: {0}")]
    Runtime(String),
}

/// A dynamically typed script value.
///
/// The subset every embeddable runtime can represent; conversion to and
/// from `serde_json::Value` is lossless for everything configs contain.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScriptValue {
    #[default]
    Nil,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<ScriptValue>),
    Table(HashMap<String, ScriptValue>),
}

static NIL: ScriptValue = ScriptValue::Nil;

impl ScriptValue {
    pub fn is_nil(&self) -> bool {
        matches!(self, ScriptValue::Nil)
    }

    /// Script truthiness: `Nil` and `false` are falsy, everything else
    /// (including `0`) is truthy.
    pub fn truthy(&self) -> bool {
        !matches!(self, ScriptValue::Nil | ScriptValue::Bool(false))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScriptValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScriptValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScriptValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ScriptValue]> {
        match self {
            ScriptValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Table field access; returns `Nil` for non-tables and missing keys.
    pub fn field(&self, key: &str) -> &ScriptValue {
        match self {
            ScriptValue::Table(map) => map.get(key).unwrap_or(&NIL),
            _ => &NIL,
        }
    }

    /// Converts a JSON document into a script value.
    pub fn from_json(value: &serde_json::Value) -> ScriptValue {
        match value {
            serde_json::Value::Null => ScriptValue::Nil,
            serde_json::Value::Bool(b) => ScriptValue::Bool(*b),
            serde_json::Value::Number(n) => ScriptValue::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => ScriptValue::Str(s.clone()),
            serde_json::Value::Array(items) => {
                ScriptValue::List(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => ScriptValue::Table(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(b: bool) -> Self {
        ScriptValue::Bool(b)
    }
}

impl From<f64> for ScriptValue {
    fn from(n: f64) -> Self {
        ScriptValue::Number(n)
    }
}

impl From<f32> for ScriptValue {
    fn from(n: f32) -> Self {
        ScriptValue::Number(n as f64)
    }
}

impl From<i64> for ScriptValue {
    fn from(n: i64) -> Self {
        ScriptValue::Number(n as f64)
    }
}

impl From<&str> for ScriptValue {
    fn from(s: &str) -> Self {
        ScriptValue::Str(s.to_owned())
    }
}

impl From<String> for ScriptValue {
    fn from(s: String) -> Self {
        ScriptValue::Str(s)
    }
}

/// Engine capabilities a script hook may call back into.
///
/// The state machine running the hook provides the implementation; the
/// hook never sees engine internals directly.
pub trait ScriptApi {
    /// Queues a message for one randomly chosen subscriber.
    fn notify(&mut self, name: &str, data: ScriptValue);
    /// Queues a message for every subscriber.
    fn notify_all(&mut self, name: &str, data: ScriptValue);
    /// Queues a message for every state machine on the owning node.
    fn notify_siblings(&mut self, name: &str, data: ScriptValue);
    /// Subscribes the owning machine to `name`, reacting only while in
    /// one of `states` (`"__all__"` whitelists every state).
    fn subscribe(&mut self, name: &str, states: Vec<String>);
    /// Removes the owning machine's subscription to `name`.
    fn cancel(&mut self, name: &str);
    /// Requests a transition to `state` (takes effect immediately; the
    /// new state's update hook is resolved next frame).
    fn move_state(&mut self, state: &str);
    /// Requests teardown of the owning machine.
    fn halt(&mut self);
    /// Requests that a world be pushed onto the world stack after this
    /// frame.
    fn push_world(&mut self, name: &str);
    /// Requests that the current world be popped and destroyed after
    /// this frame.
    fn pop_world(&mut self);
    /// Requests that the current world be replaced after this frame.
    fn replace_world(&mut self, name: &str);
    /// Requests that the game loop stop.
    fn quit(&mut self);
    /// Current state name of the owning machine.
    fn state(&self) -> &str;
    /// Owner node's local position.
    fn position(&self) -> Vec2;
    /// Moves the owner node.
    fn set_position(&mut self, position: Vec2);
}

/// An opaque script object with named fields and callable hooks.
pub trait ScriptInstance {
    /// Reads a field; `Nil` if absent.
    fn get(&self, field: &str) -> ScriptValue;
    /// Writes a field.
    fn set(&mut self, field: &str, value: ScriptValue);
    /// Returns whether `field` names a callable hook.
    fn has_fn(&self, field: &str) -> bool;
    /// Invokes the hook named `field`.
    fn call(
        &mut self,
        field: &str,
        api: &mut dyn ScriptApi,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, ScriptError>;
}

/// A scripting runtime that can produce [`ScriptInstance`]s by class name.
pub trait ScriptHost {
    /// Makes a module's classes available. Loading an already loaded
    /// module is a no-op.
    fn load_module(&mut self, name: &str) -> Result<(), ScriptError>;
    /// Creates a fresh instance of `class`.
    fn instantiate(&mut self, class: &str) -> Result<Box<dyn ScriptInstance>, ScriptError>;
}

type HookFn =
    Arc<dyn Fn(&mut ScriptEnv, &mut dyn ScriptApi, &[ScriptValue]) -> Result<ScriptValue, ScriptError> + Send + Sync>;

/// The mutable field table of a native script instance, visible to its
/// hooks.
#[derive(Debug, Clone, Default)]
pub struct ScriptEnv {
    fields: HashMap<String, ScriptValue>,
}

impl ScriptEnv {
    /// Reads a field; `Nil` if absent.
    pub fn get(&self, field: &str) -> ScriptValue {
        self.fields.get(field).cloned().unwrap_or_default()
    }

    /// Writes a field.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<ScriptValue>) {
        self.fields.insert(field.into(), value.into());
    }
}

/// A script class definition for [`NativeScriptHost`]: initial fields
/// plus named hook closures.
#[derive(Default)]
pub struct NativeClass {
    fields: HashMap<String, ScriptValue>,
    hooks: HashMap<String, HookFn>,
}

impl NativeClass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an initial field value on every instance of this class.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<ScriptValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Installs a hook closure under `name`.
    pub fn hook<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut ScriptEnv, &mut dyn ScriptApi, &[ScriptValue]) -> Result<ScriptValue, ScriptError>
            + Send
            + Sync
            + 'static,
    {
        self.hooks.insert(name.into(), Arc::new(hook));
        self
    }
}

/// In-tree scripting runtime: classes registered at startup whose hooks
/// are Rust closures over the instance's [`ScriptEnv`].
#[derive(Default)]
pub struct NativeScriptHost {
    modules: HashSet<String>,
    classes: HashMap<String, RegisteredClass>,
}

struct RegisteredClass {
    fields: HashMap<String, ScriptValue>,
    hooks: Arc<HashMap<String, HookFn>>,
}

impl NativeScriptHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a module name as loadable.
    pub fn register_module(&mut self, name: impl Into<String>) {
        self.modules.insert(name.into());
    }

    /// Registers a class. Replaces any previous class with the same name.
    pub fn register_class(&mut self, name: impl Into<String>, class: NativeClass) {
        self.classes.insert(
            name.into(),
            RegisteredClass {
                fields: class.fields,
                hooks: Arc::new(class.hooks),
            },
        );
    }
}

impl ScriptHost for NativeScriptHost {
    fn load_module(&mut self, name: &str) -> Result<(), ScriptError> {
        if self.modules.contains(name) {
            Ok(())
        } else {
            Err(ScriptError::UnknownModule(name.to_owned()))
        }
    }

    fn instantiate(&mut self, class: &str) -> Result<Box<dyn ScriptInstance>, ScriptError> {
        let registered = self
            .classes
            .get(class)
            .ok_or_else(|| ScriptError::UnknownClass(class.to_owned()))?;
        Ok(Box::new(NativeInstance {
            class: class.to_owned(),
            env: ScriptEnv {
                fields: registered.fields.clone(),
            },
            hooks: registered.hooks.clone(),
        }))
    }
}

struct NativeInstance {
    class: String,
    env: ScriptEnv,
    hooks: Arc<HashMap<String, HookFn>>,
}

impl ScriptInstance for NativeInstance {
    fn get(&self, field: &str) -> ScriptValue {
        self.env.get(field)
    }

    fn set(&mut self, field: &str, value: ScriptValue) {
        self.env.set(field, value);
    }

    fn has_fn(&self, field: &str) -> bool {
        self.hooks.contains_key(field)
    }

    fn call(
        &mut self,
        field: &str,
        api: &mut dyn ScriptApi,
        args: &[ScriptValue],
    ) -> Result<ScriptValue, ScriptError> {
        let hook = self
            .hooks
            .get(field)
            .cloned()
            .ok_or_else(|| ScriptError::NoSuchFunction {
                class: self.class.clone(),
                function: field.to_owned(),
            })?;
        hook(&mut self.env, api, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingApi {
        notified: Vec<(String, ScriptValue)>,
        moved_to: Option<String>,
        state: String,
        position: Vec2,
    }

    impl ScriptApi for RecordingApi {
        fn notify(&mut self, name: &str, data: ScriptValue) {
            self.notified.push((name.to_owned(), data));
        }
        fn notify_all(&mut self, name: &str, data: ScriptValue) {
            self.notified.push((name.to_owned(), data));
        }
        fn notify_siblings(&mut self, name: &str, data: ScriptValue) {
            self.notified.push((name.to_owned(), data));
        }
        fn subscribe(&mut self, _name: &str, _states: Vec<String>) {}
        fn cancel(&mut self, _name: &str) {}
        fn move_state(&mut self, state: &str) {
            self.moved_to = Some(state.to_owned());
        }
        fn halt(&mut self) {}
        fn push_world(&mut self, _name: &str) {}
        fn pop_world(&mut self) {}
        fn replace_world(&mut self, _name: &str) {}
        fn quit(&mut self) {}
        fn state(&self) -> &str {
            &self.state
        }
        fn position(&self) -> Vec2 {
            self.position
        }
        fn set_position(&mut self, position: Vec2) {
            self.position = position;
        }
    }

    #[test]
    fn truthiness() {
        assert!(!ScriptValue::Nil.truthy());
        assert!(!ScriptValue::Bool(false).truthy());
        assert!(ScriptValue::Bool(true).truthy());
        assert!(ScriptValue::Number(0.0).truthy());
        assert!(ScriptValue::from("").truthy());
    }

    #[test]
    fn table_field_access() {
        let value = ScriptValue::from_json(&serde_json::json!({"speed": 2.5, "name": "bird"}));
        assert_eq!(value.field("speed").as_f64(), Some(2.5));
        assert_eq!(value.field("name").as_str(), Some("bird"));
        assert!(value.field("missing").is_nil());
        assert!(ScriptValue::Nil.field("anything").is_nil());
    }

    #[test]
    fn json_conversion_covers_all_shapes() {
        let value = ScriptValue::from_json(&serde_json::json!({
            "flag": true,
            "items": [1, "two", null],
        }));
        assert_eq!(value.field("flag").as_bool(), Some(true));
        let items = value.field("items").as_list().unwrap();
        assert_eq!(items[0].as_f64(), Some(1.0));
        assert_eq!(items[1].as_str(), Some("two"));
        assert!(items[2].is_nil());
    }

    #[test]
    fn instance_fields_start_from_class_defaults() {
        let mut host = NativeScriptHost::new();
        host.register_class("Walker", NativeClass::new().field("speed", 2.0));

        let mut a = host.instantiate("Walker").unwrap();
        let b = host.instantiate("Walker").unwrap();
        a.set("speed", ScriptValue::Number(9.0));

        assert_eq!(a.get("speed").as_f64(), Some(9.0));
        // Instances do not share fields
        assert_eq!(b.get("speed").as_f64(), Some(2.0));
    }

    #[test]
    fn hooks_see_env_and_api() {
        let mut host = NativeScriptHost::new();
        host.register_class(
            "Counter",
            NativeClass::new().field("count", 0.0).hook("enter", |env, api, _| {
                let next = env.get("count").as_f64().unwrap_or(0.0) + 1.0;
                env.set("count", next);
                api.notify_all("Entered", ScriptValue::Number(next));
                Ok(ScriptValue::Nil)
            }),
        );

        let mut api = RecordingApi::default();
        let mut instance = host.instantiate("Counter").unwrap();
        instance.call("enter", &mut api, &[]).unwrap();
        instance.call("enter", &mut api, &[]).unwrap();

        assert_eq!(instance.get("count").as_f64(), Some(2.0));
        assert_eq!(api.notified.len(), 2);
        assert_eq!(api.notified[1].1.as_f64(), Some(2.0));
    }

    #[test]
    fn missing_hook_is_an_error_but_has_fn_checks_first() {
        let mut host = NativeScriptHost::new();
        host.register_class("Empty", NativeClass::new());
        let mut instance = host.instantiate("Empty").unwrap();
        assert!(!instance.has_fn("updateIdle"));

        let mut api = RecordingApi::default();
        let err = instance.call("updateIdle", &mut api, &[]).unwrap_err();
        assert_eq!(
            err,
            ScriptError::NoSuchFunction {
                class: "Empty".to_owned(),
                function: "updateIdle".to_owned(),
            }
        );
    }

    #[test]
    fn unknown_class_and_module() {
        let mut host = NativeScriptHost::new();
        host.register_module("menu");
        assert!(host.load_module("menu").is_ok());
        assert_eq!(
            host.load_module("level1").unwrap_err(),
            ScriptError::UnknownModule("level1".to_owned())
        );
        assert!(matches!(
            host.instantiate("Ghost"),
            Err(ScriptError::UnknownClass(_))
        ));
    }
}
