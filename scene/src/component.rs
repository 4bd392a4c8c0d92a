//! The component trait and the startup-built factory registry.

use std::any::Any;
use std::collections::HashMap;

use marigold_core::{ConfigError, ResourceError, ScriptError};
use serde_json::Value;
use thiserror::Error;

use crate::context::UpdateContext;

/// Errors surfaced by component and world machinery.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    /// No factory is registered under the requested type name.
    #[error("component type `{0}` is not registered")]
    UnknownComponentType(String),
}

/// A pointer interaction delivered to a component by the UI router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerEvent {
    Pressed,
    Released,
    Clicked,
    HoverEntered,
    HoverExited,
}

/// A polymorphic behavior unit attached to exactly one node.
///
/// The component set is open: anything implementing this trait can be
/// registered under a type name and instantiated from configuration.
/// `init` runs once right after the component is attached; `update` runs
/// every frame in attachment order, before the owning node's children.
pub trait Component: Any {
    /// Initializes from a configuration document. An error here is
    /// logged by the caller and the component is detached, never
    /// partially kept.
    fn init(&mut self, config: &Value, ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        let _ = (config, ctx);
        Ok(())
    }

    /// Per-frame behavior.
    fn update(&mut self, dt: f32, ctx: &mut UpdateContext<'_, '_>);

    /// Invalidates cached derived state (geometry, layouts). Called when
    /// the owning node's global transform changes.
    fn set_dirty(&mut self) {}

    /// Pointer interaction hook, delivered by the UI router between
    /// input polling and the world update.
    fn on_pointer(&mut self, event: PointerEvent, ctx: &mut UpdateContext<'_, '_>) {
        let _ = (event, ctx);
    }

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Component")
    }
}

type FactoryFn = fn() -> Box<dyn Component>;

/// String-keyed component factory table.
///
/// Built explicitly at startup (see `scene-std`'s `register_all`), never
/// by global-constructor side effects, so the set of registered types is
/// visible in one place.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, FactoryFn>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a factory under `type_name`. Re-registration replaces
    /// the previous factory with a warning.
    pub fn register(&mut self, type_name: impl Into<String>, factory: FactoryFn) {
        let type_name = type_name.into();
        if self.factories.insert(type_name.clone(), factory).is_some() {
            log::warn!("component registry: replacing factory for `{type_name}`");
        }
    }

    /// Instantiates a component by type name.
    pub fn create(&self, type_name: &str) -> Result<Box<dyn Component>, SceneError> {
        match self.factories.get(type_name) {
            Some(factory) => Ok(factory()),
            None => Err(SceneError::UnknownComponentType(type_name.to_owned())),
        }
    }

    pub fn is_registered(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Component for Noop {
        fn update(&mut self, _dt: f32, _ctx: &mut UpdateContext<'_, '_>) {}
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn create_known_type() {
        let mut registry = ComponentRegistry::new();
        registry.register("noop", || Box::new(Noop));
        assert!(registry.is_registered("noop"));
        assert!(registry.create("noop").is_ok());
    }

    #[test]
    fn create_unknown_type_fails() {
        let registry = ComponentRegistry::new();
        let err = registry.create("sprite").unwrap_err();
        assert_eq!(
            err.to_string(),
            "component type `sprite` is not registered"
        );
    }
}
