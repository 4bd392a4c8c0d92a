//! World documents: JSON descriptions of an object tree.
//!
//! A world `name` is read from `world-<name>.json`. The document has a
//! `background-color`, a `camera` center, and a `children` array of
//! object docs; each object doc carries its own `components` and
//! `children`. Loading is resilient: a bad object or component entry is
//! logged and skipped while the rest of the world comes up.

use glam::Vec2;
use marigold_core::{Color, ConfigError, ConfigExt, SourceError};
use serde_json::Value;
use thiserror::Error;

use crate::arena::NodeId;
use crate::component::ComponentRegistry;
use crate::context::Services;
use crate::observer::Observer;
use crate::scene::Scene;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("world `{name}` is not valid JSON: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A loaded world: its root node plus presentation defaults. The caller
/// owns the root; releasing it tears the whole tree down.
#[derive(Debug)]
pub struct World {
    pub root: NodeId,
    pub background: Color,
    pub camera_center: Vec2,
}

/// The file a world name resolves to.
pub fn world_file(name: &str) -> String {
    format!("world-{name}.json")
}

/// Reads and builds the named world.
pub fn load_world(
    name: &str,
    scene: &mut Scene,
    registry: &ComponentRegistry,
    observer: &mut Observer,
    services: &mut Services<'_>,
) -> Result<World, WorldError> {
    let path = world_file(name);
    let bytes = services.source.read(&path)?;
    let doc: Value = serde_json::from_slice(&bytes).map_err(|source| WorldError::Parse {
        name: name.to_owned(),
        source,
    })?;

    let background = match doc.get("background-color") {
        Some(value) => Color::from_config(value, "background-color")?,
        None => Color::BLACK,
    };
    let camera_center = doc.vec2_or("camera", Vec2::ZERO)?;

    // The root is a plain grouping node owned by the returned World.
    let root = scene.create_node();
    if let Some(children) = doc.get("children").and_then(Value::as_array) {
        for child_doc in children {
            load_object(child_doc, root, scene, registry, observer, services);
        }
    }
    log::info!("loaded world `{name}`: {} nodes", scene.live_nodes());

    Ok(World {
        root,
        background,
        camera_center,
    })
}

fn load_object(
    doc: &Value,
    parent: NodeId,
    scene: &mut Scene,
    registry: &ComponentRegistry,
    observer: &mut Observer,
    services: &mut Services<'_>,
) {
    let kind = match doc.str_or("type", "entity") {
        Ok(kind) => kind.to_owned(),
        Err(error) => {
            log::error!("skipping object under {parent:?}: {error}");
            return;
        }
    };
    let name = match doc.str_or("name", "object") {
        Ok(name) => name.to_owned(),
        Err(error) => {
            log::error!("skipping object under {parent:?}: {error}");
            return;
        }
    };

    let node = if kind == "object" {
        scene.create_node()
    } else {
        scene.create_entity()
    };
    scene.add_child(parent, &name, node);
    // Ownership moves to the parent edge.
    scene.release_node(node);

    if let Err(error) = configure_object(doc, node, scene, registry, observer, services) {
        log::error!("dropping object `{name}`: {error}");
        scene.remove_child(parent, node);
    }
}

fn configure_object(
    doc: &Value,
    node: NodeId,
    scene: &mut Scene,
    registry: &ComponentRegistry,
    observer: &mut Observer,
    services: &mut Services<'_>,
) -> Result<(), WorldError> {
    if scene.node(node).is_some_and(|n| n.is_entity()) {
        scene.set_position(node, doc.vec2_or("position", Vec2::ZERO)?);
        scene.set_scale(node, doc.vec2_or("scale", Vec2::ONE)?);
        scene.set_rotation(node, doc.f32_or("rotate", 0.0)?);
        scene.set_z_order(node, doc.i64_or("z-order", 0)? as i32);
        scene.set_anchor(node, doc.vec2_or("anchor", Vec2::new(0.5, 0.5))?);
    }

    if let Some(components) = doc.get("components").and_then(Value::as_array) {
        for component_doc in components {
            load_component(component_doc, node, scene, registry, observer, services);
        }
    }
    if let Some(children) = doc.get("children").and_then(Value::as_array) {
        for child_doc in children {
            load_object(child_doc, node, scene, registry, observer, services);
        }
    }
    Ok(())
}

/// Components attach first and initialize second, so init hooks see
/// themselves already on the node. A failed init detaches again.
fn load_component(
    doc: &Value,
    node: NodeId,
    scene: &mut Scene,
    registry: &ComponentRegistry,
    observer: &mut Observer,
    services: &mut Services<'_>,
) {
    let type_name = match doc.str_field("type") {
        Ok(type_name) => type_name.to_owned(),
        Err(error) => {
            log::error!("skipping component on {node:?}: {error}");
            return;
        }
    };
    let name = match doc.str_or("name", &type_name) {
        Ok(name) => name.to_owned(),
        Err(error) => {
            log::error!("skipping component on {node:?}: {error}");
            return;
        }
    };
    let component = match registry.create(&type_name) {
        Ok(component) => component,
        Err(error) => {
            log::error!("skipping component `{name}` on {node:?}: {error}");
            return;
        }
    };
    let Some(id) = scene.add_component(node, &name, component) else {
        return;
    };
    if let Err(error) = scene.init_component(id, doc, observer, services) {
        log::error!("component `{name}` on {node:?} failed to initialize: {error}");
    }
}
