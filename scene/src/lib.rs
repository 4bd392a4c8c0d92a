//! # Marigold Scene
//!
//! The coordination core: a shared-ownership scene graph, component
//! dispatch, a deferred message bus, and JSON world loading.
//!
//! ## Core Types
//!
//! - [`NodeId`] / [`ComponentId`] — Generational handles into the scene's arenas
//! - [`Scene`] — Owns every node and component; tree edges, transforms, dispatch
//! - [`Component`] — Open behavior trait attached to nodes by name
//! - [`ComponentRegistry`] — Startup-built factory table keyed by type name
//! - [`UpdateContext`] / [`Services`] — What a component sees while a hook runs
//!
//! ## Messaging & Scripting
//!
//! - [`Observer`] — Deferred pub/sub bus between state machines
//! - [`drain`] — Per-frame delivery pass over the queued envelopes
//! - [`StateMachine`] — Component driving one script instance through hooks
//!
//! ## Worlds & Deferred Work
//!
//! - [`World`] / [`load_world`] — Object trees described by `world-<name>.json`
//! - [`SceneCommands`] — Structural mutations queued mid-walk, applied after it
//! - [`GameCommands`] — World-stack and quit requests for the game driver

mod arena;
mod commands;
mod component;
mod context;
mod node;
mod observer;
mod scene;
mod state_machine;
pub mod testing;
mod world;

pub use arena::{ComponentId, NodeId};
pub use commands::{GameCommand, GameCommands, SceneCommands};
pub use component::{Component, ComponentRegistry, PointerEvent, SceneError};
pub use context::{NullPointerIndex, PointerIndex, Services, UpdateContext};
pub use node::{ChildSlot, Node, Spatial};
pub use observer::{BusState, Observer, drain};
pub use scene::Scene;
pub use state_machine::{ANY_STATE, StateMachine};
pub use world::{World, WorldError, load_world, world_file};
