//! # Marigold Core
//!
//! Shared types and collaborator interfaces for the Marigold engine.
//!
//! ## Core Types
//!
//! - [`Color`] — RGBA color with config-array parsing
//! - [`Input`] — Per-frame pointer snapshot fed by the window layer
//! - [`ConfigExt`] — Typed field access over `serde_json` documents
//!
//! ## Collaborator Interfaces
//!
//! The engine core never talks to the OS or to native libraries directly.
//! Each excluded subsystem is reached through a narrow trait with an
//! in-tree implementation suitable for tests and headless runs:
//!
//! - [`ReadSource`] — Asset byte access ([`DiskSource`], [`MemorySource`])
//! - [`ResourceCache`] — Path-keyed, use-counted resource sharing
//! - [`ScriptHost`] / [`ScriptInstance`] — Opaque script objects with named
//!   callable fields ([`NativeScriptHost`] runs Rust closures as hooks)
//! - [`AudioHost`] — Music/effect playback ([`NullAudio`])

mod audio;
mod color;
mod config;
mod input;
mod resources;
mod script;
mod source;

pub use audio::{AudioHost, NullAudio};
pub use color::Color;
pub use config::{ConfigError, ConfigExt};
pub use input::{Input, PointerButton};
pub use resources::{ResourceCache, ResourceError};
pub use script::{
    NativeClass, NativeScriptHost, ScriptApi, ScriptEnv, ScriptError, ScriptHost, ScriptInstance,
    ScriptValue,
};
pub use source::{DiskSource, MemorySource, ReadSource, SourceError};
