//! # Marigold Render
//!
//! The rendering half of the engine that is still engine, not GPU:
//! components submit z-tagged draw commands to a [`RenderQueue`] during
//! update; once per frame the queue stably sorts by z-order and executes
//! every command against a [`RenderBackend`]. The backend trait is the
//! boundary to the excluded GPU layer; [`HeadlessBackend`] records what
//! would have been drawn and drives tests and demos.
//!
//! ## Types
//!
//! - [`RenderQueue`] / [`RenderCommand`] — Per-frame command collection
//! - [`QuadDraw`] / [`BatchDraw`] — Single-quad and per-glyph batched draws
//! - [`RenderBackend`] — Frame execution boundary
//! - [`Camera`] — World-to-view mapping for 2D scenes
//! - [`Font`] / [`GlyphInfo`] — Glyph metrics behind a trait
//! - [`Texture`] / [`TextureHandle`] — Opaque backend texture references

mod backend;
mod camera;
mod error;
mod font;
mod queue;
mod texture;

pub use backend::{
    headless_texture_bytes, ExecutedDraw, HeadlessBackend, RenderBackend, TextureFactory,
};
pub use camera::Camera;
pub use error::RenderError;
pub use font::{FixedFont, Font, FontResource, GlyphInfo};
pub use queue::{BatchDraw, CommandKind, GlyphQuad, QuadDraw, RenderCommand, RenderQueue, Vertex};
pub use texture::{Texture, TextureHandle};
