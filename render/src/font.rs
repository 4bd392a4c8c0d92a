//! Glyph metrics behind a trait.
//!
//! Real font rasterization lives outside the engine; the label component
//! only needs per-glyph metrics and a texture to sample. [`FixedFont`]
//! supplies deterministic monospace metrics for tests and headless runs.

use std::sync::Arc;

use glam::Vec2;

use crate::texture::TextureHandle;

/// Metrics and texturing for one glyph at one pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphInfo {
    /// Texture holding the rasterized glyph.
    pub texture: TextureHandle,
    /// Glyph quad size in pixels.
    pub size: Vec2,
    /// Offset from the pen position to the quad's top-left corner.
    pub bearing: Vec2,
    /// Horizontal pen advance after this glyph.
    pub advance: f32,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
}

/// A font face the label component can lay text out with.
pub trait Font {
    /// Returns the glyph for `ch` at `size` pixels, or `None` when the
    /// face has no coverage (control characters, missing glyphs).
    fn glyph(&self, ch: char, size: f32) -> Option<GlyphInfo>;

    /// Vertical distance between baselines at `size` pixels.
    fn line_height(&self, size: f32) -> f32;
}

/// Shared font handle as stored in the resource cache.
#[derive(Clone)]
pub struct FontResource(pub Arc<dyn Font + Send + Sync>);

impl FontResource {
    pub fn new(font: impl Font + Send + Sync + 'static) -> Self {
        Self(Arc::new(font))
    }
}

/// Monospace font with synthetic metrics: every glyph is `0.5 * size`
/// wide on a `0.6 * size` advance, rendered from one atlas texture.
#[derive(Debug, Clone)]
pub struct FixedFont {
    atlas: TextureHandle,
}

impl FixedFont {
    pub fn new(atlas: TextureHandle) -> Self {
        Self { atlas }
    }
}

impl Font for FixedFont {
    fn glyph(&self, ch: char, size: f32) -> Option<GlyphInfo> {
        if ch.is_control() {
            return None;
        }
        Some(GlyphInfo {
            texture: self.atlas,
            size: Vec2::new(size * 0.5, size),
            bearing: Vec2::new(0.0, size * 0.8),
            advance: size * 0.6,
            uv_min: Vec2::ZERO,
            uv_max: Vec2::ONE,
        })
    }

    fn line_height(&self, size: f32) -> f32 {
        size * 1.2
    }
}
