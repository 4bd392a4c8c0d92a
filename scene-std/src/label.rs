//! Text rendering through the font metrics trait.

use std::any::Any;
use std::sync::Arc;

use glam::Vec2;
use marigold_core::{Color, ConfigExt};
use marigold_render::{BatchDraw, FontResource, GlyphQuad, Vertex};
use marigold_scene::{Component, SceneError, UpdateContext};
use serde_json::Value;

/// Lays glyph quads out left to right from the owner's global position
/// and submits them as one batch per update.
///
/// The pen starts at the owner's position, advances by each glyph's
/// metric and drops one line height at `'\n'`. Characters the face has
/// no coverage for are skipped. Layout is cached until the text changes
/// or the owner moves.
///
/// Configuration: `"font"` (a preloaded [`FontResource`] path, required),
/// `"text"`, `"size"` in pixels, `"color"`.
pub struct Label {
    font: Option<Arc<FontResource>>,
    text: String,
    size: f32,
    color: Color,
    glyphs: Option<Vec<GlyphQuad>>,
    dirty: bool,
}

impl Label {
    pub fn new() -> Self {
        Self {
            font: None,
            text: String::new(),
            size: 12.0,
            color: Color::WHITE,
            glyphs: None,
            dirty: false,
        }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text, dropping the cached layout when it differs.
    pub fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        self.text = text.to_owned();
        self.glyphs = None;
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn layout(&self, font: &FontResource, ctx: &UpdateContext<'_, '_>) -> Vec<GlyphQuad> {
        let origin = ctx.global_position();
        let mut pen = origin;
        let mut glyphs = Vec::new();

        for ch in self.text.chars() {
            if ch == '\n' {
                pen.x = origin.x;
                pen.y -= font.0.line_height(self.size);
                continue;
            }
            let Some(glyph) = font.0.glyph(ch, self.size) else {
                continue;
            };
            // The bearing points from the pen to the quad's top-left.
            let top_left = pen + glyph.bearing;
            let bottom_left = Vec2::new(top_left.x, top_left.y - glyph.size.y);
            glyphs.push(GlyphQuad {
                texture: glyph.texture,
                vertices: [
                    Vertex::new(bottom_left, Vec2::new(glyph.uv_min.x, glyph.uv_max.y)),
                    Vertex::new(
                        bottom_left + Vec2::new(glyph.size.x, 0.0),
                        glyph.uv_max,
                    ),
                    Vertex::new(
                        top_left + Vec2::new(glyph.size.x, 0.0),
                        Vec2::new(glyph.uv_max.x, glyph.uv_min.y),
                    ),
                    Vertex::new(top_left, glyph.uv_min),
                ],
            });
            pen.x += glyph.advance;
        }
        glyphs
    }
}

impl Default for Label {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Label {
    fn init(&mut self, config: &Value, ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        self.font = Some(ctx.load_font(config.str_field("font")?)?);
        self.text = config.str_or("text", "")?.to_owned();
        self.size = config.f32_or("size", 12.0)?;
        if let Some(value) = config.get("color") {
            self.color = Color::from_config(value, "color")?;
        }
        Ok(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut UpdateContext<'_, '_>) {
        let Some(font) = self.font.clone() else {
            return;
        };
        if self.glyphs.is_none() || self.dirty {
            self.glyphs = Some(self.layout(&font, ctx));
            self.dirty = false;
        }
        let Some(glyphs) = self.glyphs.clone() else {
            return;
        };
        if glyphs.is_empty() {
            return;
        }

        let z = ctx.z_order();
        ctx.services.queue.push_glyphs(
            z,
            BatchDraw {
                color: self.color,
                glyphs,
            },
        );
    }

    fn set_dirty(&mut self) {
        self.dirty = true;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
