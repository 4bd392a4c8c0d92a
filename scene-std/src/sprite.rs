//! Textured quad rendering for entities.

use std::any::Any;
use std::sync::Arc;

use glam::Vec2;
use marigold_core::{Color, ConfigExt};
use marigold_render::{QuadDraw, Texture, Vertex};
use marigold_scene::{Component, SceneError, UpdateContext};
use serde_json::Value;

/// The attachment name siblings use to find the sprite they drive.
pub(crate) const SPRITE_NAME: &str = "Sprite";

/// Draws one textured quad at the owner's global transform.
///
/// Geometry is cached: a transform change marks the component dirty and
/// the quad is rebuilt on the next update, not before. Swapping the
/// image drops both the cached quad and the texture; the replacement
/// loads lazily inside `update`, where the texture factory is reachable.
///
/// Configuration: `"filename"` texture path, optional `"size"` override
/// (defaults to the texture's pixel size) and `"color"` tint.
pub struct Sprite {
    image: String,
    texture: Option<Arc<Texture>>,
    size_override: Option<Vec2>,
    color: Color,
    quad: Option<[Vertex; 4]>,
    dirty: bool,
    // Latched on a failed load so one bad path logs once, not per frame.
    failed: bool,
}

impl Sprite {
    pub fn new() -> Self {
        Self {
            image: String::new(),
            texture: None,
            size_override: None,
            color: Color::WHITE,
            quad: None,
            dirty: false,
            failed: false,
        }
    }

    /// The texture path currently shown, empty when unset.
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Points the sprite at another texture. A no-op when `path` is
    /// already shown; otherwise the cached quad and texture drop and the
    /// next update reloads.
    pub fn set_image(&mut self, path: &str) {
        if self.image == path {
            return;
        }
        self.image = path.to_owned();
        self.texture = None;
        self.quad = None;
        self.failed = false;
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Tint applied at draw time. Does not touch the cached geometry.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// World-space corners, counterclockwise from the lower left. The
    /// owner's position lands at the anchor point of the scaled quad.
    fn build_quad(&self, texture: &Texture, ctx: &UpdateContext<'_, '_>) -> [Vertex; 4] {
        let size = self.size_override.unwrap_or(texture.size);
        let position = ctx.global_position();
        let scale = ctx.global_scale();
        let rotation = Vec2::from_angle(ctx.global_rotation());
        let pivot = size * scale * ctx.anchor();

        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(size.x, 0.0),
            Vec2::new(size.x, size.y),
            Vec2::new(0.0, size.y),
        ];
        // Texture rows start at the top, so v runs 1 -> 0 going up.
        let uvs = [
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 0.0),
        ];
        std::array::from_fn(|i| {
            let world = position + rotation.rotate(corners[i] * scale - pivot);
            Vertex::new(world, uvs[i])
        })
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Sprite {
    fn init(&mut self, config: &Value, _ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        self.image = config.str_or("filename", "")?.to_owned();
        if config.get("size").is_some() {
            self.size_override = Some(config.vec2_field("size")?);
        }
        if let Some(value) = config.get("color") {
            self.color = Color::from_config(value, "color")?;
        }
        Ok(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut UpdateContext<'_, '_>) {
        if self.image.is_empty() || self.failed {
            return;
        }
        if self.texture.is_none() {
            match ctx.load_texture(&self.image) {
                Ok(texture) => self.texture = Some(texture),
                Err(error) => {
                    log::error!("sprite on {:?}: {error}", ctx.owner());
                    self.failed = true;
                    return;
                }
            }
        }
        let Some(texture) = self.texture.clone() else {
            return;
        };

        let vertices = match self.quad {
            Some(vertices) if !self.dirty => vertices,
            _ => {
                let vertices = self.build_quad(&texture, ctx);
                self.quad = Some(vertices);
                self.dirty = false;
                vertices
            }
        };

        let z = ctx.z_order();
        ctx.services.queue.push_quad(
            z,
            QuadDraw {
                texture: texture.handle,
                vertices,
                color: self.color,
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
