//! The execution boundary between the command queue and the GPU layer.

use std::collections::HashSet;

use glam::{Affine2, Vec2};
use marigold_core::Color;

use crate::error::RenderError;
use crate::queue::{BatchDraw, QuadDraw};
use crate::texture::{Texture, TextureHandle};

/// Executes sorted draw commands for one frame.
///
/// The queue calls `begin_frame`, then zero or more draws in their final
/// order, then `end_frame`. Implementations own the window surface and
/// whatever GPU state the draws need.
pub trait RenderBackend {
    fn begin_frame(&mut self, clear: Color, view: Affine2);
    fn draw_quad(&mut self, quad: &QuadDraw) -> Result<(), RenderError>;
    fn draw_glyph_batch(&mut self, batch: &BatchDraw) -> Result<(), RenderError>;
    fn end_frame(&mut self);
}

/// Turns encoded image bytes into backend textures.
///
/// Decoding happens on the backend side of the boundary; the engine only
/// ever sees the resulting handle and size.
pub trait TextureFactory {
    fn create_texture(&mut self, bytes: &[u8]) -> Result<Texture, RenderError>;
}

/// A draw recorded by the [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutedDraw {
    Quad(QuadDraw),
    Glyphs(BatchDraw),
}

/// Backend that records instead of drawing.
///
/// Used by tests and headless demo runs to assert on execution order,
/// and as the texture authority when no GPU exists: `create_texture`
/// hands out sequential handles.
#[derive(Default)]
pub struct HeadlessBackend {
    frames: usize,
    last_clear: Option<Color>,
    last_view: Option<Affine2>,
    executed: Vec<ExecutedDraw>,
    failing: HashSet<TextureHandle>,
    next_handle: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a fresh texture for the given pixel size.
    pub fn texture_with_size(&mut self, size: Vec2) -> Texture {
        self.next_handle += 1;
        Texture::new(TextureHandle(self.next_handle), size)
    }

    /// Makes every draw referencing `handle` fail, for error-path tests.
    pub fn fail_texture(&mut self, handle: TextureHandle) {
        self.failing.insert(handle);
    }

    /// Number of completed `begin_frame`/`end_frame` pairs started.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn last_clear(&self) -> Option<Color> {
        self.last_clear
    }

    pub fn last_view(&self) -> Option<Affine2> {
        self.last_view
    }

    /// Takes every draw recorded so far.
    pub fn take_executed(&mut self) -> Vec<ExecutedDraw> {
        std::mem::take(&mut self.executed)
    }
}

impl RenderBackend for HeadlessBackend {
    fn begin_frame(&mut self, clear: Color, view: Affine2) {
        self.frames += 1;
        self.last_clear = Some(clear);
        self.last_view = Some(view);
    }

    fn draw_quad(&mut self, quad: &QuadDraw) -> Result<(), RenderError> {
        if self.failing.contains(&quad.texture) {
            return Err(RenderError::UnknownTexture(quad.texture.0));
        }
        self.executed.push(ExecutedDraw::Quad(quad.clone()));
        Ok(())
    }

    fn draw_glyph_batch(&mut self, batch: &BatchDraw) -> Result<(), RenderError> {
        if let Some(glyph) = batch.glyphs.iter().find(|g| self.failing.contains(&g.texture)) {
            return Err(RenderError::UnknownTexture(glyph.texture.0));
        }
        self.executed.push(ExecutedDraw::Glyphs(batch.clone()));
        Ok(())
    }

    fn end_frame(&mut self) {}
}

impl TextureFactory for HeadlessBackend {
    /// Headless textures have no pixels to decode. A byte blob of
    /// exactly eight bytes is read as two little-endian `u32`s giving
    /// width and height, which lets test assets declare their size;
    /// anything else becomes a 1x1 texture.
    fn create_texture(&mut self, bytes: &[u8]) -> Result<Texture, RenderError> {
        let size = match <[u8; 8]>::try_from(bytes) {
            Ok(raw) => {
                let w = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
                let h = u32::from_le_bytes([raw[4], raw[5], raw[6], raw[7]]);
                Vec2::new(w as f32, h as f32)
            }
            Err(_) => Vec2::ONE,
        };
        Ok(self.texture_with_size(size))
    }
}

/// Encodes a width and height as the headless texture byte format.
pub fn headless_texture_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = width.to_le_bytes().to_vec();
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes
}
