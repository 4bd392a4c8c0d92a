//! Per-frame draw command collection and z-ordered flush.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};
use marigold_core::Color;

use crate::backend::RenderBackend;
use crate::texture::TextureHandle;

/// One textured vertex: position and texture coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(position: Vec2, uv: Vec2) -> Self {
        Self {
            position: position.to_array(),
            uv: uv.to_array(),
        }
    }
}

/// A single textured quad draw.
///
/// Vertices are in world space, wound counterclockwise starting at the
/// lower-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadDraw {
    pub texture: TextureHandle,
    pub vertices: [Vertex; 4],
    pub color: Color,
}

/// One glyph inside a batched text draw.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphQuad {
    pub texture: TextureHandle,
    pub vertices: [Vertex; 4],
}

/// A batched multi-quad draw for text.
///
/// Glyphs share one color but each binds its own texture; execution
/// issues one draw per glyph, preserving glyph order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDraw {
    pub color: Color,
    pub glyphs: Vec<GlyphQuad>,
}

/// The payload of a render command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Quad(QuadDraw),
    Glyphs(BatchDraw),
}

/// A draw request tagged with its z-order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCommand {
    pub z: i32,
    pub kind: CommandKind,
}

/// Collects draw commands over a frame and flushes them in z order.
///
/// Sorting is stable: commands with equal z execute in submission order,
/// which is what keeps alpha blending of overlapping same-layer UI
/// correct.
#[derive(Default)]
pub struct RenderQueue {
    commands: Vec<RenderCommand>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    pub fn push_quad(&mut self, z: i32, quad: QuadDraw) {
        self.push(RenderCommand {
            z,
            kind: CommandKind::Quad(quad),
        });
    }

    pub fn push_glyphs(&mut self, z: i32, batch: BatchDraw) {
        self.push(RenderCommand {
            z,
            kind: CommandKind::Glyphs(batch),
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sorts pending commands ascending by z and executes them against
    /// the backend between `begin_frame` and `end_frame`.
    ///
    /// A failed draw is logged and the remaining commands still execute;
    /// the queue is cleared unconditionally afterward.
    pub fn flush(&mut self, backend: &mut dyn RenderBackend, clear: Color, view: Affine2) {
        self.commands.sort_by_key(|command| command.z);

        backend.begin_frame(clear, view);
        for command in &self.commands {
            let result = match &command.kind {
                CommandKind::Quad(quad) => backend.draw_quad(quad),
                CommandKind::Glyphs(batch) => backend.draw_glyph_batch(batch),
            };
            if let Err(err) = result {
                log::error!("render command at z {} failed: {err}", command.z);
            }
        }
        backend.end_frame();

        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ExecutedDraw, HeadlessBackend};

    fn quad(texture: u64) -> QuadDraw {
        let corners = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        QuadDraw {
            texture: TextureHandle(texture),
            vertices: corners.map(|corner| Vertex::new(corner, corner)),
            color: Color::WHITE,
        }
    }

    fn executed_textures(backend: &mut HeadlessBackend) -> Vec<u64> {
        backend
            .take_executed()
            .into_iter()
            .map(|draw| match draw {
                ExecutedDraw::Quad(quad) => quad.texture.0,
                ExecutedDraw::Glyphs(batch) => batch.glyphs[0].texture.0,
            })
            .collect()
    }

    #[test]
    fn flush_sorts_by_z_stably() {
        let mut queue = RenderQueue::new();
        let mut backend = HeadlessBackend::new();

        // Submission order [3, 1, 2, 1]; textures identify the commands.
        queue.push_quad(3, quad(30));
        queue.push_quad(1, quad(10));
        queue.push_quad(2, quad(20));
        queue.push_quad(1, quad(11));

        queue.flush(&mut backend, Color::BLACK, Affine2::IDENTITY);

        // Ties keep submission order: 10 before 11.
        assert_eq!(executed_textures(&mut backend), vec![10, 11, 20, 30]);
    }

    #[test]
    fn flush_clears_pending_commands() {
        let mut queue = RenderQueue::new();
        let mut backend = HeadlessBackend::new();
        queue.push_quad(0, quad(1));
        queue.flush(&mut backend, Color::BLACK, Affine2::IDENTITY);
        assert!(queue.is_empty());

        queue.flush(&mut backend, Color::BLACK, Affine2::IDENTITY);
        assert!(backend.take_executed().is_empty());
        assert_eq!(backend.frames(), 2);
    }

    #[test]
    fn failed_draw_does_not_stop_the_flush() {
        let mut queue = RenderQueue::new();
        let mut backend = HeadlessBackend::new();
        backend.fail_texture(TextureHandle(666));

        queue.push_quad(0, quad(666));
        queue.push_quad(1, quad(7));
        queue.flush(&mut backend, Color::BLACK, Affine2::IDENTITY);

        // The bad command is skipped, the good one still draws, and the
        // queue is empty afterward.
        assert_eq!(executed_textures(&mut backend), vec![7]);
        assert!(queue.is_empty());
    }

    #[test]
    fn glyph_batches_keep_glyph_order() {
        let mut queue = RenderQueue::new();
        let mut backend = HeadlessBackend::new();

        let batch = BatchDraw {
            color: Color::WHITE,
            glyphs: (0..3)
                .map(|i| GlyphQuad {
                    texture: TextureHandle(i),
                    vertices: quad(i).vertices,
                })
                .collect(),
        };
        queue.push_glyphs(5, batch.clone());
        queue.flush(&mut backend, Color::BLACK, Affine2::IDENTITY);

        match backend.take_executed().pop() {
            Some(ExecutedDraw::Glyphs(executed)) => assert_eq!(executed, batch),
            other => panic!("expected a glyph batch, got {other:?}"),
        }
    }

    #[test]
    fn begin_frame_sees_clear_color_and_view() {
        let mut queue = RenderQueue::new();
        let mut backend = HeadlessBackend::new();
        let view = Affine2::from_translation(Vec2::new(-3.0, 4.0));

        queue.flush(&mut backend, Color::from_bytes(9, 9, 9, 255), view);

        assert_eq!(backend.last_clear(), Some(Color::from_bytes(9, 9, 9, 255)));
        assert_eq!(backend.last_view(), Some(view));
    }
}
