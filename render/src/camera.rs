use glam::{Affine2, Vec2};

/// A 2D camera: world-space center plus half the visible extent.
///
/// The view transform maps the visible world rectangle onto the
/// `-1.0..=1.0` normalized device square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub center: Vec2,
    pub half_extent: Vec2,
}

impl Camera {
    pub fn new(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    /// Camera showing `size` world units centered on `center`.
    pub fn with_view_size(center: Vec2, size: Vec2) -> Self {
        Self::new(center, size * 0.5)
    }

    /// World-space to normalized-device-space transform.
    pub fn view_transform(&self) -> Affine2 {
        let scale = Vec2::new(1.0 / self.half_extent.x, 1.0 / self.half_extent.y);
        Affine2::from_scale(scale) * Affine2::from_translation(-self.center)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec2::ZERO, Vec2::ONE)
    }
}
