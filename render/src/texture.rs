use glam::Vec2;

/// Opaque backend texture reference.
///
/// Handles are issued by the backend and carry no lifetime of their own;
/// a stale handle draws nothing and is reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// A loaded texture: the backend handle plus its pixel dimensions.
///
/// Stored in the resource cache and shared between components; decoding
/// image bytes into pixels happens on the far side of the backend
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub size: Vec2,
}

impl Texture {
    pub fn new(handle: TextureHandle, size: Vec2) -> Self {
        Self { handle, size }
    }
}
