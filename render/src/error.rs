//! Render error types.

use std::fmt;

/// Errors that can occur while executing draw commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The backend rejected a draw call.
    DrawFailed(String),
    /// A command referenced a texture the backend does not know.
    UnknownTexture(u64),
    /// The device was lost mid-frame.
    DeviceLost,
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DrawFailed(msg) => write!(f, "draw failed: {msg}"),
            Self::UnknownTexture(handle) => write!(f, "unknown texture handle {handle}"),
            Self::DeviceLost => write!(f, "device lost"),
        }
    }
}

impl std::error::Error for RenderError {}
