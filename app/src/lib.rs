//! # Marigold App
//!
//! The game driver for Marigold: loads settings, owns the engine
//! context, and runs the frame loop against a world stack.
//!
//! ## Overview
//!
//! - [`Settings`] — Boot configuration from `settings.json`
//! - [`Window`] — The seam a platform shell implements; [`HeadlessWindow`]
//!   plays scripted input for tests and demos
//! - [`LoopTimer`] — Fixed-budget frame pacing with adaptive overrun
//! - [`Game`] — The engine context, world cache/stack, and `run()` loop
//!
//! ## Example
//!
//! ```ignore
//! use marigold_app::{Game, HeadlessWindow, Settings};
//! use marigold_core::{DiskSource, NativeScriptHost, NullAudio};
//! use marigold_render::HeadlessBackend;
//! use marigold_scene::ComponentRegistry;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     marigold_app::init_logging();
//!     let source = DiskSource::new("resources");
//!     let settings = Settings::load(&source)?;
//!     let mut registry = ComponentRegistry::new();
//!     scene_std::register_all(&mut registry);
//!     let window = HeadlessWindow::new(settings.window_width, settings.window_height);
//!     let mut game = Game::new(
//!         settings,
//!         Box::new(window),
//!         HeadlessBackend::new(),
//!         Box::new(source),
//!         Box::new(NullAudio),
//!         Box::new(NativeScriptHost::new()),
//!         registry,
//!     );
//!     game.run()?;
//!     Ok(())
//! }
//! ```

mod game;
mod settings;
mod timer;
mod window;

pub use game::{EngineBackend, Game};
pub use settings::{SETTINGS_FILE, Settings, SettingsError};
pub use timer::LoopTimer;
pub use window::{HeadlessWindow, ScriptedEvent, Window};

/// Initializes logging for a shell binary. Call once, before `run`.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
