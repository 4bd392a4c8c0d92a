//! Components that drive the audio host.

use std::any::Any;

use marigold_core::ConfigExt;
use marigold_scene::{Component, SceneError, UpdateContext};
use serde_json::Value;

/// Streams one music track through the audio host.
///
/// `"filename"` names the track, `"auto-play"` starts it on the first
/// update, `"loop"` repeats it and `"volume"` scales it. Play and stop
/// requests from other components queue on the player and apply on the
/// next update, where the audio host is reachable.
pub struct MusicPlayer {
    filename: String,
    looped: bool,
    auto_play: bool,
    volume: f32,
    volume_dirty: bool,
    pending_play: bool,
    pending_stop: bool,
}

impl MusicPlayer {
    pub fn new() -> Self {
        Self {
            filename: String::new(),
            looped: false,
            auto_play: false,
            volume: 1.0,
            volume_dirty: false,
            pending_play: false,
            pending_stop: false,
        }
    }

    /// Queues the track to start on the next update.
    pub fn play(&mut self) {
        self.pending_play = true;
        self.pending_stop = false;
    }

    /// Queues a stop on the next update.
    pub fn stop(&mut self) {
        self.pending_stop = true;
        self.pending_play = false;
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.volume_dirty = true;
    }
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for MusicPlayer {
    fn init(&mut self, config: &Value, _ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        self.filename = config.str_or("filename", "")?.to_owned();
        self.auto_play = config.bool_or("auto-play", false)?;
        self.looped = config.bool_or("loop", false)?;
        self.volume = config.f32_or("volume", 1.0)?;
        self.volume_dirty = true;
        Ok(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut UpdateContext<'_, '_>) {
        // Volume applies before playback so tracks start at level.
        if self.volume_dirty {
            ctx.services.audio.set_music_volume(self.volume);
            self.volume_dirty = false;
        }
        if self.auto_play {
            self.auto_play = false;
            self.pending_play = true;
        }
        if self.pending_play && !self.filename.is_empty() {
            ctx.services.audio.play_music(&self.filename, self.looped);
        }
        self.pending_play = false;
        if self.pending_stop {
            ctx.services.audio.stop_music();
            self.pending_stop = false;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Fires one-shot sound effects.
///
/// `"filename"` names the effect, `"auto-play"` fires it once on the
/// first update. [`trigger`](EffectPlayer::trigger) queues further
/// shots; all queued shots play on the following update.
pub struct EffectPlayer {
    filename: String,
    pending: u32,
}

impl EffectPlayer {
    pub fn new() -> Self {
        Self {
            filename: String::new(),
            pending: 0,
        }
    }

    /// Queues one playback of the effect.
    pub fn trigger(&mut self) {
        self.pending += 1;
    }
}

impl Default for EffectPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for EffectPlayer {
    fn init(&mut self, config: &Value, _ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        self.filename = config.str_or("filename", "")?.to_owned();
        if config.bool_or("auto-play", false)? {
            self.pending = 1;
        }
        Ok(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut UpdateContext<'_, '_>) {
        if self.filename.is_empty() {
            self.pending = 0;
            return;
        }
        for _ in 0..self.pending {
            ctx.services.audio.play_effect(&self.filename);
        }
        self.pending = 0;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
