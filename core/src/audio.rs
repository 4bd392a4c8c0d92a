//! Audio playback collaborator interface.

/// Music and sound-effect playback, already initialized by the platform
/// layer. Components call into it during their own `update`/`init`.
pub trait AudioHost {
    /// Starts streaming a music track, replacing any current one.
    fn play_music(&mut self, path: &str, looped: bool);
    /// Stops the current music track, if any.
    fn stop_music(&mut self);
    /// Sets music volume in `0.0..=1.0`.
    fn set_music_volume(&mut self, volume: f32);
    /// Fires a one-shot sound effect.
    fn play_effect(&mut self, path: &str);
}

/// No-op audio host for headless runs.
pub struct NullAudio;

impl AudioHost for NullAudio {
    fn play_music(&mut self, _path: &str, _looped: bool) {}
    fn stop_music(&mut self) {}
    fn set_music_volume(&mut self, _volume: f32) {}
    fn play_effect(&mut self, _path: &str) {}
}
