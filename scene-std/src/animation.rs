//! Frame-flipping animation over a sibling sprite.

use std::any::Any;
use std::collections::HashMap;

use marigold_core::{ConfigError, ConfigExt};
use marigold_scene::{Component, SceneError, UpdateContext};
use serde_json::Value;

use crate::sprite::{SPRITE_NAME, Sprite};

/// Advances through named frame sequences on a millisecond timer,
/// retargeting the sibling [`Sprite`]'s texture at each step.
///
/// Sequences come from the `"tags"` object, each tag naming a non-empty
/// array of texture paths. `"frame-time"` is the per-frame duration in
/// milliseconds, `"start"` the tag `"auto-play"` begins with. A
/// non-looping sequence holds its last frame; `"loop"` wraps instead.
pub struct Animation {
    name: String,
    frame_time: f32,
    tags: HashMap<String, Vec<String>>,
    looped: bool,
    auto_play: bool,
    tag: String,
    frame: usize,
    playing: bool,
    timer: f32,
    // The sprite may attach after us; retarget until it lands.
    sync: bool,
}

impl Animation {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            frame_time: 100.0,
            tags: HashMap::new(),
            looped: false,
            auto_play: false,
            tag: String::new(),
            frame: 0,
            playing: false,
            timer: 0.0,
            sync: false,
        }
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// The tag currently shown.
    #[inline]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Restarts playback from the first frame of `tag`. An unknown tag
    /// is logged and leaves the current state alone.
    pub fn play(&mut self, tag: &str) {
        if !self.tags.contains_key(tag) {
            log::warn!("animation `{}` has no tag `{tag}`", self.name);
            return;
        }
        self.tag = tag.to_owned();
        self.frame = 0;
        self.playing = true;
        self.timer = 0.0;
        self.sync = true;
    }

    /// Freezes playback on the current frame.
    pub fn stop(&mut self) {
        self.playing = false;
        self.timer = 0.0;
    }

    fn advance(&mut self) {
        let len = self.tags.get(&self.tag).map_or(0, Vec::len);
        if self.frame + 1 < len {
            self.frame += 1;
            self.sync = true;
        } else if self.looped {
            self.frame = 0;
            self.sync = true;
        } else {
            // Hold the last frame.
            self.playing = false;
            self.timer = 0.0;
        }
    }

    /// Points the sibling sprite at the current frame. Returns false
    /// while no sprite is attached, so the retarget retries.
    fn retarget_sprite(&self, ctx: &mut UpdateContext<'_, '_>) -> bool {
        let Some(path) = self
            .tags
            .get(&self.tag)
            .and_then(|frames| frames.get(self.frame))
        else {
            return true;
        };
        let Some(sprite) = ctx.scene.component_by_name(ctx.owner(), SPRITE_NAME) else {
            return false;
        };
        ctx.scene
            .with_component_mut::<Sprite, _>(sprite, |s| s.set_image(path))
            .is_some()
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Animation {
    fn init(&mut self, config: &Value, _ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        self.name = config.str_or("anim-name", "")?.to_owned();
        self.frame_time = config.f32_or("frame-time", 100.0)?;
        self.looped = config.bool_or("loop", false)?;
        self.auto_play = config.bool_or("auto-play", false)?;
        self.tag = config.str_or("start", "")?.to_owned();

        self.tags.clear();
        for (tag, value) in config.object_field("tags")? {
            let frames = value
                .as_array()
                .filter(|items| !items.is_empty())
                .ok_or_else(|| ConfigError::Type {
                    key: format!("tags.{tag}"),
                    expected: "a non-empty array of frame paths",
                })?;
            let mut paths = Vec::with_capacity(frames.len());
            for (i, item) in frames.iter().enumerate() {
                let path = item.as_str().ok_or_else(|| ConfigError::Type {
                    key: format!("tags.{tag}[{i}]"),
                    expected: "a texture path",
                })?;
                paths.push(path.to_owned());
            }
            self.tags.insert(tag.clone(), paths);
        }
        Ok(())
    }

    fn update(&mut self, dt: f32, ctx: &mut UpdateContext<'_, '_>) {
        if self.auto_play {
            self.auto_play = false;
            let tag = self.tag.clone();
            self.play(&tag);
        }

        if self.playing {
            self.timer += dt * 1000.0;
            while self.playing && self.timer >= self.frame_time {
                self.timer -= self.frame_time;
                self.advance();
            }
        }

        if self.sync && self.retarget_sprite(ctx) {
            self.sync = false;
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
