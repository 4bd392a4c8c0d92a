//! Per-frame input snapshot.
//!
//! The window layer feeds events in; the engine reads level and edge
//! state. Edge flags (`just_*`, `pointer_moved`) last exactly one frame
//! and are cleared by [`Input::begin_frame`].

use glam::Vec2;

/// Pointer button identifier, independent of any windowing crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
}

impl PointerButton {
    fn index(self) -> usize {
        match self {
            PointerButton::Primary => 0,
            PointerButton::Secondary => 1,
        }
    }
}

/// Snapshot of input state for one frame.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pointer: Vec2,
    pointer_moved: bool,
    pressed: [bool; 2],
    just_pressed: [bool; 2],
    just_released: [bool; 2],
    quit: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the edge flags. Call once at the top of each frame, before
    /// feeding this frame's events.
    pub fn begin_frame(&mut self) {
        self.pointer_moved = false;
        self.just_pressed = [false; 2];
        self.just_released = [false; 2];
    }

    pub fn feed_pointer_moved(&mut self, position: Vec2) {
        if position != self.pointer {
            self.pointer = position;
            self.pointer_moved = true;
        }
    }

    pub fn feed_button_pressed(&mut self, button: PointerButton) {
        let i = button.index();
        if !self.pressed[i] {
            self.pressed[i] = true;
            self.just_pressed[i] = true;
        }
    }

    pub fn feed_button_released(&mut self, button: PointerButton) {
        let i = button.index();
        if self.pressed[i] {
            self.pressed[i] = false;
            self.just_released[i] = true;
        }
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    /// Pointer position in window coordinates.
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    /// Whether the pointer moved this frame.
    pub fn pointer_moved(&self) -> bool {
        self.pointer_moved
    }

    pub fn is_pressed(&self, button: PointerButton) -> bool {
        self.pressed[button.index()]
    }

    pub fn just_pressed(&self, button: PointerButton) -> bool {
        self.just_pressed[button.index()]
    }

    pub fn just_released(&self, button: PointerButton) -> bool {
        self.just_released[button.index()]
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_sets_edge_for_one_frame() {
        let mut input = Input::new();
        input.begin_frame();
        input.feed_button_pressed(PointerButton::Primary);
        assert!(input.just_pressed(PointerButton::Primary));
        assert!(input.is_pressed(PointerButton::Primary));

        input.begin_frame();
        assert!(!input.just_pressed(PointerButton::Primary));
        assert!(input.is_pressed(PointerButton::Primary));
    }

    #[test]
    fn release_requires_prior_press() {
        let mut input = Input::new();
        input.begin_frame();
        input.feed_button_released(PointerButton::Primary);
        assert!(!input.just_released(PointerButton::Primary));

        input.feed_button_pressed(PointerButton::Primary);
        input.begin_frame();
        input.feed_button_released(PointerButton::Primary);
        assert!(input.just_released(PointerButton::Primary));
        assert!(!input.is_pressed(PointerButton::Primary));
    }

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut input = Input::new();
        input.begin_frame();
        input.feed_button_pressed(PointerButton::Primary);
        input.begin_frame();
        input.feed_button_pressed(PointerButton::Primary);
        assert!(!input.just_pressed(PointerButton::Primary));
    }

    #[test]
    fn pointer_motion_tracks_and_flags() {
        let mut input = Input::new();
        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(4.0, 2.0));
        assert!(input.pointer_moved());
        assert_eq!(input.pointer(), Vec2::new(4.0, 2.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(4.0, 2.0));
        // Same position is not motion
        assert!(!input.pointer_moved());
    }

    #[test]
    fn buttons_are_independent() {
        let mut input = Input::new();
        input.begin_frame();
        input.feed_button_pressed(PointerButton::Secondary);
        assert!(!input.is_pressed(PointerButton::Primary));
        assert!(input.is_pressed(PointerButton::Secondary));
    }
}
