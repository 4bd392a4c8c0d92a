//! The platform window seam.

use std::collections::VecDeque;

use glam::Vec2;
use marigold_core::{Input, PointerButton};

/// What the frame loop needs from a platform window.
///
/// The engine stays windowing-agnostic: a shell crate implements this
/// over its native event loop. `poll` runs once per frame and pumps
/// pending events into the [`Input`] snapshot, calling
/// [`Input::begin_frame`] first so edge flags last exactly one frame.
pub trait Window {
    fn poll(&mut self, input: &mut Input);

    /// Presents everything rendered since the last call.
    fn present(&mut self);

    /// True once the platform asked to close the window.
    fn should_close(&self) -> bool;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// One input event inside a scripted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScriptedEvent {
    PointerMoved(Vec2),
    ButtonPressed(PointerButton),
    ButtonReleased(PointerButton),
    CloseRequested,
}

/// Window double that plays back scripted frames.
///
/// Each queued frame is the batch of events one `poll` delivers. The
/// window reports closed once every queued frame has played, so a run
/// lasts exactly as many frames as were pushed.
#[derive(Debug, Default)]
pub struct HeadlessWindow {
    width: u32,
    height: u32,
    frames: VecDeque<Vec<ScriptedEvent>>,
    presented: usize,
}

impl HeadlessWindow {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: VecDeque::new(),
            presented: 0,
        }
    }

    /// Queues one frame of events. An empty batch is an idle frame.
    pub fn push_frame(&mut self, events: impl Into<Vec<ScriptedEvent>>) {
        self.frames.push_back(events.into());
    }

    /// Queues `count` frames with no input.
    pub fn push_idle_frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frames.push_back(Vec::new());
        }
    }

    /// Frames presented so far.
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl Window for HeadlessWindow {
    fn poll(&mut self, input: &mut Input) {
        input.begin_frame();
        let Some(events) = self.frames.pop_front() else {
            return;
        };
        for event in events {
            match event {
                ScriptedEvent::PointerMoved(position) => input.feed_pointer_moved(position),
                ScriptedEvent::ButtonPressed(button) => input.feed_button_pressed(button),
                ScriptedEvent::ButtonReleased(button) => input.feed_button_released(button),
                ScriptedEvent::CloseRequested => input.request_quit(),
            }
        }
    }

    fn present(&mut self) {
        self.presented += 1;
    }

    fn should_close(&self) -> bool {
        self.frames.is_empty()
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_plays_one_scripted_frame() {
        let mut window = HeadlessWindow::new(800, 600);
        window.push_frame([
            ScriptedEvent::PointerMoved(Vec2::new(4.0, 2.0)),
            ScriptedEvent::ButtonPressed(PointerButton::Primary),
        ]);
        window.push_frame([ScriptedEvent::ButtonReleased(PointerButton::Primary)]);

        let mut input = Input::new();
        window.poll(&mut input);
        assert_eq!(input.pointer(), Vec2::new(4.0, 2.0));
        assert!(input.just_pressed(PointerButton::Primary));
        assert!(!window.should_close());

        window.poll(&mut input);
        assert!(!input.just_pressed(PointerButton::Primary));
        assert!(input.just_released(PointerButton::Primary));
        assert!(window.should_close());
    }

    #[test]
    fn the_script_running_out_closes_the_window() {
        let mut window = HeadlessWindow::new(1, 1);
        assert!(window.should_close());
        window.push_idle_frames(2);
        assert!(!window.should_close());

        let mut input = Input::new();
        window.poll(&mut input);
        window.poll(&mut input);
        assert!(window.should_close());
    }

    #[test]
    fn close_requested_raises_the_quit_flag() {
        let mut window = HeadlessWindow::new(1, 1);
        window.push_frame([ScriptedEvent::CloseRequested]);
        let mut input = Input::new();
        window.poll(&mut input);
        assert!(input.quit_requested());
    }
}
