//! Pointer input routing.
//!
//! [`ClickIndex`] is the engine-side pointer registry: interactive
//! components register clickable polygons through the
//! [`PointerIndex`] interface, and the index stores them as
//! [`QuadTree`] entries. [`EventRouter`] consumes one frame's input
//! snapshot against that index and decides which nodes receive which
//! [`PointerEvent`]s; the caller dispatches the returned pairs through
//! the scene once the frame's services are assembled.

use glam::Vec2;
use marigold_core::{Input, PointerButton, ScriptValue};
use marigold_scene::{NodeId, Observer, PointerEvent, PointerIndex, Scene};

use crate::quad_tree::QuadTree;
use crate::receiver::Receiver;

/// Message sent to the clicked node's state machines.
pub const CLICK_MESSAGE: &str = "Click";

const BUTTONS: [PointerButton; 2] = [PointerButton::Primary, PointerButton::Secondary];

fn slot(button: PointerButton) -> usize {
    match button {
        PointerButton::Primary => 0,
        PointerButton::Secondary => 1,
    }
}

/// Pointer registry backed by a [`QuadTree`].
#[derive(Debug)]
pub struct ClickIndex {
    tree: QuadTree,
}

impl ClickIndex {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            tree: QuadTree::new(min, max),
        }
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    /// Drops receivers owned by nodes that died without unregistering.
    pub fn prune_dead(&mut self, scene: &Scene) {
        self.tree.retain(|held| scene.is_alive(held.owner));
    }

    /// Empties the registry. Called when the active world changes.
    pub fn clear(&mut self) {
        self.tree.clear();
    }
}

impl PointerIndex for ClickIndex {
    fn register(&mut self, owner: NodeId, button: PointerButton, z_order: i32, vertices: &[Vec2]) {
        self.tree
            .insert(Receiver::new(owner, button, z_order, vertices.to_vec()));
    }

    fn unregister(&mut self, owner: NodeId, button: PointerButton, z_order: i32, vertices: &[Vec2]) {
        self.tree
            .erase(&Receiver::new(owner, button, z_order, vertices.to_vec()));
    }
}

/// Turns pointer input into per-node [`PointerEvent`]s.
///
/// A press is remembered per button. Releasing over the receiver the
/// press started on produces [`PointerEvent::Clicked`] plus a
/// [`CLICK_MESSAGE`] sibling notification on the owner; releasing
/// anywhere else cancels the press with [`PointerEvent::Released`].
/// Hover edges follow the topmost primary-button receiver under the
/// pointer.
#[derive(Debug, Default)]
pub struct EventRouter {
    pressed: [Option<Receiver>; 2],
    hovered: Option<Receiver>,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets any in-flight press or hover. Called when the active
    /// world changes.
    pub fn reset(&mut self) {
        self.pressed = [None, None];
        self.hovered = None;
    }

    /// Routes one frame of input against the index.
    ///
    /// Returns `(node, event)` pairs in decision order; the caller
    /// dispatches them via [`Scene::dispatch_pointer`]. Click
    /// notifications go straight to the observer and surface at its
    /// next drain.
    pub fn route(
        &mut self,
        input: &Input,
        scene: &Scene,
        index: &mut ClickIndex,
        observer: &mut Observer,
    ) -> Vec<(NodeId, PointerEvent)> {
        index.prune_dead(scene);
        for held in &mut self.pressed {
            if held.as_ref().is_some_and(|r| !scene.is_alive(r.owner)) {
                *held = None;
            }
        }
        if self
            .hovered
            .as_ref()
            .is_some_and(|r| !scene.is_alive(r.owner))
        {
            self.hovered = None;
        }

        let mut events = Vec::new();
        let point = input.pointer();

        for button in BUTTONS {
            if input.just_pressed(button)
                && let Some(hit) = index.tree().query(point, button)
            {
                self.pressed[slot(button)] = Some(hit.clone());
                events.push((hit.owner, PointerEvent::Pressed));
            }
            if input.just_released(button) {
                let ended = index.tree().query(point, button).cloned();
                match (self.pressed[slot(button)].take(), ended) {
                    (Some(started), Some(ended))
                        if started == ended && started.owner == ended.owner =>
                    {
                        observer.notify_siblings(
                            ScriptValue::Nil,
                            CLICK_MESSAGE,
                            ended.owner,
                            ScriptValue::Nil,
                        );
                        events.push((ended.owner, PointerEvent::Clicked));
                    }
                    (Some(started), _) => {
                        events.push((started.owner, PointerEvent::Released));
                    }
                    (None, _) => {}
                }
            }
        }

        let hover = index.tree().query(point, PointerButton::Primary).cloned();
        let unchanged = match (&self.hovered, &hover) {
            (Some(old), Some(new)) => old == new && old.owner == new.owner,
            (None, None) => true,
            _ => false,
        };
        if !unchanged {
            if let Some(old) = self.hovered.take() {
                events.push((old.owner, PointerEvent::HoverExited));
            }
            if let Some(new) = &hover {
                events.push((new.owner, PointerEvent::HoverEntered));
            }
            self.hovered = hover;
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad(center: Vec2, half: f32) -> Vec<Vec2> {
        vec![
            center + Vec2::new(-half, -half),
            center + Vec2::new(half, -half),
            center + Vec2::new(half, half),
            center + Vec2::new(-half, half),
        ]
    }

    fn setup() -> (Scene, Observer, ClickIndex, Input) {
        (
            Scene::new(),
            Observer::with_seed(7),
            ClickIndex::new(Vec2::ZERO, Vec2::splat(1024.0)),
            Input::new(),
        )
    }

    #[test]
    fn press_then_release_clicks_the_receiver() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let target = scene.create_entity();
        index.register(target, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_pressed(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.contains(&(target, PointerEvent::Pressed)));

        input.begin_frame();
        input.feed_button_released(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert_eq!(events, vec![(target, PointerEvent::Clicked)]);
        assert_eq!(observer.queued(), 1);
    }

    #[test]
    fn release_elsewhere_cancels_the_press() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let target = scene.create_entity();
        index.register(target, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_pressed(PointerButton::Primary);
        router.route(&input, &scene, &mut index, &mut observer);

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(500.0, 500.0));
        input.feed_button_released(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.contains(&(target, PointerEvent::Released)));
        assert!(events.contains(&(target, PointerEvent::HoverExited)));
        assert!(!events.contains(&(target, PointerEvent::Clicked)));
        assert_eq!(observer.queued(), 0);
    }

    #[test]
    fn release_without_a_press_is_silent() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let target = scene.create_entity();
        index.register(target, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_released(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(!events.contains(&(target, PointerEvent::Clicked)));
        assert!(!events.contains(&(target, PointerEvent::Released)));
        assert_eq!(observer.queued(), 0);
    }

    #[test]
    fn click_requires_ending_on_the_same_receiver() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let first = scene.create_entity();
        let second = scene.create_entity();
        index.register(first, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 15.0));
        index.register(second, PointerButton::Primary, 0, &quad(Vec2::new(160.0, 100.0), 15.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_pressed(PointerButton::Primary);
        router.route(&input, &scene, &mut index, &mut observer);

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(160.0, 100.0));
        input.feed_button_released(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.contains(&(first, PointerEvent::Released)));
        assert!(!events.contains(&(second, PointerEvent::Clicked)));
        assert_eq!(observer.queued(), 0);
    }

    #[test]
    fn topmost_receiver_takes_the_press() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let low = scene.create_entity();
        let high = scene.create_entity();
        index.register(low, PointerButton::Primary, 1, &quad(Vec2::new(100.0, 100.0), 40.0));
        index.register(high, PointerButton::Primary, 5, &quad(Vec2::new(100.0, 100.0), 20.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_pressed(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.contains(&(high, PointerEvent::Pressed)));
        assert!(!events.contains(&(low, PointerEvent::Pressed)));
    }

    #[test]
    fn hover_fires_only_on_transitions() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let target = scene.create_entity();
        index.register(target, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(95.0, 100.0));
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert_eq!(events, vec![(target, PointerEvent::HoverEntered)]);

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(105.0, 100.0));
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.is_empty());

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(500.0, 500.0));
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert_eq!(events, vec![(target, PointerEvent::HoverExited)]);
    }

    #[test]
    fn dead_owners_are_pruned_before_routing() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let target = scene.create_entity();
        index.register(target, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));
        scene.release_node(target);

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_pressed(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.is_empty());
        assert_eq!(index.tree().len(), 0);
    }

    #[test]
    fn reset_forgets_the_press_in_flight() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let target = scene.create_entity();
        index.register(target, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_pressed(PointerButton::Primary);
        router.route(&input, &scene, &mut index, &mut observer);
        router.reset();

        input.begin_frame();
        input.feed_button_released(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(!events.contains(&(target, PointerEvent::Clicked)));
        assert!(!events.contains(&(target, PointerEvent::Released)));
        assert_eq!(observer.queued(), 0);
    }

    #[test]
    fn buttons_track_presses_independently() {
        let (mut scene, mut observer, mut index, mut input) = setup();
        let mut router = EventRouter::new();
        let target = scene.create_entity();
        index.register(target, PointerButton::Primary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));
        index.register(target, PointerButton::Secondary, 0, &quad(Vec2::new(100.0, 100.0), 20.0));

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(100.0, 100.0));
        input.feed_button_pressed(PointerButton::Primary);
        router.route(&input, &scene, &mut index, &mut observer);

        // Releasing the other button must not complete the click.
        input.begin_frame();
        input.feed_button_pressed(PointerButton::Secondary);
        input.feed_button_released(PointerButton::Secondary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.contains(&(target, PointerEvent::Clicked)));
        assert_eq!(observer.queued(), 1);

        input.begin_frame();
        input.feed_button_released(PointerButton::Primary);
        let events = router.route(&input, &scene, &mut index, &mut observer);
        assert!(events.contains(&(target, PointerEvent::Clicked)));
        assert_eq!(observer.queued(), 2);
    }
}
