//! Clickable areas wired to a sibling sprite.

use std::any::Any;

use glam::Vec2;
use marigold_core::{ConfigExt, PointerButton};
use marigold_scene::{Component, PointerEvent, SceneError, UpdateContext};
use serde_json::Value;

use crate::sprite::{SPRITE_NAME, Sprite};

/// A polygonal click area that mirrors its interaction state onto the
/// sibling [`Sprite`].
///
/// On init the polygon registers with the pointer index for the primary
/// button; the router then delivers `Pressed`/`Released`/`Clicked` and
/// the hover transitions through `on_pointer`. Every update picks the
/// image for the current state, pressed over highlighted over
/// unavailable, and hands it to the sprite.
///
/// Configuration: `"default"` image (required), `"pressed"`,
/// `"disable"` and `"highlight"` images (falling back to the default),
/// `"available"`, `"z"`, and the `"vertex"` polygon as `{x, y}` points
/// in world space.
pub struct Button {
    available: bool,
    pressed: bool,
    highlighted: bool,
    z_order: i32,
    vertices: Vec<Vec2>,
    default_image: String,
    pressed_image: String,
    disable_image: String,
    highlight_image: String,
    registered: bool,
}

impl Button {
    pub fn new() -> Self {
        Self {
            available: true,
            pressed: false,
            highlighted: false,
            z_order: 0,
            vertices: Vec::new(),
            default_image: String::new(),
            pressed_image: String::new(),
            disable_image: String::new(),
            highlight_image: String::new(),
            registered: false,
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.available
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    #[inline]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Enables or disables the click area. The pointer index entry
    /// follows on the next update, where the index is reachable.
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Button {
    fn init(&mut self, config: &Value, ctx: &mut UpdateContext<'_, '_>) -> Result<(), SceneError> {
        self.available = config.bool_or("available", true)?;
        let default_image = config.str_field("default")?;
        self.pressed_image = config.str_or("pressed", default_image)?.to_owned();
        self.disable_image = config.str_or("disable", default_image)?.to_owned();
        self.highlight_image = config.str_or("highlight", default_image)?.to_owned();
        self.default_image = default_image.to_owned();
        self.z_order = config.i64_or("z", 0)? as i32;

        self.vertices.clear();
        for item in config.array_field("vertex")? {
            self.vertices
                .push(Vec2::new(item.f32_field("x")?, item.f32_field("y")?));
        }

        if self.available {
            let owner = ctx.owner();
            ctx.services
                .pointer_index
                .register(owner, PointerButton::Primary, self.z_order, &self.vertices);
            self.registered = true;
        }
        Ok(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut UpdateContext<'_, '_>) {
        if self.available != self.registered {
            let owner = ctx.owner();
            if self.available {
                ctx.services.pointer_index.register(
                    owner,
                    PointerButton::Primary,
                    self.z_order,
                    &self.vertices,
                );
            } else {
                ctx.services.pointer_index.unregister(
                    owner,
                    PointerButton::Primary,
                    self.z_order,
                    &self.vertices,
                );
                self.pressed = false;
                self.highlighted = false;
            }
            self.registered = self.available;
        }

        let image = if self.pressed {
            &self.pressed_image
        } else if self.highlighted {
            &self.highlight_image
        } else if !self.available {
            &self.disable_image
        } else {
            &self.default_image
        };
        let Some(sprite) = ctx.scene.component_by_name(ctx.owner(), SPRITE_NAME) else {
            return;
        };
        let _ = ctx
            .scene
            .with_component_mut::<Sprite, _>(sprite, |s| s.set_image(image));
    }

    fn on_pointer(&mut self, event: PointerEvent, _ctx: &mut UpdateContext<'_, '_>) {
        match event {
            PointerEvent::Pressed => self.pressed = true,
            PointerEvent::Released | PointerEvent::Clicked => self.pressed = false,
            PointerEvent::HoverEntered => self.highlighted = true,
            PointerEvent::HoverExited => self.highlighted = false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use marigold_core::Input;
    use marigold_render::headless_texture_bytes;
    use marigold_scene::{NodeId, testing::TestBench};
    use marigold_ui::{ClickIndex, EventRouter};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn button_config() -> Value {
        json!({
            "default": "default.png",
            "pressed": "pressed.png",
            "disable": "disable.png",
            "highlight": "highlight.png",
            "z": 1,
            "vertex": [
                {"x": 0.0, "y": 0.0},
                {"x": 100.0, "y": 0.0},
                {"x": 100.0, "y": 100.0},
                {"x": 0.0, "y": 100.0}
            ]
        })
    }

    fn bench_with_images() -> TestBench {
        let mut bench = TestBench::new();
        for path in ["default.png", "pressed.png", "disable.png", "highlight.png"] {
            bench.source.insert(path, headless_texture_bytes(4, 4));
        }
        bench
    }

    /// Spawns an entity carrying a sprite and a button, registering the
    /// click polygon into `index`.
    fn spawn_button(bench: &mut TestBench, index: &mut ClickIndex, config: &Value) -> NodeId {
        let node = bench.scene.create_entity();
        let sprite = bench
            .scene
            .add_component(node, "Sprite", Box::new(Sprite::new()))
            .unwrap();
        bench.init(sprite, &json!({})).unwrap();

        let button = bench
            .scene
            .add_component(node, "Button", Box::new(Button::new()))
            .unwrap();
        let (scene, observer, mut services) = bench.split_with_index(index);
        scene
            .init_component(button, config, observer, &mut services)
            .unwrap();
        node
    }

    fn route_and_dispatch(
        bench: &mut TestBench,
        router: &mut EventRouter,
        index: &mut ClickIndex,
        input: &Input,
    ) {
        let events = router.route(input, &bench.scene, index, &mut bench.observer);
        let (scene, observer, mut services) = bench.split_with_index(index);
        for (node, event) in events {
            scene.dispatch_pointer(node, event, observer, &mut services);
        }
    }

    fn update_with_index(bench: &mut TestBench, index: &mut ClickIndex, root: NodeId) {
        let (scene, observer, mut services) = bench.split_with_index(index);
        scene.update(root, 0.016, observer, &mut services);
    }

    fn sprite_image(bench: &mut TestBench, node: NodeId) -> String {
        let sprite = bench.scene.component_by_name(node, "Sprite").unwrap();
        bench
            .scene
            .with_component_mut::<Sprite, _>(sprite, |s| s.image().to_owned())
            .unwrap()
    }

    #[test]
    fn click_cycle_walks_the_image_states() {
        let mut bench = bench_with_images();
        let mut index = ClickIndex::new(Vec2::ZERO, Vec2::splat(512.0));
        let mut router = EventRouter::new();
        let mut input = Input::new();

        let node = spawn_button(&mut bench, &mut index, &button_config());
        assert_eq!(index.tree().len(), 1);

        bench.update(node, 0.016);
        assert_eq!(sprite_image(&mut bench, node), "default.png");

        // Press inside the polygon. The hover edge fires the same frame.
        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(50.0, 50.0));
        input.feed_button_pressed(PointerButton::Primary);
        route_and_dispatch(&mut bench, &mut router, &mut index, &input);
        bench.update(node, 0.016);
        assert_eq!(sprite_image(&mut bench, node), "pressed.png");

        // Release on the same receiver: click plus sibling notification.
        input.begin_frame();
        input.feed_button_released(PointerButton::Primary);
        route_and_dispatch(&mut bench, &mut router, &mut index, &input);
        assert_eq!(bench.observer.queued(), 1);
        bench.update(node, 0.016);
        assert_eq!(sprite_image(&mut bench, node), "highlight.png");

        // Leaving the polygon drops the highlight.
        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(400.0, 400.0));
        route_and_dispatch(&mut bench, &mut router, &mut index, &input);
        bench.update(node, 0.016);
        assert_eq!(sprite_image(&mut bench, node), "default.png");
    }

    #[test]
    fn availability_gates_the_receiver() {
        let mut bench = bench_with_images();
        let mut index = ClickIndex::new(Vec2::ZERO, Vec2::splat(512.0));

        let mut config = button_config();
        config["available"] = json!(false);
        let node = spawn_button(&mut bench, &mut index, &config);
        assert!(index.tree().is_empty());

        update_with_index(&mut bench, &mut index, node);
        assert_eq!(sprite_image(&mut bench, node), "disable.png");

        let button = bench.scene.component_by_name(node, "Button").unwrap();
        bench
            .scene
            .with_component_mut::<Button, _>(button, |b| b.set_available(true))
            .unwrap();
        update_with_index(&mut bench, &mut index, node);
        assert_eq!(index.tree().len(), 1);
        assert_eq!(sprite_image(&mut bench, node), "default.png");

        bench
            .scene
            .with_component_mut::<Button, _>(button, |b| b.set_available(false))
            .unwrap();
        update_with_index(&mut bench, &mut index, node);
        assert!(index.tree().is_empty());
        assert_eq!(sprite_image(&mut bench, node), "disable.png");
    }

    #[rstest]
    #[case(true, true, "pressed.png")]
    #[case(true, false, "pressed.png")]
    #[case(false, true, "highlight.png")]
    #[case(false, false, "default.png")]
    fn image_follows_state_priority(
        #[case] pressed: bool,
        #[case] highlighted: bool,
        #[case] expected: &str,
    ) {
        let mut bench = bench_with_images();
        let node = bench.scene.create_entity();
        let sprite = bench
            .scene
            .add_component(node, "Sprite", Box::new(Sprite::new()))
            .unwrap();
        bench.init(sprite, &json!({})).unwrap();
        let button = bench
            .scene
            .add_component(node, "Button", Box::new(Button::new()))
            .unwrap();
        bench.init(button, &button_config()).unwrap();

        bench
            .scene
            .with_component_mut::<Button, _>(button, |b| {
                b.pressed = pressed;
                b.highlighted = highlighted;
            })
            .unwrap();
        bench.update(node, 0.016);
        assert_eq!(sprite_image(&mut bench, node), expected);
    }

    #[test]
    fn missing_vertex_list_fails_init() {
        let mut bench = bench_with_images();
        let node = bench.scene.create_entity();
        let button = bench
            .scene
            .add_component(node, "Button", Box::new(Button::new()))
            .unwrap();
        let error = bench
            .init(button, &json!({"default": "default.png"}))
            .unwrap_err();
        assert!(matches!(error, SceneError::Config(_)));
        assert!(bench.scene.component_by_name(node, "Button").is_none());
    }

    #[test]
    fn button_without_sprite_still_tracks_presses() {
        let mut bench = TestBench::new();
        let mut index = ClickIndex::new(Vec2::ZERO, Vec2::splat(512.0));
        let mut router = EventRouter::new();
        let mut input = Input::new();

        let node = bench.scene.create_entity();
        let button = bench
            .scene
            .add_component(node, "Button", Box::new(Button::new()))
            .unwrap();
        {
            let (scene, observer, mut services) = bench.split_with_index(&mut index);
            scene
                .init_component(button, &button_config(), observer, &mut services)
                .unwrap();
        }

        input.begin_frame();
        input.feed_pointer_moved(Vec2::new(10.0, 10.0));
        input.feed_button_pressed(PointerButton::Primary);
        route_and_dispatch(&mut bench, &mut router, &mut index, &input);
        bench.update(node, 0.016);

        let pressed = bench
            .scene
            .with_component_mut::<Button, _>(button, |b| b.is_pressed())
            .unwrap();
        assert!(pressed);
    }
}
