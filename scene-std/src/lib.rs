//! # Marigold Standard Components
//!
//! The component library worlds load by default. Each component is a
//! [`Component`](marigold_scene::Component) configured from its world
//! document entry and registered under the type name that entry uses.
//!
//! ## Components
//!
//! - [`Sprite`] — textured quad at the owner's global transform
//! - [`Label`] — glyph layout through the font metrics trait
//! - [`Button`] — clickable polygon driving a sibling sprite
//! - [`Animation`] — timed frame flipping over a sibling sprite
//! - [`MusicPlayer`] / [`EffectPlayer`] — audio host control
//!
//! [`register_all`] installs every factory, plus the scene crate's
//! [`StateMachine`](marigold_scene::StateMachine), into a registry.

mod animation;
mod audio;
mod button;
mod label;
mod sprite;

pub use animation::Animation;
pub use audio::{EffectPlayer, MusicPlayer};
pub use button::Button;
pub use label::Label;
pub use sprite::Sprite;

use marigold_scene::{ComponentRegistry, StateMachine};

/// Registers every standard component factory under its type name.
pub fn register_all(registry: &mut ComponentRegistry) {
    registry.register("Sprite", || Box::new(Sprite::new()));
    registry.register("Label", || Box::new(Label::new()));
    registry.register("Button", || Box::new(Button::new()));
    registry.register("Animation", || Box::new(Animation::new()));
    registry.register("MusicPlayer", || Box::new(MusicPlayer::new()));
    registry.register("EffectPlayer", || Box::new(EffectPlayer::new()));
    registry.register("StateMachine", StateMachine::factory);
}

#[cfg(test)]
mod tests {
    use marigold_render::headless_texture_bytes;
    use marigold_scene::testing::TestBench;
    use marigold_scene::world_file;
    use serde_json::json;

    use super::*;

    #[test]
    fn every_standard_type_is_registered() {
        let mut registry = ComponentRegistry::new();
        register_all(&mut registry);
        for name in [
            "Sprite",
            "Label",
            "Button",
            "Animation",
            "MusicPlayer",
            "EffectPlayer",
            "StateMachine",
        ] {
            assert!(registry.is_registered(name), "missing `{name}`");
        }
        assert!(!registry.is_registered("Teapot"));
    }

    #[test]
    fn a_world_document_builds_standard_components() {
        let mut bench = TestBench::new();
        bench.source.insert("hero.png", headless_texture_bytes(8, 8));
        bench.source.insert(
            world_file("main"),
            serde_json::to_vec(&json!({
                "children": [
                    {
                        "name": "hero",
                        "components": [
                            {"type": "Sprite", "filename": "hero.png"}
                        ]
                    }
                ]
            }))
            .unwrap(),
        );

        let mut registry = ComponentRegistry::new();
        register_all(&mut registry);
        let world = bench.load_world(&registry, "main").unwrap();

        let hero = bench.scene.child_by_name(world.root, "hero").unwrap();
        assert!(bench.scene.component_by_name(hero, "Sprite").is_some());

        bench.update(world.root, 0.016);
        assert_eq!(bench.queue.len(), 1);
    }
}
