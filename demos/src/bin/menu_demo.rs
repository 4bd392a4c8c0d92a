//! # Menu Demo
//!
//! A complete two-world game driven entirely headless: a menu world with
//! clickable buttons, and a level world that plays itself out and pops
//! back to the menu.
//!
//! This demo showcases the full engine loop:
//! - Worlds and components loaded from JSON documents
//! - Pointer input routed through the click index to buttons
//! - Script hooks reacting to click messages from the event bus
//! - World-stack transitions (push, pop, quit) requested by scripts

use glam::Vec2;
use marigold_app::{Game, HeadlessWindow, ScriptedEvent, Settings, SETTINGS_FILE};
use marigold_core::{
    MemorySource, NativeClass, NativeScriptHost, NullAudio, PointerButton, ScriptValue,
};
use marigold_render::{
    headless_texture_bytes, ExecutedDraw, FixedFont, FontResource, HeadlessBackend,
};
use marigold_scene::{world_file, ComponentRegistry};
use serde_json::json;

const FONT_PATH: &str = "fonts/mono";

/// Builds the in-memory asset source both worlds load from.
fn demo_assets() -> MemorySource {
    let settings = json!({
        "window-width": 800,
        "window-height": 600,
        "window-title": "Marigold Menu Demo",
        "welcome-world": "menu",
        "max-frame-rate": 240.0
    });

    // The menu: a title, looping music, and two buttons wired to the
    // `MenuButton` script class through its `action` field.
    let menu = json!({
        "background-color": [24, 26, 38],
        "camera": {"x": 400.0, "y": 300.0},
        "children": [
            {
                "name": "music",
                "type": "object",
                "components": [
                    {
                        "type": "MusicPlayer",
                        "filename": "audio/menu-theme.ogg",
                        "auto-play": true,
                        "loop": true,
                        "volume": 0.8
                    }
                ]
            },
            {
                "name": "title",
                "position": {"x": 280.0, "y": 100.0},
                "components": [
                    {"type": "Label", "font": FONT_PATH, "text": "MARIGOLD", "size": 48.0}
                ]
            },
            {
                "name": "play",
                "position": {"x": 400.0, "y": 300.0},
                "z-order": 1,
                "components": [
                    {"type": "Sprite", "filename": "img/play.png"},
                    {
                        "type": "Button",
                        "default": "img/play.png",
                        "pressed": "img/play-pressed.png",
                        "z": 1,
                        "vertex": [
                            {"x": 340.0, "y": 270.0},
                            {"x": 460.0, "y": 270.0},
                            {"x": 460.0, "y": 330.0},
                            {"x": 340.0, "y": 330.0}
                        ]
                    },
                    {
                        "type": "StateMachine",
                        "name": "play-flow",
                        "driver-script": "menu",
                        "classname": "MenuButton",
                        "action": "play"
                    }
                ]
            },
            {
                "name": "quit",
                "position": {"x": 400.0, "y": 420.0},
                "z-order": 1,
                "components": [
                    {"type": "Sprite", "filename": "img/quit.png"},
                    {
                        "type": "Button",
                        "default": "img/quit.png",
                        "pressed": "img/quit-pressed.png",
                        "z": 1,
                        "vertex": [
                            {"x": 340.0, "y": 390.0},
                            {"x": 460.0, "y": 390.0},
                            {"x": 460.0, "y": 450.0},
                            {"x": 340.0, "y": 450.0}
                        ]
                    },
                    {
                        "type": "StateMachine",
                        "name": "quit-flow",
                        "driver-script": "menu",
                        "classname": "MenuButton",
                        "action": "quit"
                    }
                ]
            }
        ]
    });

    // The level: a hero that marches a few frames under script control,
    // then pops the stack to resume the menu.
    let level = json!({
        "background-color": [18, 52, 32],
        "camera": {"x": 400.0, "y": 300.0},
        "children": [
            {
                "name": "status",
                "position": {"x": 310.0, "y": 80.0},
                "components": [
                    {"type": "Label", "font": FONT_PATH, "text": "GET READY", "size": 32.0}
                ]
            },
            {
                "name": "hero",
                "position": {"x": 120.0, "y": 300.0},
                "z-order": 2,
                "components": [
                    {"type": "Sprite", "filename": "img/hero.png"},
                    {
                        "type": "StateMachine",
                        "name": "level-flow",
                        "driver-script": "level",
                        "classname": "LevelTimer",
                        "run-frames": 4,
                        "stride": 60.0
                    }
                ]
            },
            {
                "name": "spawn-sound",
                "type": "object",
                "components": [
                    {"type": "EffectPlayer", "filename": "audio/spawn.wav", "auto-play": true}
                ]
            }
        ]
    });

    MemorySource::new()
        .with(SETTINGS_FILE, settings.to_string().into_bytes())
        .with(world_file("menu"), menu.to_string().into_bytes())
        .with(world_file("level"), level.to_string().into_bytes())
        .with("img/play.png", headless_texture_bytes(120, 60))
        .with("img/play-pressed.png", headless_texture_bytes(120, 60))
        .with("img/quit.png", headless_texture_bytes(120, 60))
        .with("img/quit-pressed.png", headless_texture_bytes(120, 60))
        .with("img/hero.png", headless_texture_bytes(32, 32))
}

/// Registers the script classes the world documents refer to.
fn demo_scripts() -> NativeScriptHost {
    let mut host = NativeScriptHost::new();
    host.register_module("menu");
    host.register_module("level");

    // Both menu buttons share one class; the world document picks the
    // behavior through the `action` instance field.
    host.register_class(
        "MenuButton",
        NativeClass::new()
            .hook("enter", |_, api, _| {
                api.move_state("Idle");
                Ok(ScriptValue::Nil)
            })
            .hook("updateIdle", |_, _, _| Ok(ScriptValue::Nil))
            .hook("onClick", |env, api, _| {
                match env.get("action").as_str() {
                    Some("play") => {
                        log::info!("menu: play clicked, entering the level");
                        api.push_world("level");
                    }
                    Some("quit") => {
                        log::info!("menu: quit clicked, shutting down");
                        api.quit();
                    }
                    other => log::warn!("menu: button without a usable action: {other:?}"),
                }
                Ok(ScriptValue::Nil)
            }),
    );

    host.register_class(
        "LevelTimer",
        NativeClass::new()
            .hook("enter", |env, api, _| {
                let frames = env.get("run-frames").as_f64().unwrap_or(0.0);
                env.set("left", frames);
                log::info!("level: marching for {frames} frames");
                api.move_state("Marching");
                Ok(ScriptValue::Nil)
            })
            .hook("updateMarching", |env, api, _| {
                let stride = env.get("stride").as_f64().unwrap_or(0.0) as f32;
                api.set_position(api.position() + Vec2::new(stride, 0.0));
                let left = env.get("left").as_f64().unwrap_or(0.0) - 1.0;
                env.set("left", left);
                if left <= 0.0 {
                    log::info!("level: done marching, back to the menu");
                    api.pop_world();
                }
                Ok(ScriptValue::Nil)
            }),
    );

    host
}

/// Scripts the whole play session: click the play button, wait out the
/// level, then click quit back on the menu.
fn demo_window() -> HeadlessWindow {
    let mut window = HeadlessWindow::new(800, 600);
    window.push_idle_frames(1);
    window.push_frame(vec![ScriptedEvent::PointerMoved(Vec2::new(400.0, 300.0))]);
    window.push_frame(vec![ScriptedEvent::ButtonPressed(PointerButton::Primary)]);
    window.push_frame(vec![ScriptedEvent::ButtonReleased(PointerButton::Primary)]);
    // The level plays itself out over these frames and pops back.
    window.push_idle_frames(6);
    window.push_frame(vec![ScriptedEvent::PointerMoved(Vec2::new(400.0, 420.0))]);
    window.push_frame(vec![ScriptedEvent::ButtonPressed(PointerButton::Primary)]);
    window.push_frame(vec![ScriptedEvent::ButtonReleased(PointerButton::Primary)]);
    // Spares the quit click leaves unused.
    window.push_idle_frames(2);
    window
}

fn main() {
    marigold_app::init_logging();

    log::info!("Starting Marigold menu demo");

    let source = demo_assets();
    let settings = Settings::load(&source).expect("Failed to parse embedded settings");

    let mut registry = ComponentRegistry::new();
    scene_std::register_all(&mut registry);

    let mut backend = HeadlessBackend::new();
    let atlas = backend.texture_with_size(Vec2::new(64.0, 64.0));

    let mut game = Game::new(
        settings,
        Box::new(demo_window()),
        backend,
        Box::new(source),
        Box::new(NullAudio),
        Box::new(demo_scripts()),
        registry,
    );
    game.resources_mut()
        .insert(FONT_PATH, FontResource::new(FixedFont::new(atlas.handle)));

    game.run().expect("Failed to load the welcome world");

    log::info!("Demo finished after {} frames", game.backend().frames());
    log::info!(
        "Landed on world `{}`; the level was {}",
        game.current_world().unwrap_or("<none>"),
        if game.world("level").is_some() {
            "kept"
        } else {
            "torn down"
        },
    );

    let executed = game.backend_mut().take_executed();
    let quads = executed
        .iter()
        .filter(|draw| matches!(draw, ExecutedDraw::Quad(_)))
        .count();
    log::info!(
        "Executed {} quad draws and {} glyph batches",
        quads,
        executed.len() - quads
    );
}
