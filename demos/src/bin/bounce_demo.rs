//! # Bounce Demo
//!
//! A ball bounces between two walls under script control while a
//! scoreboard machine counts the impacts off the event bus. No input at
//! all; the run ends when the ball runs out of bounces.
//!
//! This demo showcases scripting without UI:
//! - A state machine moving its node every frame
//! - Broadcast messages between machines on unrelated nodes
//! - A script-requested quit ending the loop

use glam::Vec2;
use marigold_app::{Game, HeadlessWindow, Settings, SETTINGS_FILE};
use marigold_core::{MemorySource, NativeClass, NativeScriptHost, NullAudio, ScriptValue};
use marigold_render::{headless_texture_bytes, HeadlessBackend};
use marigold_scene::{world_file, ComponentRegistry};
use serde_json::json;

fn demo_assets() -> MemorySource {
    let settings = json!({
        "window-width": 640,
        "window-height": 480,
        "window-title": "Marigold Bounce Demo",
        "welcome-world": "arena",
        "max-frame-rate": 240.0
    });

    let arena = json!({
        "background-color": [12, 12, 16],
        "camera": {"x": 320.0, "y": 240.0},
        "children": [
            {
                "name": "ball",
                "position": {"x": 60.0, "y": 240.0},
                "z-order": 1,
                "components": [
                    {"type": "Sprite", "filename": "img/ball.png"},
                    {
                        "type": "StateMachine",
                        "name": "ball-flow",
                        "driver-script": "arena",
                        "classname": "Bouncer",
                        "step": 40.0,
                        "min-x": 60.0,
                        "max-x": 580.0,
                        "bounces": 3
                    }
                ]
            },
            {
                "name": "scoreboard",
                "type": "object",
                "components": [
                    {
                        "type": "StateMachine",
                        "name": "score-flow",
                        "driver-script": "arena",
                        "classname": "Scoreboard"
                    }
                ]
            }
        ]
    });

    MemorySource::new()
        .with(SETTINGS_FILE, settings.to_string().into_bytes())
        .with(world_file("arena"), arena.to_string().into_bytes())
        .with("img/ball.png", headless_texture_bytes(24, 24))
}

fn demo_scripts() -> NativeScriptHost {
    let mut host = NativeScriptHost::new();
    host.register_module("arena");

    host.register_class(
        "Bouncer",
        NativeClass::new()
            .hook("enter", |env, api, _| {
                let bounces = env.get("bounces").as_f64().unwrap_or(0.0);
                env.set("dir", 1.0);
                env.set("left", bounces);
                log::info!("arena: serving, {bounces} bounces to play");
                api.move_state("Flying");
                Ok(ScriptValue::Nil)
            })
            .hook("updateFlying", |env, api, _| {
                let step = env.get("step").as_f64().unwrap_or(0.0);
                let min_x = env.get("min-x").as_f64().unwrap_or(f64::MIN);
                let max_x = env.get("max-x").as_f64().unwrap_or(f64::MAX);
                let mut dir = env.get("dir").as_f64().unwrap_or(1.0);

                let here = api.position();
                let next = f64::from(here.x) + dir * step;
                api.set_position(Vec2::new(next as f32, here.y));

                if next <= min_x || next >= max_x {
                    dir = -dir;
                    env.set("dir", dir);
                    api.notify_all("Bounce", ScriptValue::Number(next));

                    let left = env.get("left").as_f64().unwrap_or(0.0) - 1.0;
                    env.set("left", left);
                    if left <= 0.0 {
                        log::info!("arena: out of bounces, calling it a game");
                        api.quit();
                    }
                }
                Ok(ScriptValue::Nil)
            }),
    );

    host.register_class(
        "Scoreboard",
        NativeClass::new()
            .field("tally", 0.0)
            .hook("enter", |_, api, _| {
                api.subscribe("Bounce", Vec::new());
                Ok(ScriptValue::Nil)
            })
            .hook("onBounce", |env, _, args| {
                let tally = env.get("tally").as_f64().unwrap_or(0.0) + 1.0;
                env.set("tally", tally);
                let wall = args.get(1).and_then(ScriptValue::as_f64).unwrap_or(0.0);
                log::info!("arena: bounce {tally} off the wall at x = {wall}");
                Ok(ScriptValue::Nil)
            }),
    );

    host
}

fn main() {
    marigold_app::init_logging();

    log::info!("Starting Marigold bounce demo");

    let source = demo_assets();
    let settings = Settings::load(&source).expect("Failed to parse embedded settings");

    let mut registry = ComponentRegistry::new();
    scene_std::register_all(&mut registry);

    // The ball quits well before these run out.
    let mut window = HeadlessWindow::new(640, 480);
    window.push_idle_frames(64);

    let mut game = Game::new(
        settings,
        Box::new(window),
        HeadlessBackend::new(),
        Box::new(source),
        Box::new(NullAudio),
        Box::new(demo_scripts()),
        registry,
    );

    game.run().expect("Failed to load the welcome world");

    log::info!("Demo finished after {} frames", game.backend().frames());
    if let Some(world) = game.world("arena") {
        if let Some(ball) = game.scene().child_by_name(world.root, "ball") {
            if let Some(position) = game.scene().position(ball) {
                log::info!("Ball came to rest at x = {}", position.x);
            }
        }
    }
}
