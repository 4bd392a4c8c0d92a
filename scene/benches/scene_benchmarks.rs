#![allow(dead_code)]

use std::any::Any;

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use marigold_core::{NativeClass, ScriptValue};
use marigold_scene::testing::TestBench;
use marigold_scene::{Component, NodeId, StateMachine, UpdateContext};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helper components
// ---------------------------------------------------------------------------

struct Tick(u64);

impl Component for Tick {
    fn update(&mut self, _dt: f32, _ctx: &mut UpdateContext<'_, '_>) {
        self.0 += 1;
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn wide_tree(children: usize) -> (TestBench, NodeId) {
    let mut bench = TestBench::new();
    let root = bench.scene.create_entity();
    for i in 0..children {
        let child = bench.scene.create_entity();
        bench.scene.add_child(root, &format!("c{i}"), child);
        bench.scene.release_node(child);
        bench.scene.add_component(child, "tick", Box::new(Tick(0)));
    }
    (bench, root)
}

fn deep_tree(depth: usize) -> (TestBench, NodeId) {
    let mut bench = TestBench::new();
    let root = bench.scene.create_entity();
    let mut parent = root;
    for i in 0..depth {
        let child = bench.scene.create_entity();
        bench.scene.add_child(parent, &format!("d{i}"), child);
        bench.scene.release_node(child);
        bench.scene.add_component(child, "tick", Box::new(Tick(0)));
        parent = child;
    }
    (bench, root)
}

// ---------------------------------------------------------------------------
// Tree walk
// ---------------------------------------------------------------------------

fn bench_update_wide_1k(c: &mut Criterion) {
    let (mut bench, root) = wide_tree(1_000);
    c.bench_function("update_wide_1k", |b| {
        b.iter(|| {
            bench.update(root, 0.016);
            black_box(&bench.scene);
        });
    });
}

fn bench_update_deep_256(c: &mut Criterion) {
    let (mut bench, root) = deep_tree(256);
    c.bench_function("update_deep_256", |b| {
        b.iter(|| {
            bench.update(root, 0.016);
            black_box(&bench.scene);
        });
    });
}

// ---------------------------------------------------------------------------
// Transform cascade
// ---------------------------------------------------------------------------

fn bench_transform_cascade_deep_256(c: &mut Criterion) {
    let (mut bench, root) = deep_tree(256);
    let mut x = 0.0f32;
    c.bench_function("transform_cascade_deep_256", |b| {
        b.iter(|| {
            x += 1.0;
            bench.scene.set_position(root, glam::Vec2::new(x, 0.0));
            black_box(&bench.scene);
        });
    });
}

// ---------------------------------------------------------------------------
// Slot recycling
// ---------------------------------------------------------------------------

fn bench_spawn_release_recycling_1k(c: &mut Criterion) {
    c.bench_function("spawn_release_recycle_1k", |b| {
        b.iter_batched(
            TestBench::new,
            |mut bench| {
                for _ in 0..1_000 {
                    let node = bench.scene.create_entity();
                    black_box(node);
                    bench.scene.release_node(node);
                }
            },
            BatchSize::SmallInput,
        );
    });
}

// ---------------------------------------------------------------------------
// Message drain
// ---------------------------------------------------------------------------

fn bench_broadcast_drain_100_machines(c: &mut Criterion) {
    let mut bench = TestBench::new();
    bench.script.register_module("bench");
    bench.script.register_class(
        "Listener",
        NativeClass::new()
            .field("pings", 0.0)
            .hook("enter", |_, api, _| {
                api.subscribe("Ping", Vec::new());
                Ok(ScriptValue::Nil)
            })
            .hook("onPing", |env, _, _| {
                let pings = env.get("pings").as_f64().unwrap_or(0.0);
                env.set("pings", pings + 1.0);
                Ok(ScriptValue::Nil)
            }),
    );

    let root = bench.scene.create_entity();
    let config = json!({ "driver-script": "bench", "classname": "Listener" });
    for i in 0..100 {
        let node = bench.scene.create_entity();
        bench.scene.add_child(root, &format!("m{i}"), node);
        bench.scene.release_node(node);
        let id = bench
            .scene
            .add_component(node, "driver", StateMachine::factory())
            .unwrap();
        bench.init(id, &config).unwrap();
    }
    // First walk runs every enter hook, which subscribes.
    bench.update(root, 0.016);

    c.bench_function("broadcast_drain_100_machines", |b| {
        b.iter(|| {
            bench
                .observer
                .notify_all(ScriptValue::Nil, "Ping", ScriptValue::Nil);
            bench.drain();
            black_box(&bench.observer);
        });
    });
}

criterion_group!(
    benches,
    bench_update_wide_1k,
    bench_update_deep_256,
    bench_transform_cascade_deep_256,
    bench_spawn_release_recycling_1k,
    bench_broadcast_drain_100_machines,
);
criterion_main!(benches);
