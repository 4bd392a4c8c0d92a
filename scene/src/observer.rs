//! Deferred message bus between state machines.
//!
//! Machines subscribe to message names; notifications enqueue envelopes
//! that are delivered once per frame by [`drain`], after the world
//! update. Targets are resolved when an envelope is delivered, not when
//! it is sent, so subscriptions and deaths between the two are honored.

use std::collections::HashMap;

use marigold_core::ScriptValue;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arena::{ComponentId, NodeId};
use crate::commands::GameCommands;
use crate::scene::Scene;
use crate::state_machine::StateMachine;

/// Bus lifecycle. `Blocked` is terminal: set during teardown so that
/// dying machines cannot enqueue into a world being destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusState {
    Accepting,
    Draining,
    Blocked,
}

#[derive(Debug, Clone)]
enum Delivery {
    /// One uniformly random subscriber.
    Single,
    /// Every subscriber.
    All,
    /// Every machine on one node, bypassing subscriptions.
    Siblings(NodeId),
}

struct Envelope {
    name: String,
    sender: ScriptValue,
    data: ScriptValue,
    delivery: Delivery,
}

/// Subscription table plus the pending envelope queue.
pub struct Observer {
    state: BusState,
    table: HashMap<String, Vec<ComponentId>>,
    queue: Vec<Envelope>,
    rng: StdRng,
}

impl Observer {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic single-subscriber picks, for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: BusState::Accepting,
            table: HashMap::new(),
            queue: Vec::new(),
            rng,
        }
    }

    pub fn state(&self) -> BusState {
        self.state
    }

    /// Stops the bus for good. Every notification from here on is
    /// dropped.
    pub fn block(&mut self) {
        self.state = BusState::Blocked;
    }

    /// Registers `subscriber` for `name`. Idempotent.
    pub fn subscribe(&mut self, subscriber: ComponentId, name: &str) {
        let list = self.table.entry(name.to_owned()).or_default();
        if !list.contains(&subscriber) {
            list.push(subscriber);
        }
    }

    /// Drops `subscriber`'s registration for `name`, effective from the
    /// next delivery, including deliveries later in the current drain.
    pub fn cancel(&mut self, subscriber: ComponentId, name: &str) {
        if let Some(list) = self.table.get_mut(name) {
            list.retain(|id| *id != subscriber);
            if list.is_empty() {
                self.table.remove(name);
            }
        }
    }

    /// Drops every registration of `subscriber`.
    pub fn unsubscribe_all(&mut self, subscriber: ComponentId) {
        self.table.retain(|_, list| {
            list.retain(|id| *id != subscriber);
            !list.is_empty()
        });
    }

    pub fn subscriber_count(&self, name: &str) -> usize {
        self.table.get(name).map(Vec::len).unwrap_or(0)
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Enqueues a message for one random subscriber.
    pub fn notify(&mut self, sender: ScriptValue, name: &str, data: ScriptValue) {
        self.enqueue(name, sender, data, Delivery::Single);
    }

    /// Enqueues a message for every subscriber.
    pub fn notify_all(&mut self, sender: ScriptValue, name: &str, data: ScriptValue) {
        self.enqueue(name, sender, data, Delivery::All);
    }

    /// Enqueues a message for every machine attached to `node`,
    /// regardless of subscriptions.
    pub fn notify_siblings(
        &mut self,
        sender: ScriptValue,
        name: &str,
        node: NodeId,
        data: ScriptValue,
    ) {
        self.enqueue(name, sender, data, Delivery::Siblings(node));
    }

    fn enqueue(&mut self, name: &str, sender: ScriptValue, data: ScriptValue, delivery: Delivery) {
        if self.state == BusState::Blocked {
            log::debug!("dropping `{name}`: the bus is blocked");
            return;
        }
        self.queue.push(Envelope {
            name: name.to_owned(),
            sender,
            data,
            delivery,
        });
    }

    fn prune_dead(&mut self, scene: &Scene, name: &str) {
        if let Some(list) = self.table.get_mut(name) {
            list.retain(|id| scene.is_component_alive(*id));
            if list.is_empty() {
                self.table.remove(name);
            }
        }
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}

/// Delivers every envelope queued so far, in send order. Envelopes
/// enqueued while draining are held for the next call, so one machine
/// answering another cannot extend the current frame unboundedly.
pub fn drain(scene: &mut Scene, observer: &mut Observer, game: &GameCommands) {
    if observer.state == BusState::Blocked {
        return;
    }
    observer.state = BusState::Draining;
    let envelopes = std::mem::take(&mut observer.queue);
    for envelope in envelopes {
        deliver(scene, observer, game, envelope);
    }
    observer.state = BusState::Accepting;
}

fn deliver(scene: &mut Scene, observer: &mut Observer, game: &GameCommands, envelope: Envelope) {
    let (targets, filtered) = match envelope.delivery {
        Delivery::All => {
            observer.prune_dead(scene, &envelope.name);
            let targets = observer
                .table
                .get(&envelope.name)
                .cloned()
                .unwrap_or_default();
            (targets, true)
        }
        Delivery::Single => {
            observer.prune_dead(scene, &envelope.name);
            let subscribers = observer
                .table
                .get(&envelope.name)
                .cloned()
                .unwrap_or_default();
            let targets = if subscribers.is_empty() {
                log::debug!("`{}` has no subscribers", envelope.name);
                Vec::new()
            } else {
                let pick = observer.rng.gen_range(0..subscribers.len());
                vec![subscribers[pick]]
            };
            (targets, true)
        }
        Delivery::Siblings(node) => (scene.components_of(node), false),
    };

    for target in targets {
        dispatch(scene, observer, game, target, &envelope, filtered);
    }
}

fn dispatch(
    scene: &mut Scene,
    observer: &mut Observer,
    game: &GameCommands,
    target: ComponentId,
    envelope: &Envelope,
    filtered: bool,
) {
    let Some(owner) = scene.component_owner(target) else {
        return;
    };
    let Some(mut boxed) = scene.take_component(target) else {
        return;
    };
    if let Some(machine) = boxed.as_any_mut().downcast_mut::<StateMachine>() {
        machine.deliver(
            &envelope.name,
            &envelope.sender,
            &envelope.data,
            filtered,
            scene,
            observer,
            game,
            owner,
            target,
        );
    }
    scene.put_back_component(target, boxed);
}
