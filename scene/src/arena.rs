//! Generational slot storage with per-slot owner counts.
//!
//! Every node and component in the engine lives in one of these arenas,
//! which together form the global live set. A slot is created with one
//! owner; [`retain`](Slots::retain) adds owners and
//! [`release`](Slots::release) drops them, freeing the slot when the last
//! owner is gone. Freeing bumps the slot's generation, so any id issued
//! before the free goes stale: stale ids read as dead instead of aliasing
//! whatever reuses the slot.

use std::hash::{Hash, Hasher};

/// Handle to a node slot.
#[derive(Clone, Copy)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Handle to a component slot.
#[derive(Clone, Copy)]
pub struct ComponentId {
    index: u32,
    generation: u32,
}

macro_rules! impl_id {
    ($name:ident, $label:literal) => {
        impl $name {
            pub(crate) fn new(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }

            /// Returns the slot index of this id.
            pub fn index(&self) -> u32 {
                self.index
            }

            /// Returns the generation this id was issued at.
            pub fn generation(&self) -> u32 {
                self.generation
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.index == other.index && self.generation == other.generation
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.index.hash(state);
                self.generation.hash(state);
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({}v{})"), self.index, self.generation)
            }
        }
    };
}

impl_id!(NodeId, "Node");
impl_id!(ComponentId, "Component");

/// Result of dropping one owner from a slot.
#[derive(Debug)]
pub(crate) enum Release<T> {
    /// Other owners remain; the slot stays live.
    StillHeld,
    /// The last owner was dropped; the slot is free and its value is
    /// returned for teardown.
    Freed(T),
    /// The id was stale or never live. Rejected, nothing freed.
    Dead,
}

struct Slot<T> {
    value: Option<T>,
    generation: u32,
    owners: u32,
}

/// Generational arena of owner-counted slots.
pub(crate) struct Slots<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: u32,
}

impl<T> Slots<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Stores `value` with one owner, reusing a freed slot if available.
    /// Returns `(index, generation)`.
    pub fn insert(&mut self, value: T) -> (u32, u32) {
        self.live += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            slot.owners = 1;
            (index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                value: Some(value),
                generation: 0,
                owners: 1,
            });
            (index, 0)
        }
    }

    pub fn is_alive(&self, index: u32, generation: u32) -> bool {
        match self.slots.get(index as usize) {
            Some(slot) => slot.value.is_some() && slot.generation == generation,
            None => false,
        }
    }

    pub fn get(&self, index: u32, generation: u32) -> Option<&T> {
        let slot = self.slots.get(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_ref()
    }

    pub fn get_mut(&mut self, index: u32, generation: u32) -> Option<&mut T> {
        let slot = self.slots.get_mut(index as usize)?;
        if slot.generation != generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Adds an owner. Returns false (and changes nothing) for stale ids.
    pub fn retain(&mut self, index: u32, generation: u32) -> bool {
        match self.slots.get_mut(index as usize) {
            Some(slot) if slot.value.is_some() && slot.generation == generation => {
                slot.owners += 1;
                true
            }
            _ => false,
        }
    }

    /// Drops one owner. Frees the slot and returns its value when the
    /// last owner is dropped; rejects stale ids.
    pub fn release(&mut self, index: u32, generation: u32) -> Release<T> {
        let Some(slot) = self.slots.get_mut(index as usize) else {
            return Release::Dead;
        };
        if slot.value.is_none() || slot.generation != generation {
            return Release::Dead;
        }
        slot.owners -= 1;
        if slot.owners > 0 {
            return Release::StillHeld;
        }

        // Last owner gone. Bump the generation so outstanding ids go stale.
        let value = slot.value.take();
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(index);
        self.live -= 1;
        match value {
            Some(value) => Release::Freed(value),
            None => Release::Dead,
        }
    }

    pub fn owners(&self, index: u32, generation: u32) -> Option<u32> {
        let slot = self.slots.get(index as usize)?;
        if slot.value.is_some() && slot.generation == generation {
            Some(slot.owners)
        } else {
            None
        }
    }

    /// Number of live slots.
    pub fn live(&self) -> u32 {
        self.live
    }

    /// Frees every live slot regardless of owner counts, returning the
    /// freed values. Bulk teardown for shutdown.
    pub fn clear(&mut self) -> Vec<T> {
        let mut freed = Vec::new();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(value) = slot.value.take() {
                slot.generation = slot.generation.wrapping_add(1);
                slot.owners = 0;
                self.free_list.push(index as u32);
                freed.push(value);
            }
        }
        self.live = 0;
        freed
    }

    /// Iterates `(index, generation)` of every live slot.
    pub fn iter_live(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.value.is_some())
            .map(|(index, slot)| (index as u32, slot.generation))
    }
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_starts_with_one_owner() {
        let mut slots = Slots::new();
        let (i, g) = slots.insert("a");
        assert!(slots.is_alive(i, g));
        assert_eq!(slots.owners(i, g), Some(1));
        assert_eq!(slots.live(), 1);
    }

    #[test]
    fn two_owners_need_two_releases() {
        let mut slots = Slots::new();
        let (i, g) = slots.insert("a");
        assert!(slots.retain(i, g));

        assert!(matches!(slots.release(i, g), Release::StillHeld));
        assert!(slots.is_alive(i, g));
        assert!(matches!(slots.release(i, g), Release::Freed("a")));
        assert!(!slots.is_alive(i, g));
    }

    #[test]
    fn release_of_stale_id_is_rejected() {
        let mut slots = Slots::new();
        let (i, g) = slots.insert("a");
        assert!(matches!(slots.release(i, g), Release::Freed("a")));
        // A second release of the same id must not free anything again.
        assert!(matches!(slots.release(i, g), Release::Dead));
        assert_eq!(slots.live(), 0);
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut slots = Slots::new();
        let (i0, g0) = slots.insert("a");
        slots.release(i0, g0);
        let (i1, g1) = slots.insert("b");

        assert_eq!(i0, i1);
        assert_ne!(g0, g1);
        assert!(!slots.is_alive(i0, g0));
        assert_eq!(slots.get(i1, g1), Some(&"b"));
        assert_eq!(slots.get(i0, g0), None);
    }

    #[test]
    fn retain_of_stale_id_is_rejected() {
        let mut slots = Slots::new();
        let (i, g) = slots.insert("a");
        slots.release(i, g);
        assert!(!slots.retain(i, g));
    }

    #[test]
    fn clear_frees_everything() {
        let mut slots = Slots::new();
        let (i0, g0) = slots.insert("a");
        slots.retain(i0, g0);
        let (i1, g1) = slots.insert("b");

        let mut freed = slots.clear();
        freed.sort();
        assert_eq!(freed, vec!["a", "b"]);
        assert_eq!(slots.live(), 0);
        assert!(!slots.is_alive(i0, g0));
        assert!(!slots.is_alive(i1, g1));
    }

    #[test]
    fn iter_live_skips_freed() {
        let mut slots = Slots::new();
        let (i0, g0) = slots.insert("a");
        let (_i1, _g1) = slots.insert("b");
        slots.release(i0, g0);

        let live: Vec<_> = slots.iter_live().collect();
        assert_eq!(live.len(), 1);
    }

    #[test]
    fn id_debug_format() {
        let node = NodeId::new(3, 1);
        assert_eq!(format!("{node:?}"), "Node(3v1)");
        let comp = ComponentId::new(0, 0);
        assert_eq!(format!("{comp:?}"), "Component(0v0)");
    }
}
