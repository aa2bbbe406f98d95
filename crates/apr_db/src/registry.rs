//! Generic keyed container: the chip database's entity registry.
//!
//! Every first-class entity (layer, site, cell, instance, net, region) lives
//! in one of these. Unlike a plain append-only arena, a [`Registry`] supports
//! removal (retiring the key rather than reusing it), a name→key index, and
//! synchronous listener notification on mutation.

use crate::ids::ObjectKey;
use std::collections::HashMap;

/// The kind of mutation a [`Registry`] notifies listeners about.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EventKind {
    /// An entity was added.
    Added,
    /// An entity was removed. Listeners see this before the slot is cleared.
    Removed,
    /// An entity already present was mutated in place.
    ContentsChanged,
}

/// A single notification: what happened, to which key.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Event {
    /// What kind of mutation occurred.
    pub kind: EventKind,
    /// The key of the affected entity.
    pub key: ObjectKey,
}

/// A handle returned by [`Registry::add_listener`], used to unregister later.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ListenerId(u32);

enum Slot<T> {
    Occupied(T),
    Tombstone,
}

/// A keyed, name-indexed, listener-notifying container.
///
/// Insertion fails if the name already exists in this container. Lookup by an
/// unknown name or a removed key returns `None` / [`ObjectKey::NOT_FOUND`]
/// rather than panicking — per §4.A, only structural-invariant breaks panic.
pub struct Registry<T> {
    slots: Vec<Slot<T>>,
    names: Vec<String>,
    by_name: HashMap<String, ObjectKey>,
    listeners: Vec<(ListenerId, Box<dyn FnMut(Event)>)>,
    next_listener_id: u32,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            names: Vec::new(),
            by_name: HashMap::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Registers a listener, invoked synchronously on every subsequent
    /// `add`/`remove`/`touch`. Returns a handle to unregister it later.
    pub fn add_listener(&mut self, f: impl FnMut(Event) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(f)));
        id
    }

    /// Unregisters a previously registered listener. No-op if already removed.
    pub fn remove_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    fn notify(&mut self, kind: EventKind, key: ObjectKey) {
        let event = Event { kind, key };
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Inserts a new entity under `name`. Fails with `Err(())` if `name` is
    /// already in use in this container; no mutation occurs on failure.
    pub fn add(&mut self, name: impl Into<String>, item: T) -> Result<ObjectKey, DuplicateName> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(DuplicateName(name));
        }
        let key = ObjectKey::from_raw(self.slots.len() as u32);
        self.slots.push(Slot::Occupied(item));
        self.names.push(name.clone());
        self.by_name.insert(name, key);
        self.notify(EventKind::Added, key);
        Ok(key)
    }

    /// Looks up a key by name. Returns `ObjectKey::NOT_FOUND` if absent.
    pub fn key_by_name(&self, name: &str) -> ObjectKey {
        self.by_name.get(name).copied().unwrap_or(ObjectKey::NOT_FOUND)
    }

    /// Returns the name an occupied key was inserted under.
    pub fn name_of(&self, key: ObjectKey) -> Option<&str> {
        if self.is_occupied(key) {
            Some(self.names[key.as_raw() as usize].as_str())
        } else {
            None
        }
    }

    fn is_occupied(&self, key: ObjectKey) -> bool {
        key.is_valid()
            && (key.as_raw() as usize) < self.slots.len()
            && matches!(self.slots[key.as_raw() as usize], Slot::Occupied(_))
    }

    /// Returns a reference to the entity at `key`, or `None` if the key is
    /// invalid, out of range, or removed.
    pub fn get(&self, key: ObjectKey) -> Option<&T> {
        if !self.is_occupied(key) {
            return None;
        }
        match &self.slots[key.as_raw() as usize] {
            Slot::Occupied(item) => Some(item),
            Slot::Tombstone => None,
        }
    }

    /// Returns a mutable reference to the entity at `key`, or `None`.
    pub fn get_mut(&mut self, key: ObjectKey) -> Option<&mut T> {
        if !self.is_occupied(key) {
            return None;
        }
        match &mut self.slots[key.as_raw() as usize] {
            Slot::Occupied(item) => Some(item),
            Slot::Tombstone => None,
        }
    }

    /// Notifies listeners that the entity at `key` was mutated in place. Call
    /// this after a `get_mut`-based edit that other passes should observe.
    pub fn touch(&mut self, key: ObjectKey) {
        if self.is_occupied(key) {
            self.notify(EventKind::ContentsChanged, key);
        }
    }

    /// Removes the entity at `key`, retiring (never reusing) the key.
    /// Returns the removed entity, or `None` if the key was already invalid.
    pub fn remove(&mut self, key: ObjectKey) -> Option<T> {
        if !self.is_occupied(key) {
            return None;
        }
        self.notify(EventKind::Removed, key);
        let idx = key.as_raw() as usize;
        let name = self.names[idx].clone();
        self.by_name.remove(&name);
        match std::mem::replace(&mut self.slots[idx], Slot::Tombstone) {
            Slot::Occupied(item) => Some(item),
            Slot::Tombstone => None,
        }
    }

    /// Number of live (non-removed) entities.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(_)))
            .count()
    }

    /// `true` if no live entities remain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(key, &T)` for all live entities, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectKey, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied(item) => Some((ObjectKey::from_raw(i as u32), item)),
            Slot::Tombstone => None,
        })
    }
}

/// The name requested for `add` is already in use in this container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("duplicate name in container: {0}")]
pub struct DuplicateName(pub String);
