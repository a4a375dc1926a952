//! Live sprites, the store, and the requests raised while stepping.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use stage_actions::{BroadcastTicket, Stage};
use stage_formula::SceneView;
use stage_ir::{Look, Script, SpriteId};
use stage_store::Store;

use crate::external::{NoSensors, SensorProvider};

/// One live sprite. Clones share their original's scripts.
pub(crate) struct SpriteSlot {
    pub name: String,
    pub look: Look,
    pub scripts: Arc<Vec<Script>>,
    /// The original this sprite descends from; itself for originals.
    pub root: SpriteId,
}

/// Delivery state of a broadcast ticket.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TicketState {
    /// Raised, not yet delivered.
    Queued,
    /// Delivered; this many started scripts are still running.
    Running(u32),
}

/// Mutable state shared by every running script.
///
/// Sprite ids index an append-only slot list; removed sprites leave `None`
/// behind so ids are never reused.
pub struct World {
    sprites: Vec<Option<SpriteSlot>>,
    store: Store,
    sensors: Box<dyn SensorProvider>,
    outbox: Vec<(String, BroadcastTicket)>,
    tickets: FxHashMap<BroadcastTicket, TicketState>,
    next_ticket: u64,
    clone_requests: Vec<SpriteId>,
    removal_requests: Vec<SpriteId>,
}

impl Default for World {
    fn default() -> Self {
        World::new(Box::new(NoSensors))
    }
}

impl World {
    pub fn new(sensors: Box<dyn SensorProvider>) -> Self {
        World {
            sprites: Vec::new(),
            store: Store::new(),
            sensors,
            outbox: Vec::new(),
            tickets: FxHashMap::default(),
            next_ticket: 0,
            clone_requests: Vec::new(),
            removal_requests: Vec::new(),
        }
    }

    pub(crate) fn add_sprite(&mut self, name: &str, look: Look, root: Option<SpriteId>) -> SpriteId {
        let id = SpriteId::new(self.sprites.len() as u32);
        self.sprites.push(Some(SpriteSlot {
            name: name.to_owned(),
            look,
            scripts: Arc::new(Vec::new()),
            root: root.unwrap_or(id),
        }));
        id
    }

    pub(crate) fn slot(&self, sprite: SpriteId) -> Option<&SpriteSlot> {
        self.sprites.get(sprite.index())?.as_ref()
    }

    pub(crate) fn slot_mut(&mut self, sprite: SpriteId) -> Option<&mut SpriteSlot> {
        self.sprites.get_mut(sprite.index())?.as_mut()
    }

    pub(crate) fn take_slot(&mut self, sprite: SpriteId) -> Option<SpriteSlot> {
        self.sprites.get_mut(sprite.index())?.take()
    }

    /// Live sprites in creation order.
    pub fn sprites(&self) -> impl Iterator<Item = SpriteId> + '_ {
        self.sprites
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| SpriteId::new(index as u32))
    }

    pub fn name_of(&self, sprite: SpriteId) -> Option<&str> {
        self.slot(sprite).map(|slot| slot.name.as_str())
    }

    pub fn is_alive(&self, sprite: SpriteId) -> bool {
        self.slot(sprite).is_some()
    }

    /// Live clones descending from `original`.
    pub fn clones_of(&self, original: SpriteId) -> Vec<SpriteId> {
        self.sprites()
            .filter(|&id| id != original && self.slot(id).is_some_and(|slot| slot.root == original))
            .collect()
    }

    pub fn clone_count(&self) -> usize {
        self.sprites()
            .filter(|&id| self.slot(id).is_some_and(|slot| slot.root != id))
            .count()
    }

    // Requests

    pub(crate) fn take_outbox(&mut self) -> Vec<(String, BroadcastTicket)> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn take_clone_requests(&mut self) -> Vec<SpriteId> {
        std::mem::take(&mut self.clone_requests)
    }

    pub(crate) fn take_removal_requests(&mut self) -> Vec<SpriteId> {
        std::mem::take(&mut self.removal_requests)
    }

    pub(crate) fn is_pending_removal(&self, sprite: SpriteId) -> bool {
        self.removal_requests.contains(&sprite)
    }

    /// Record that a delivered broadcast started `started` scripts.
    pub(crate) fn ticket_delivered(&mut self, ticket: BroadcastTicket, started: u32) {
        if started == 0 {
            self.tickets.remove(&ticket);
        } else {
            self.tickets.insert(ticket, TicketState::Running(started));
        }
    }

    /// One script started by `ticket` stopped running.
    pub(crate) fn ticket_released(&mut self, ticket: BroadcastTicket) {
        if let Some(TicketState::Running(running)) = self.tickets.get_mut(&ticket) {
            *running -= 1;
            if *running == 0 {
                self.tickets.remove(&ticket);
            }
        }
    }
}

impl SceneView for World {
    fn look(&self, sprite: SpriteId) -> Option<&Look> {
        self.slot(sprite).map(|slot| &slot.look)
    }

    fn store(&self) -> &Store {
        &self.store
    }

    fn looks_named(&self, name: &str) -> Option<Vec<(SpriteId, &Look)>> {
        let original = self.sprite_named(name)?;
        Some(
            self.sprites
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| slot.as_ref().map(|slot| (index, slot)))
                .filter(|(_, slot)| slot.root == original)
                .map(|(index, slot)| (SpriteId::new(index as u32), &slot.look))
                .collect(),
        )
    }

    fn external_sensor(&self, name: &str) -> Option<f64> {
        self.sensors.read(name)
    }
}

impl Stage for World {
    fn look_mut(&mut self, sprite: SpriteId) -> Option<&mut Look> {
        self.slot_mut(sprite).map(|slot| &mut slot.look)
    }

    fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    fn broadcast(&mut self, message: &str) -> BroadcastTicket {
        self.next_ticket += 1;
        let ticket = BroadcastTicket::new(self.next_ticket);
        tracing::debug!(message, ticket = ticket.raw(), "broadcast queued");
        self.outbox.push((message.to_owned(), ticket));
        self.tickets.insert(ticket, TicketState::Queued);
        ticket
    }

    fn broadcast_finished(&self, ticket: BroadcastTicket) -> bool {
        !self.tickets.contains_key(&ticket)
    }

    fn request_clone(&mut self, source: SpriteId) {
        self.clone_requests.push(source);
    }

    fn request_removal(&mut self, sprite: SpriteId) {
        if !self.removal_requests.contains(&sprite) {
            self.removal_requests.push(sprite);
        }
    }

    fn sprite_named(&self, name: &str) -> Option<SpriteId> {
        self.sprites
            .iter()
            .enumerate()
            .find(|(index, slot)| {
                slot.as_ref()
                    .is_some_and(|slot| slot.root.index() == *index && slot.name == name)
            })
            .map(|(index, _)| SpriteId::new(index as u32))
    }

    fn is_clone(&self, sprite: SpriteId) -> bool {
        self.slot(sprite).is_some_and(|slot| slot.root != sprite)
    }
}
