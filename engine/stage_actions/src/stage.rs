//! Mutable execution context handed to actions.

use stage_formula::SceneView;
use stage_ir::{Look, SpriteId};
use stage_store::Store;

/// Handle for a broadcast raised by "broadcast and wait".
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BroadcastTicket(u64);

impl BroadcastTicket {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        BroadcastTicket(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// What a stepping action may read and change.
///
/// Structural changes (broadcast delivery, clone creation, removal) are
/// requests; the scheduler applies them at fixed points of the tick so that
/// stepping order stays deterministic.
pub trait Stage: SceneView {
    fn look_mut(&mut self, sprite: SpriteId) -> Option<&mut Look>;

    fn store_mut(&mut self) -> &mut Store;

    /// Queue `message` for delivery at the start of the next tick.
    fn broadcast(&mut self, message: &str) -> BroadcastTicket;

    /// Whether every script started by the ticket's broadcast has stopped
    /// running. `false` while the broadcast is still undelivered.
    fn broadcast_finished(&self, ticket: BroadcastTicket) -> bool;

    /// Create a clone of `source` at the end of the current tick.
    fn request_clone(&mut self, source: SpriteId);

    /// Remove a clone: its scripts are cancelled and its cells purged.
    fn request_removal(&mut self, sprite: SpriteId);

    /// Live original sprite with this name.
    fn sprite_named(&self, name: &str) -> Option<SpriteId>;

    fn is_clone(&self, sprite: SpriteId) -> bool;
}
