//! Action tests against an in-memory stage.

mod compile_tests;
mod control_tests;

use stage_formula::SceneView;
use stage_ir::{Brick, Look, SpriteId};
use stage_store::Store;

use crate::{compile, BroadcastTicket, Sequence, Stage, StepStatus};

/// Sprites by id (`None` once removed), a store, and a log of requests.
#[derive(Default)]
pub(crate) struct MockStage {
    pub sprites: Vec<Option<(String, Look)>>,
    pub clones: Vec<SpriteId>,
    pub store: Store,
    pub broadcasts: Vec<String>,
    pub finished: Vec<BroadcastTicket>,
    pub clone_requests: Vec<SpriteId>,
    pub removals: Vec<SpriteId>,
}

impl MockStage {
    pub fn add_sprite(&mut self, name: &str) -> SpriteId {
        let id = SpriteId::new(self.sprites.len() as u32);
        self.sprites.push(Some((name.to_owned(), Look::default())));
        id
    }

    pub fn look_of(&self, sprite: SpriteId) -> &Look {
        &self.sprites[sprite.index()].as_ref().unwrap().1
    }

    pub fn edit(&mut self, sprite: SpriteId) -> &mut Look {
        self.look_mut(sprite).unwrap()
    }

    /// Compile one brick for `target` and step it once.
    pub fn run_once(&mut self, brick: &Brick, target: Option<SpriteId>) -> StepStatus {
        let mut sequence = Sequence::new();
        compile(brick, target, &mut sequence);
        sequence.step(0.0, self).unwrap()
    }
}

impl SceneView for MockStage {
    fn look(&self, sprite: SpriteId) -> Option<&Look> {
        self.sprites.get(sprite.index())?.as_ref().map(|(_, look)| look)
    }

    fn store(&self) -> &Store {
        &self.store
    }

    fn looks_named(&self, name: &str) -> Option<Vec<(SpriteId, &Look)>> {
        let looks: Vec<(SpriteId, &Look)> = self
            .sprites
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|(n, look)| (i, n, look)))
            .filter(|(_, n, _)| n.as_str() == name)
            .map(|(i, _, look)| (SpriteId::new(i as u32), look))
            .collect();
        (!looks.is_empty()).then_some(looks)
    }

    fn external_sensor(&self, _name: &str) -> Option<f64> {
        None
    }
}

impl Stage for MockStage {
    fn look_mut(&mut self, sprite: SpriteId) -> Option<&mut Look> {
        self.sprites
            .get_mut(sprite.index())?
            .as_mut()
            .map(|(_, look)| look)
    }

    fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    fn broadcast(&mut self, message: &str) -> BroadcastTicket {
        self.broadcasts.push(message.to_owned());
        BroadcastTicket::new(self.broadcasts.len() as u64)
    }

    fn broadcast_finished(&self, ticket: BroadcastTicket) -> bool {
        self.finished.contains(&ticket)
    }

    fn request_clone(&mut self, source: SpriteId) {
        self.clone_requests.push(source);
    }

    fn request_removal(&mut self, sprite: SpriteId) {
        self.removals.push(sprite);
    }

    fn sprite_named(&self, name: &str) -> Option<SpriteId> {
        self.sprites
            .iter()
            .position(|s| s.as_ref().is_some_and(|(n, _)| n == name))
            .map(|i| SpriteId::new(i as u32))
            .filter(|id| !self.clones.contains(id))
    }

    fn is_clone(&self, sprite: SpriteId) -> bool {
        self.clones.contains(&sprite)
    }
}
