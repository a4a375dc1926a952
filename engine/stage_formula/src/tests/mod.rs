//! Evaluator, parser and migrator tests, sharing a small scene fixture.

mod eval_tests;

use stage_ir::{Look, LookData, Polygon, SpriteId};
use stage_store::Store;

use crate::SceneView;

/// One live sprite of the fixture. Clones carry their original's name.
pub(crate) struct TestSprite {
    pub name: String,
    pub look: Look,
}

/// A scene with sprites indexed by `SpriteId` and a store.
#[derive(Default)]
pub(crate) struct TestScene {
    pub sprites: Vec<TestSprite>,
    pub store: Store,
    pub sensors: Vec<(String, f64)>,
}

impl TestScene {
    pub fn add_sprite(&mut self, name: &str, look: Look) -> SpriteId {
        let id = SpriteId::new(self.sprites.len() as u32);
        self.sprites.push(TestSprite {
            name: name.to_owned(),
            look,
        });
        id
    }

    pub fn add_square(&mut self, name: &str, x: f64, y: f64) -> SpriteId {
        let mut look = Look::with_data(LookData {
            name: name.to_owned(),
            width: 100.0,
            height: 100.0,
            collision_polygons: vec![Polygon::rect(0.0, 0.0, 100.0, 100.0)],
        });
        look.set_position(x, y);
        self.add_sprite(name, look)
    }
}

impl SceneView for TestScene {
    fn look(&self, sprite: SpriteId) -> Option<&Look> {
        self.sprites.get(sprite.index()).map(|s| &s.look)
    }

    fn store(&self) -> &Store {
        &self.store
    }

    fn looks_named(&self, name: &str) -> Option<Vec<(SpriteId, &Look)>> {
        let looks: Vec<(SpriteId, &Look)> = self
            .sprites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name == name)
            .map(|(i, s)| (SpriteId::new(i as u32), &s.look))
            .collect();
        (!looks.is_empty()).then_some(looks)
    }

    fn external_sensor(&self, name: &str) -> Option<f64> {
        self.sensors
            .iter()
            .find(|(sensor, _)| sensor == name)
            .map(|(_, value)| *value)
    }
}
