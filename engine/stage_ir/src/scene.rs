//! Persisted shape of a project.
//!
//! Cross references (brick → variable/list cell) are stored by name only;
//! loaders rebuild the store from [`StoreSnapshot`] and then rebind every
//! reference before any script runs.

use serde::{Deserialize, Serialize};

use crate::script::SpriteDef;
use crate::value::Value;

/// Language version that introduced `collision(<sprite>)` with a single,
/// explicit target.
pub const COLLISION_SYNTAX_VERSION: f64 = 0.993;

/// Language version written by this engine.
pub const CURRENT_LANGUAGE_VERSION: f64 = 0.993;

/// A whole project file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub language_version: f64,
    #[serde(default)]
    pub stage: StageSize,
    pub scene: SceneFile,
}

impl ProjectFile {
    pub fn new(scene: SceneFile) -> Self {
        ProjectFile {
            language_version: CURRENT_LANGUAGE_VERSION,
            stage: StageSize::default(),
            scene,
        }
    }

    pub fn needs_collision_migration(&self) -> bool {
        self.language_version < COLLISION_SYNTAX_VERSION
    }
}

/// Virtual stage dimensions handed to the physics collaborator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSize {
    pub width: u32,
    pub height: u32,
}

impl Default for StageSize {
    fn default() -> Self {
        StageSize {
            width: 480,
            height: 800,
        }
    }
}

/// A scene: `{ name, sprites, data }`, in that order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub name: String,
    #[serde(default)]
    pub sprites: Vec<SpriteDef>,
    #[serde(default)]
    pub data: StoreSnapshot,
}

impl SceneFile {
    pub fn new(name: impl Into<String>) -> Self {
        SceneFile {
            name: name.into(),
            ..SceneFile::default()
        }
    }

    pub fn sprite_names(&self) -> Vec<&str> {
        self.sprites.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Persisted variables and lists, grouped by scope.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub project_variables: Vec<VariableEntry>,
    #[serde(default)]
    pub project_lists: Vec<ListEntry>,
    /// Sprite-local cells, keyed by sprite name.
    #[serde(default)]
    pub sprite_locals: Vec<SpriteLocals>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableEntry {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpriteLocals {
    pub sprite: String,
    #[serde(default)]
    pub variables: Vec<VariableEntry>,
    #[serde(default)]
    pub lists: Vec<ListEntry>,
}
