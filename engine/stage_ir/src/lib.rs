//! Stage IR - program model for the sprite scripting engine.
//!
//! This crate holds the static, serialisable side of a program:
//! - Typed ids for sprites and store cells
//! - Geometry and looks (pose, graphic effects, collision polygons)
//! - Formula expression trees and their canonical text rendering
//! - Bricks, scripts and sprite definitions
//! - The persisted project/scene shape
//!
//! Nothing here executes. Evaluation, compilation to actions and scheduling
//! live in the crates layered on top.

pub mod brick;
pub mod formula;
pub mod geometry;
mod ids;
pub mod look;
pub mod scene;
pub mod script;
mod value;

pub use brick::{Brick, CellRefMut, ListRef, Resources, VarRef};
pub use formula::{BinaryOp, Formula, FormulaNode, Function, Sensor, UnaryOp};
pub use geometry::{BoundingBox, Point, Polygon};
pub use ids::{ListId, SpriteId, VariableId};
pub use look::{Look, LookData};
pub use scene::{
    ListEntry, ProjectFile, SceneFile, SpriteLocals, StageSize, StoreSnapshot, VariableEntry,
    COLLISION_SYNTAX_VERSION, CURRENT_LANGUAGE_VERSION,
};
pub use script::{Script, SpriteDef, Trigger};
pub use value::{format_number, Value};
