//! Bricks: static, serialisable program instructions.
//!
//! A brick is program text, never execution state. Every kind is one variant
//! of [`Brick`]; control bricks own their nested brick lists directly. The
//! uniform capability set is [`Brick::required_resources`] plus the formula
//! and reference visitors used by migration and reference reconnection.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::formula::Formula;
use crate::ids::{ListId, VariableId};

bitflags! {
    /// Runtime facilities a brick or script needs.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Resources: u8 {
        /// Collision polygons must be tested each tick.
        const COLLISION = 1;
        /// An external sensor provider is read.
        const EXTERNAL_SENSOR = 1 << 1;
    }
}

/// Reference from a brick to a variable cell.
///
/// Only `name` is persisted. `cell` is rebound to the canonical store cell
/// after loading; a bound cell keeps working across renames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarRef {
    pub name: String,
    #[serde(skip)]
    pub cell: Option<VariableId>,
}

impl VarRef {
    pub fn named(name: impl Into<String>) -> Self {
        VarRef {
            name: name.into(),
            cell: None,
        }
    }

    pub fn bound(name: impl Into<String>, cell: VariableId) -> Self {
        VarRef {
            name: name.into(),
            cell: Some(cell),
        }
    }
}

/// Reference from a brick to a list cell. See [`VarRef`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListRef {
    pub name: String,
    #[serde(skip)]
    pub cell: Option<ListId>,
}

impl ListRef {
    pub fn named(name: impl Into<String>) -> Self {
        ListRef {
            name: name.into(),
            cell: None,
        }
    }

    pub fn bound(name: impl Into<String>, cell: ListId) -> Self {
        ListRef {
            name: name.into(),
            cell: Some(cell),
        }
    }
}

/// Mutable view of a cell reference held by a brick.
pub enum CellRefMut<'a> {
    Variable(&'a mut VarRef),
    List(&'a mut ListRef),
}

/// One program instruction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Brick {
    // Motion
    MoveNSteps { steps: Formula },
    ChangeXBy { dx: Formula },
    ChangeYBy { dy: Formula },
    SetX { x: Formula },
    SetY { y: Formula },
    PlaceAt { x: Formula, y: Formula },
    TurnLeft { degrees: Formula },
    TurnRight { degrees: Formula },
    PointInDirection { degrees: Formula },

    // Looks
    SetSize { size: Formula },
    ChangeSizeBy { size: Formula },
    SetTransparency { value: Formula },
    ChangeTransparencyBy { value: Formula },
    SetBrightness { value: Formula },
    ChangeBrightnessBy { value: Formula },
    ClearGraphicEffect,
    Show,
    Hide,

    // Timing
    Wait { seconds: Formula },

    // Data
    SetVariable { variable: VarRef, value: Formula },
    ChangeVariable { variable: VarRef, value: Formula },
    AddItemToList { list: ListRef, item: Formula },
    DeleteItemOfList { list: ListRef, index: Formula },
    InsertItemIntoList { list: ListRef, index: Formula, item: Formula },
    ReplaceItemInList { list: ListRef, index: Formula, item: Formula },

    // Events
    Broadcast { message: String },
    BroadcastWait { message: String },

    // Clones
    /// Clone the named sprite, or the executing sprite when `target` is `None`.
    CloneSprite { target: Option<String> },
    DeleteThisClone,

    // Control
    Repeat { times: Formula, body: Vec<Brick> },
    RepeatUntil { condition: Formula, body: Vec<Brick> },
    Forever { body: Vec<Brick> },
    IfElse {
        condition: Formula,
        then_branch: Vec<Brick>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        else_branch: Option<Vec<Brick>>,
    },
    WaitUntil { condition: Formula },
}

impl Brick {
    /// Short human-readable kind name, used in logs and errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Brick::MoveNSteps { .. } => "move n steps",
            Brick::ChangeXBy { .. } => "change x by",
            Brick::ChangeYBy { .. } => "change y by",
            Brick::SetX { .. } => "set x",
            Brick::SetY { .. } => "set y",
            Brick::PlaceAt { .. } => "place at",
            Brick::TurnLeft { .. } => "turn left",
            Brick::TurnRight { .. } => "turn right",
            Brick::PointInDirection { .. } => "point in direction",
            Brick::SetSize { .. } => "set size",
            Brick::ChangeSizeBy { .. } => "change size by",
            Brick::SetTransparency { .. } => "set transparency",
            Brick::ChangeTransparencyBy { .. } => "change transparency by",
            Brick::SetBrightness { .. } => "set brightness",
            Brick::ChangeBrightnessBy { .. } => "change brightness by",
            Brick::ClearGraphicEffect => "clear graphic effect",
            Brick::Show => "show",
            Brick::Hide => "hide",
            Brick::Wait { .. } => "wait",
            Brick::SetVariable { .. } => "set variable",
            Brick::ChangeVariable { .. } => "change variable",
            Brick::AddItemToList { .. } => "add item to list",
            Brick::DeleteItemOfList { .. } => "delete item of list",
            Brick::InsertItemIntoList { .. } => "insert item into list",
            Brick::ReplaceItemInList { .. } => "replace item in list",
            Brick::Broadcast { .. } => "broadcast",
            Brick::BroadcastWait { .. } => "broadcast and wait",
            Brick::CloneSprite { .. } => "create clone",
            Brick::DeleteThisClone => "delete this clone",
            Brick::Repeat { .. } => "repeat",
            Brick::RepeatUntil { .. } => "repeat until",
            Brick::Forever { .. } => "forever",
            Brick::IfElse { .. } => "if",
            Brick::WaitUntil { .. } => "wait until",
        }
    }

    /// Formula slots of this brick only (nested bricks excluded).
    pub fn formulas(&self) -> Vec<&Formula> {
        match self {
            Brick::MoveNSteps { steps: f }
            | Brick::ChangeXBy { dx: f }
            | Brick::ChangeYBy { dy: f }
            | Brick::SetX { x: f }
            | Brick::SetY { y: f }
            | Brick::TurnLeft { degrees: f }
            | Brick::TurnRight { degrees: f }
            | Brick::PointInDirection { degrees: f }
            | Brick::SetSize { size: f }
            | Brick::ChangeSizeBy { size: f }
            | Brick::SetTransparency { value: f }
            | Brick::ChangeTransparencyBy { value: f }
            | Brick::SetBrightness { value: f }
            | Brick::ChangeBrightnessBy { value: f }
            | Brick::Wait { seconds: f }
            | Brick::SetVariable { value: f, .. }
            | Brick::ChangeVariable { value: f, .. }
            | Brick::AddItemToList { item: f, .. }
            | Brick::DeleteItemOfList { index: f, .. }
            | Brick::Repeat { times: f, .. }
            | Brick::RepeatUntil { condition: f, .. }
            | Brick::IfElse { condition: f, .. }
            | Brick::WaitUntil { condition: f } => vec![f],
            Brick::PlaceAt { x, y } => vec![x, y],
            Brick::InsertItemIntoList { index, item, .. }
            | Brick::ReplaceItemInList { index, item, .. } => vec![index, item],
            Brick::ClearGraphicEffect
            | Brick::Show
            | Brick::Hide
            | Brick::Broadcast { .. }
            | Brick::BroadcastWait { .. }
            | Brick::CloneSprite { .. }
            | Brick::DeleteThisClone
            | Brick::Forever { .. } => Vec::new(),
        }
    }

    fn formulas_mut(&mut self) -> Vec<&mut Formula> {
        match self {
            Brick::MoveNSteps { steps: f }
            | Brick::ChangeXBy { dx: f }
            | Brick::ChangeYBy { dy: f }
            | Brick::SetX { x: f }
            | Brick::SetY { y: f }
            | Brick::TurnLeft { degrees: f }
            | Brick::TurnRight { degrees: f }
            | Brick::PointInDirection { degrees: f }
            | Brick::SetSize { size: f }
            | Brick::ChangeSizeBy { size: f }
            | Brick::SetTransparency { value: f }
            | Brick::ChangeTransparencyBy { value: f }
            | Brick::SetBrightness { value: f }
            | Brick::ChangeBrightnessBy { value: f }
            | Brick::Wait { seconds: f }
            | Brick::SetVariable { value: f, .. }
            | Brick::ChangeVariable { value: f, .. }
            | Brick::AddItemToList { item: f, .. }
            | Brick::DeleteItemOfList { index: f, .. }
            | Brick::Repeat { times: f, .. }
            | Brick::RepeatUntil { condition: f, .. }
            | Brick::IfElse { condition: f, .. }
            | Brick::WaitUntil { condition: f } => vec![f],
            Brick::PlaceAt { x, y } => vec![x, y],
            Brick::InsertItemIntoList { index, item, .. }
            | Brick::ReplaceItemInList { index, item, .. } => vec![index, item],
            Brick::ClearGraphicEffect
            | Brick::Show
            | Brick::Hide
            | Brick::Broadcast { .. }
            | Brick::BroadcastWait { .. }
            | Brick::CloneSprite { .. }
            | Brick::DeleteThisClone
            | Brick::Forever { .. } => Vec::new(),
        }
    }

    /// Nested brick lists owned by a control brick.
    pub fn children(&self) -> Vec<&[Brick]> {
        match self {
            Brick::Repeat { body, .. }
            | Brick::RepeatUntil { body, .. }
            | Brick::Forever { body } => vec![body.as_slice()],
            Brick::IfElse {
                then_branch,
                else_branch,
                ..
            } => {
                let mut lists = vec![then_branch.as_slice()];
                if let Some(else_branch) = else_branch {
                    lists.push(else_branch.as_slice());
                }
                lists
            }
            _ => Vec::new(),
        }
    }

    fn children_mut(&mut self) -> Vec<&mut Vec<Brick>> {
        match self {
            Brick::Repeat { body, .. }
            | Brick::RepeatUntil { body, .. }
            | Brick::Forever { body } => vec![body],
            Brick::IfElse {
                then_branch,
                else_branch,
                ..
            } => {
                let mut lists = vec![then_branch];
                if let Some(else_branch) = else_branch {
                    lists.push(else_branch);
                }
                lists
            }
            _ => Vec::new(),
        }
    }

    /// Visit every formula slot, nested bricks included.
    pub fn for_each_formula(&self, visit: &mut dyn FnMut(&Formula)) {
        for formula in self.formulas() {
            visit(formula);
        }
        for list in self.children() {
            for brick in list {
                brick.for_each_formula(visit);
            }
        }
    }

    /// Visit every formula slot mutably, nested bricks included.
    pub fn for_each_formula_mut(&mut self, visit: &mut dyn FnMut(&mut Formula)) {
        for formula in self.formulas_mut() {
            visit(formula);
        }
        for list in self.children_mut() {
            for brick in list.iter_mut() {
                brick.for_each_formula_mut(visit);
            }
        }
    }

    /// Visit every variable/list reference held by this brick and its children.
    pub fn for_each_reference_mut(&mut self, visit: &mut dyn FnMut(CellRefMut<'_>)) {
        match self {
            Brick::SetVariable { variable, .. } | Brick::ChangeVariable { variable, .. } => {
                visit(CellRefMut::Variable(variable));
            }
            Brick::AddItemToList { list, .. }
            | Brick::DeleteItemOfList { list, .. }
            | Brick::InsertItemIntoList { list, .. }
            | Brick::ReplaceItemInList { list, .. } => visit(CellRefMut::List(list)),
            _ => {}
        }
        for list in self.children_mut() {
            for brick in list.iter_mut() {
                brick.for_each_reference_mut(visit);
            }
        }
    }

    /// Union of the resources needed by every formula in this brick.
    pub fn required_resources(&self) -> Resources {
        let mut resources = Resources::empty();
        self.for_each_formula(&mut |formula| resources |= formula.required_resources());
        resources
    }
}
