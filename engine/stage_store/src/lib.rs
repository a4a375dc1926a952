//! Stage Store - scoped variable and list storage.
//!
//! Every variable or list cell lives in exactly one scope:
//! - `Project`: shared by all sprites
//! - `Sprite`: owned by one original sprite
//! - `Clone`: owned by one clone, copied from its source at clone time
//!
//! Name resolution for a sprite walks clone-local → sprite-local →
//! project-global. Cells are identified by arena ids, so bricks holding an id
//! survive renames; a deleted cell's id dereferences to `None`.

use std::fmt;

use stage_ir::SpriteId;

mod store;
mod table;

pub use store::Store;
pub use table::{Cell, CellId, Table};

/// Scope a cell lives in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Project,
    Sprite(SpriteId),
    Clone(SpriteId),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Project => f.write_str("project scope"),
            Scope::Sprite(id) => write!(f, "scope of sprite #{}", id.raw()),
            Scope::Clone(id) => write!(f, "scope of clone #{}", id.raw()),
        }
    }
}

/// Which table a cell belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    Variable,
    List,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CellKind::Variable => "variable",
            CellKind::List => "list",
        })
    }
}

/// Store operation failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} `{name}` already exists in {scope}")]
    NameTaken {
        kind: CellKind,
        name: String,
        scope: Scope,
    },
    #[error("no {kind} named `{name}` in {scope}")]
    UnknownName {
        kind: CellKind,
        name: String,
        scope: Scope,
    },
    #[error("{kind} cell #{index} no longer exists")]
    DeadCell { kind: CellKind, index: usize },
}
