//! Generic cell arena with per-scope name maps.
//!
//! Cells live in an append-only arena; deleting a cell leaves a hole so ids
//! are never reused. Each scope owns a name → id map. Adding a name that is
//! already bound rebinds it to the new cell; the old cell stays in the arena
//! and keeps answering to its id.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use stage_ir::{ListId, SpriteId, VariableId};

use crate::Scope;

/// Arena index type of a [`Table`].
pub trait CellId: Copy + Eq + Hash + fmt::Debug {
    fn from_index(index: usize) -> Self;
    fn arena_index(self) -> usize;
}

impl CellId for VariableId {
    #[inline]
    fn from_index(index: usize) -> Self {
        VariableId::new(index as u32)
    }

    #[inline]
    fn arena_index(self) -> usize {
        self.index()
    }
}

impl CellId for ListId {
    #[inline]
    fn from_index(index: usize) -> Self {
        ListId::new(index as u32)
    }

    #[inline]
    fn arena_index(self) -> usize {
        self.index()
    }
}

/// A named storage cell.
#[derive(Clone, Debug)]
pub struct Cell<T> {
    pub name: String,
    pub scope: Scope,
    pub value: T,
}

/// Cells of one kind (variables or lists).
#[derive(Clone, Debug)]
pub struct Table<I, T> {
    cells: Vec<Option<Cell<T>>>,
    project: FxHashMap<String, I>,
    sprites: FxHashMap<SpriteId, FxHashMap<String, I>>,
    clones: FxHashMap<SpriteId, FxHashMap<String, I>>,
}

impl<I, T> Default for Table<I, T> {
    fn default() -> Self {
        Table {
            cells: Vec::new(),
            project: FxHashMap::default(),
            sprites: FxHashMap::default(),
            clones: FxHashMap::default(),
        }
    }
}

impl<I: CellId, T> Table<I, T> {
    fn names(&self, scope: Scope) -> Option<&FxHashMap<String, I>> {
        match scope {
            Scope::Project => Some(&self.project),
            Scope::Sprite(sprite) => self.sprites.get(&sprite),
            Scope::Clone(clone) => self.clones.get(&clone),
        }
    }

    fn names_mut(&mut self, scope: Scope) -> &mut FxHashMap<String, I> {
        match scope {
            Scope::Project => &mut self.project,
            Scope::Sprite(sprite) => self.sprites.entry(sprite).or_default(),
            Scope::Clone(clone) => self.clones.entry(clone).or_default(),
        }
    }

    /// Create a cell and bind `name` to it in `scope`.
    pub fn add(&mut self, scope: Scope, name: &str, value: T) -> I {
        let id = I::from_index(self.cells.len());
        self.cells.push(Some(Cell {
            name: name.to_owned(),
            scope,
            value,
        }));
        self.names_mut(scope).insert(name.to_owned(), id);
        id
    }

    /// Cell currently bound to `name` in exactly `scope`.
    pub fn find(&self, scope: Scope, name: &str) -> Option<I> {
        let id = *self.names(scope)?.get(name)?;
        self.is_alive(id).then_some(id)
    }

    #[inline]
    pub fn is_alive(&self, id: I) -> bool {
        matches!(self.cells.get(id.arena_index()), Some(Some(_)))
    }

    #[inline]
    pub fn cell(&self, id: I) -> Option<&Cell<T>> {
        self.cells.get(id.arena_index())?.as_ref()
    }

    #[inline]
    pub fn cell_mut(&mut self, id: I) -> Option<&mut Cell<T>> {
        self.cells.get_mut(id.arena_index())?.as_mut()
    }

    /// Rebind a cell under a new name within its scope, keeping its id.
    ///
    /// Returns `false` if `new_name` is already bound in that scope.
    pub fn rename(&mut self, id: I, new_name: &str) -> bool {
        let Some(cell) = self.cell(id) else {
            return false;
        };
        let scope = cell.scope;
        let old_name = cell.name.clone();
        if old_name == new_name {
            return true;
        }
        let names = self.names_mut(scope);
        if names.contains_key(new_name) {
            return false;
        }
        if names.get(&old_name) == Some(&id) {
            names.remove(&old_name);
        }
        names.insert(new_name.to_owned(), id);
        if let Some(cell) = self.cell_mut(id) {
            cell.name = new_name.to_owned();
        }
        true
    }

    /// Destroy a cell; its name is unbound if it still pointed at it.
    pub fn remove(&mut self, id: I) -> Option<Cell<T>> {
        let cell = self.cells.get_mut(id.arena_index())?.take()?;
        let names = self.names_mut(cell.scope);
        if names.get(&cell.name) == Some(&id) {
            names.remove(&cell.name);
        }
        Some(cell)
    }

    /// Destroy every cell created in `scope` (bound or superseded).
    pub fn remove_scope(&mut self, scope: Scope) -> usize {
        let mut removed = 0;
        for slot in &mut self.cells {
            if slot.as_ref().is_some_and(|cell| cell.scope == scope) {
                *slot = None;
                removed += 1;
            }
        }
        match scope {
            Scope::Project => self.project.clear(),
            Scope::Sprite(sprite) => {
                self.sprites.remove(&sprite);
            }
            Scope::Clone(clone) => {
                self.clones.remove(&clone);
            }
        }
        removed
    }

    /// Bound `(name, id)` pairs of a scope, in creation order.
    pub fn bound_in(&self, scope: Scope) -> Vec<(&str, I)> {
        let mut entries: Vec<(&str, I)> = self
            .names(scope)
            .into_iter()
            .flat_map(|names| names.iter())
            .filter(|(_, id)| self.is_alive(**id))
            .map(|(name, id)| (name.as_str(), *id))
            .collect();
        entries.sort_by_key(|(_, id)| id.arena_index());
        entries
    }

    /// Sprites that own at least one sprite-local binding, in id order.
    pub fn sprites_with_locals(&self) -> Vec<SpriteId> {
        let mut sprites: Vec<SpriteId> = self
            .sprites
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(sprite, _)| *sprite)
            .collect();
        sprites.sort();
        sprites
    }
}
