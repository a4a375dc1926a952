//! The scoped store: a variable table, a list table, and clone ancestry.

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use stage_ir::{ListId, SpriteId, Value, VariableId};

use crate::table::{CellId, Table};
use crate::{CellKind, Scope, StoreError};

type ScopeChain = SmallVec<[Scope; 3]>;

/// Variables and lists of a running scene.
#[derive(Clone, Debug, Default)]
pub struct Store {
    variables: Table<VariableId, Value>,
    lists: Table<ListId, Vec<Value>>,
    /// Clone → original sprite whose sprite-local scope it falls back to.
    clone_roots: FxHashMap<SpriteId, SpriteId>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    // Scopes

    /// Original sprite a clone descends from (the sprite itself otherwise).
    pub fn root_of(&self, sprite: SpriteId) -> SpriteId {
        self.clone_roots.get(&sprite).copied().unwrap_or(sprite)
    }

    #[inline]
    pub fn is_clone(&self, sprite: SpriteId) -> bool {
        self.clone_roots.contains_key(&sprite)
    }

    /// Scopes searched for `sprite`, nearest first.
    pub fn scope_chain(&self, sprite: SpriteId) -> ScopeChain {
        match self.clone_roots.get(&sprite) {
            Some(root) => smallvec![Scope::Clone(sprite), Scope::Sprite(*root), Scope::Project],
            None => smallvec![Scope::Sprite(sprite), Scope::Project],
        }
    }

    fn resolve<I: CellId, T>(&self, table: &Table<I, T>, sprite: SpriteId, name: &str) -> Option<I> {
        self.scope_chain(sprite)
            .into_iter()
            .find_map(|scope| table.find(scope, name))
    }

    // Adding

    pub fn add_project_variable(&mut self, name: &str) -> VariableId {
        tracing::debug!(name, "add project variable");
        self.variables.add(Scope::Project, name, Value::default())
    }

    pub fn add_sprite_variable(&mut self, sprite: SpriteId, name: &str) -> VariableId {
        tracing::debug!(name, sprite = sprite.raw(), "add sprite variable");
        self.variables.add(Scope::Sprite(sprite), name, Value::default())
    }

    pub fn add_project_list(&mut self, name: &str) -> ListId {
        tracing::debug!(name, "add project list");
        self.lists.add(Scope::Project, name, Vec::new())
    }

    pub fn add_sprite_list(&mut self, sprite: SpriteId, name: &str) -> ListId {
        tracing::debug!(name, sprite = sprite.raw(), "add sprite list");
        self.lists.add(Scope::Sprite(sprite), name, Vec::new())
    }

    /// Give `clone` its own copy of every local cell visible to `source`.
    ///
    /// When `source` is itself a clone, its clone-local cells shadow its
    /// root's sprite-local cells of the same name. Values are copied as they
    /// are right now; afterwards the two sets evolve independently.
    pub fn register_clone(&mut self, clone: SpriteId, source: SpriteId) {
        let root = self.root_of(source);
        self.clone_roots.insert(clone, root);

        let variables = visible_locals(&self.variables, root, source, self.is_clone(source));
        for (name, value) in variables {
            self.variables.add(Scope::Clone(clone), &name, value);
        }
        let lists = visible_locals(&self.lists, root, source, self.is_clone(source));
        for (name, items) in lists {
            self.lists.add(Scope::Clone(clone), &name, items);
        }
        tracing::debug!(
            clone = clone.raw(),
            source = source.raw(),
            root = root.raw(),
            "registered clone-local cells"
        );
    }

    /// Destroy every clone-local cell of `clone` and forget its ancestry.
    pub fn remove_clone(&mut self, clone: SpriteId) {
        let variables = self.variables.remove_scope(Scope::Clone(clone));
        let lists = self.lists.remove_scope(Scope::Clone(clone));
        self.clone_roots.remove(&clone);
        tracing::debug!(clone = clone.raw(), variables, lists, "purged clone-local cells");
    }

    /// Destroy every sprite-local cell of an original sprite.
    pub fn remove_sprite(&mut self, sprite: SpriteId) {
        self.variables.remove_scope(Scope::Sprite(sprite));
        self.lists.remove_scope(Scope::Sprite(sprite));
    }

    // Lookup

    /// Resolve a variable name for `sprite`: clone-local, sprite-local, project.
    pub fn lookup_variable(&self, sprite: SpriteId, name: &str) -> Option<VariableId> {
        self.resolve(&self.variables, sprite, name)
    }

    /// Resolve a list name for `sprite`: clone-local, sprite-local, project.
    pub fn lookup_list(&self, sprite: SpriteId, name: &str) -> Option<ListId> {
        self.resolve(&self.lists, sprite, name)
    }

    pub fn find_project_variable(&self, name: &str) -> Option<VariableId> {
        self.variables.find(Scope::Project, name)
    }

    pub fn find_sprite_variable(&self, sprite: SpriteId, name: &str) -> Option<VariableId> {
        self.variables.find(Scope::Sprite(sprite), name)
    }

    pub fn find_clone_variable(&self, clone: SpriteId, name: &str) -> Option<VariableId> {
        self.variables.find(Scope::Clone(clone), name)
    }

    pub fn find_project_list(&self, name: &str) -> Option<ListId> {
        self.lists.find(Scope::Project, name)
    }

    pub fn find_sprite_list(&self, sprite: SpriteId, name: &str) -> Option<ListId> {
        self.lists.find(Scope::Sprite(sprite), name)
    }

    pub fn find_clone_list(&self, clone: SpriteId, name: &str) -> Option<ListId> {
        self.lists.find(Scope::Clone(clone), name)
    }

    /// Cell `sprite` should use for a reference bound to `id`.
    ///
    /// Bricks are shared between an original and its clones, and bind to the
    /// original's sprite-local cells. A clone executing such a brick is
    /// redirected to its own clone-local cell of the same (current) name.
    /// Returns `None` if the bound cell has been deleted.
    pub fn resolve_variable_for(&self, sprite: SpriteId, id: VariableId) -> Option<VariableId> {
        resolve_for(&self.variables, &self.clone_roots, sprite, id)
    }

    /// List counterpart of [`Store::resolve_variable_for`].
    pub fn resolve_list_for(&self, sprite: SpriteId, id: ListId) -> Option<ListId> {
        resolve_for(&self.lists, &self.clone_roots, sprite, id)
    }

    // Renaming

    /// Rename the variable `current` of `scope` to `new_name`, keeping its id.
    pub fn rename_variable(
        &mut self,
        scope: Scope,
        current: &str,
        new_name: &str,
    ) -> Result<VariableId, StoreError> {
        rename_in(&mut self.variables, CellKind::Variable, scope, current, new_name)
    }

    /// Rename the list `current` of `scope` to `new_name`, keeping its id.
    pub fn rename_list(
        &mut self,
        scope: Scope,
        current: &str,
        new_name: &str,
    ) -> Result<ListId, StoreError> {
        rename_in(&mut self.lists, CellKind::List, scope, current, new_name)
    }

    // Deleting

    /// Delete the nearest variable named `name` as seen from `context`
    /// (project scope only when `context` is `None`).
    pub fn delete_variable_by_name(
        &mut self,
        context: Option<SpriteId>,
        name: &str,
    ) -> Option<VariableId> {
        let id = match context {
            Some(sprite) => self.lookup_variable(sprite, name)?,
            None => self.find_project_variable(name)?,
        };
        self.variables.remove(id)?;
        tracing::debug!(name, "deleted variable");
        Some(id)
    }

    /// List counterpart of [`Store::delete_variable_by_name`].
    pub fn delete_list_by_name(&mut self, context: Option<SpriteId>, name: &str) -> Option<ListId> {
        let id = match context {
            Some(sprite) => self.lookup_list(sprite, name)?,
            None => self.find_project_list(name)?,
        };
        self.lists.remove(id)?;
        tracing::debug!(name, "deleted list");
        Some(id)
    }

    // Values

    pub fn variable(&self, id: VariableId) -> Option<&Value> {
        self.variables.cell(id).map(|cell| &cell.value)
    }

    pub fn variable_name(&self, id: VariableId) -> Option<&str> {
        self.variables.cell(id).map(|cell| cell.name.as_str())
    }

    pub fn variable_scope(&self, id: VariableId) -> Option<Scope> {
        self.variables.cell(id).map(|cell| cell.scope)
    }

    /// Replace a variable's value.
    pub fn set_variable(&mut self, id: VariableId, value: Value) -> Result<(), StoreError> {
        let cell = self.variables.cell_mut(id).ok_or(StoreError::DeadCell {
            kind: CellKind::Variable,
            index: id.index(),
        })?;
        cell.value = value;
        Ok(())
    }

    pub fn list(&self, id: ListId) -> Option<&[Value]> {
        self.lists.cell(id).map(|cell| cell.value.as_slice())
    }

    pub fn list_name(&self, id: ListId) -> Option<&str> {
        self.lists.cell(id).map(|cell| cell.name.as_str())
    }

    pub fn list_mut(&mut self, id: ListId) -> Option<&mut Vec<Value>> {
        self.lists.cell_mut(id).map(|cell| &mut cell.value)
    }

    /// Replace a list's items.
    pub fn set_list(&mut self, id: ListId, items: Vec<Value>) -> Result<(), StoreError> {
        let items_slot = self.list_mut(id).ok_or(StoreError::DeadCell {
            kind: CellKind::List,
            index: id.index(),
        })?;
        *items_slot = items;
        Ok(())
    }

    // Enumeration

    /// Bound variables of a scope as `(name, value)`, in creation order.
    pub fn variables_in(&self, scope: Scope) -> Vec<(&str, &Value)> {
        self.variables
            .bound_in(scope)
            .into_iter()
            .filter_map(|(name, id)| Some((name, self.variable(id)?)))
            .collect()
    }

    /// Bound lists of a scope as `(name, items)`, in creation order.
    pub fn lists_in(&self, scope: Scope) -> Vec<(&str, &[Value])> {
        self.lists
            .bound_in(scope)
            .into_iter()
            .filter_map(|(name, id)| Some((name, self.list(id)?)))
            .collect()
    }

    /// Original sprites owning sprite-local cells, in id order.
    pub fn sprites_with_locals(&self) -> Vec<SpriteId> {
        let mut sprites = self.variables.sprites_with_locals();
        for sprite in self.lists.sprites_with_locals() {
            if !sprites.contains(&sprite) {
                sprites.push(sprite);
            }
        }
        sprites.sort();
        sprites
    }
}

fn visible_locals<I: CellId, T: Clone>(
    table: &Table<I, T>,
    root: SpriteId,
    source: SpriteId,
    source_is_clone: bool,
) -> Vec<(String, T)> {
    let mut locals: Vec<(String, T)> = Vec::new();
    for (name, id) in table.bound_in(Scope::Sprite(root)) {
        let id = if source_is_clone {
            table.find(Scope::Clone(source), name).unwrap_or(id)
        } else {
            id
        };
        if let Some(cell) = table.cell(id) {
            locals.push((name.to_owned(), cell.value.clone()));
        }
    }
    if source_is_clone {
        for (name, id) in table.bound_in(Scope::Clone(source)) {
            if locals.iter().any(|(existing, _)| existing == name) {
                continue;
            }
            if let Some(cell) = table.cell(id) {
                locals.push((name.to_owned(), cell.value.clone()));
            }
        }
    }
    locals
}

fn resolve_for<I: CellId, T>(
    table: &Table<I, T>,
    clone_roots: &FxHashMap<SpriteId, SpriteId>,
    sprite: SpriteId,
    id: I,
) -> Option<I> {
    let cell = table.cell(id)?;
    match (cell.scope, clone_roots.get(&sprite)) {
        (Scope::Sprite(owner), Some(root)) if owner == *root => {
            Some(table.find(Scope::Clone(sprite), &cell.name).unwrap_or(id))
        }
        _ => Some(id),
    }
}

fn rename_in<I: CellId, T>(
    table: &mut Table<I, T>,
    kind: CellKind,
    scope: Scope,
    current: &str,
    new_name: &str,
) -> Result<I, StoreError> {
    let id = table.find(scope, current).ok_or_else(|| StoreError::UnknownName {
        kind,
        name: current.to_owned(),
        scope,
    })?;
    if !table.rename(id, new_name) {
        return Err(StoreError::NameTaken {
            kind,
            name: new_name.to_owned(),
            scope,
        });
    }
    tracing::debug!(%kind, from = current, to = new_name, %scope, "renamed cell");
    Ok(id)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
