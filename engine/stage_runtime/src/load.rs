//! Loading persisted projects and writing them back.
//!
//! Bricks persist cell references by name only. Loading runs in two passes
//! once legacy formulas are migrated: the store is rebuilt from the snapshot,
//! then every brick reference is bound to the cell its sprite resolves the
//! name to. A name nothing resolves is a corrupt project, reported before any
//! script is instantiated.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use stage_actions::Stage;
use stage_formula::{migrate_project, MigrationReport};
use stage_ir::{
    CellRefMut, ListEntry, ProjectFile, SceneFile, Script, SpriteDef, SpriteId, SpriteLocals,
    StoreSnapshot, VariableEntry, CURRENT_LANGUAGE_VERSION,
};
use stage_store::{CellKind, Scope, Store, StoreError};

use crate::builder::RuntimeBuilder;
use crate::scheduler::Runtime;

/// Why a project could not be loaded.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    #[error("sprite name `{name}` is used more than once")]
    DuplicateSprite { name: String },
    #[error("local data declared for unknown sprite `{sprite}`")]
    UnknownSprite { sprite: String },
    #[error("{kind} `{name}` is declared twice in {owner}")]
    DuplicateCell {
        kind: CellKind,
        name: String,
        owner: String,
    },
    #[error("a brick of sprite `{sprite}` refers to missing {kind} `{name}`")]
    DanglingReference {
        sprite: String,
        kind: CellKind,
        name: String,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A loaded project ready to tick.
pub struct Loaded {
    pub runtime: Runtime,
    /// What legacy migration did; clean for current projects.
    pub migration: MigrationReport,
}

/// Migrate, rebuild and reconnect a persisted project.
pub fn load_project(mut project: ProjectFile, builder: RuntimeBuilder) -> Result<Loaded, LoadError> {
    let migration = migrate_project(&mut project);
    let ProjectFile { stage, scene, .. } = project;
    let SceneFile {
        name,
        sprites,
        data,
    } = scene;
    let mut runtime = builder.stage(stage).scene_name(name).build();

    let mut ids: FxHashMap<String, SpriteId> = FxHashMap::default();
    let mut order = Vec::with_capacity(sprites.len());
    for def in &sprites {
        if ids.contains_key(&def.name) {
            return Err(LoadError::DuplicateSprite {
                name: def.name.clone(),
            });
        }
        let id = runtime.world.add_sprite(&def.name, def.look.clone(), None);
        ids.insert(def.name.clone(), id);
        order.push(id);
    }

    restore_store(runtime.store_mut(), &data, &ids)?;

    let mut bound = Vec::with_capacity(sprites.len());
    for (def, id) in sprites.into_iter().zip(order) {
        let SpriteDef {
            name, mut scripts, ..
        } = def;
        bind_references(runtime.store(), id, &name, &mut scripts)?;
        bound.push((id, scripts));
    }
    for (id, scripts) in bound {
        runtime.install_scripts(id, Arc::new(scripts));
    }

    tracing::debug!(
        sprites = ids.len(),
        migrated = migration.migrated,
        issues = migration.issues.len(),
        "project loaded"
    );
    Ok(Loaded { runtime, migration })
}

fn restore_store(
    store: &mut Store,
    data: &StoreSnapshot,
    sprites: &FxHashMap<String, SpriteId>,
) -> Result<(), LoadError> {
    let project = "the project";
    for entry in &data.project_variables {
        if store.find_project_variable(&entry.name).is_some() {
            return Err(duplicate(CellKind::Variable, &entry.name, project));
        }
        let id = store.add_project_variable(&entry.name);
        store.set_variable(id, entry.value.clone())?;
    }
    for entry in &data.project_lists {
        if store.find_project_list(&entry.name).is_some() {
            return Err(duplicate(CellKind::List, &entry.name, project));
        }
        let id = store.add_project_list(&entry.name);
        store.set_list(id, entry.items.clone())?;
    }

    for locals in &data.sprite_locals {
        let Some(&sprite) = sprites.get(&locals.sprite) else {
            return Err(LoadError::UnknownSprite {
                sprite: locals.sprite.clone(),
            });
        };
        let owner = format!("sprite `{}`", locals.sprite);
        for entry in &locals.variables {
            if store.find_sprite_variable(sprite, &entry.name).is_some() {
                return Err(duplicate(CellKind::Variable, &entry.name, &owner));
            }
            let id = store.add_sprite_variable(sprite, &entry.name);
            store.set_variable(id, entry.value.clone())?;
        }
        for entry in &locals.lists {
            if store.find_sprite_list(sprite, &entry.name).is_some() {
                return Err(duplicate(CellKind::List, &entry.name, &owner));
            }
            let id = store.add_sprite_list(sprite, &entry.name);
            store.set_list(id, entry.items.clone())?;
        }
    }
    Ok(())
}

fn duplicate(kind: CellKind, name: &str, owner: &str) -> LoadError {
    LoadError::DuplicateCell {
        kind,
        name: name.to_owned(),
        owner: owner.to_owned(),
    }
}

/// Bind every brick reference of `scripts` to the cell `sprite` sees.
fn bind_references(
    store: &Store,
    sprite: SpriteId,
    sprite_name: &str,
    scripts: &mut [Script],
) -> Result<(), LoadError> {
    let mut dangling: Option<(CellKind, String)> = None;
    let mut bind = |reference: CellRefMut<'_>| {
        if dangling.is_some() {
            return;
        }
        // An empty name is a reference with no cell selected.
        match reference {
            CellRefMut::Variable(variable) if variable.name.is_empty() => variable.cell = None,
            CellRefMut::List(list) if list.name.is_empty() => list.cell = None,
            CellRefMut::Variable(variable) => match store.lookup_variable(sprite, &variable.name) {
                Some(id) => variable.cell = Some(id),
                None => dangling = Some((CellKind::Variable, variable.name.clone())),
            },
            CellRefMut::List(list) => match store.lookup_list(sprite, &list.name) {
                Some(id) => list.cell = Some(id),
                None => dangling = Some((CellKind::List, list.name.clone())),
            },
        }
    };
    for brick in scripts.iter_mut().flat_map(|script| script.bricks.iter_mut()) {
        brick.for_each_reference_mut(&mut bind);
    }

    match dangling {
        Some((kind, name)) => Err(LoadError::DanglingReference {
            sprite: sprite_name.to_owned(),
            kind,
            name,
        }),
        None => Ok(()),
    }
}

impl Runtime {
    /// Persistable shape of the running scene.
    ///
    /// Original sprites are written with their current looks; clones are
    /// transient and omitted. Brick references bound to a renamed cell are
    /// written under the cell's current name; references whose cell has been
    /// deleted are written with an empty name, so the snapshot reloads with
    /// them unselected.
    pub fn snapshot(&self) -> ProjectFile {
        let store = self.store();
        let originals: Vec<SpriteId> = self
            .world
            .sprites()
            .filter(|&id| !self.world.is_clone(id))
            .collect();

        let mut sprites = Vec::with_capacity(originals.len());
        let mut sprite_locals = Vec::new();
        for &id in &originals {
            let Some(slot) = self.world.slot(id) else {
                continue;
            };
            let mut scripts: Vec<Script> = slot.scripts.as_ref().clone();
            refresh_reference_names(store, &mut scripts);
            sprites.push(SpriteDef {
                name: slot.name.clone(),
                look: slot.look.clone(),
                scripts,
            });

            let locals = SpriteLocals {
                sprite: slot.name.clone(),
                variables: variable_entries(store, Scope::Sprite(id)),
                lists: list_entries(store, Scope::Sprite(id)),
            };
            if !locals.variables.is_empty() || !locals.lists.is_empty() {
                sprite_locals.push(locals);
            }
        }

        ProjectFile {
            language_version: CURRENT_LANGUAGE_VERSION,
            stage: self.stage,
            scene: SceneFile {
                name: self.scene_name.clone(),
                sprites,
                data: StoreSnapshot {
                    project_variables: variable_entries(store, Scope::Project),
                    project_lists: list_entries(store, Scope::Project),
                    sprite_locals,
                },
            },
        }
    }
}

fn refresh_reference_names(store: &Store, scripts: &mut [Script]) {
    let mut refresh = |reference: CellRefMut<'_>| match reference {
        CellRefMut::Variable(variable) => {
            if let Some(id) = variable.cell {
                let name = store.variable_name(id).unwrap_or_default();
                name.clone_into(&mut variable.name);
            }
        }
        CellRefMut::List(list) => {
            if let Some(id) = list.cell {
                let name = store.list_name(id).unwrap_or_default();
                name.clone_into(&mut list.name);
            }
        }
    };
    for brick in scripts.iter_mut().flat_map(|script| script.bricks.iter_mut()) {
        brick.for_each_reference_mut(&mut refresh);
    }
}

fn variable_entries(store: &Store, scope: Scope) -> Vec<VariableEntry> {
    store
        .variables_in(scope)
        .into_iter()
        .map(|(name, value)| VariableEntry {
            name: name.to_owned(),
            value: value.clone(),
        })
        .collect()
}

fn list_entries(store: &Store, scope: Scope) -> Vec<ListEntry> {
    store
        .lists_in(scope)
        .into_iter()
        .map(|(name, items)| ListEntry {
            name: name.to_owned(),
            items: items.to_vec(),
        })
        .collect()
}
