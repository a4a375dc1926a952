use pretty_assertions::assert_eq;

use super::*;

const CAT: SpriteId = SpriteId::new(0);
const DOG: SpriteId = SpriteId::new(1);
const CAT_CLONE: SpriteId = SpriteId::new(7);

#[test]
fn test_lookup_prefers_sprite_over_project() {
    let mut store = Store::new();
    let global = store.add_project_variable("score");
    let local = store.add_sprite_variable(CAT, "score");

    assert_eq!(store.lookup_variable(CAT, "score"), Some(local));
    assert_eq!(store.lookup_variable(DOG, "score"), Some(global));
    assert_eq!(store.lookup_variable(DOG, "missing"), None);
}

#[test]
fn test_re_adding_a_list_rebinds_the_name() {
    let mut store = Store::new();
    let first = store.add_project_list("items");
    store.set_list(first, vec![Value::from("old")]).unwrap();

    let second = store.add_project_list("items");
    store.set_list(second, vec![Value::from("new")]).unwrap();

    assert_eq!(store.find_project_list("items"), Some(second));
    assert_eq!(store.list(second), Some(&[Value::from("new")][..]));
    // The superseded cell still answers to its id.
    assert_eq!(store.list(first), Some(&[Value::from("old")][..]));
}

#[test]
fn test_re_adding_a_variable_rebinds_the_name() {
    let mut store = Store::new();
    let first = store.add_sprite_variable(CAT, "x");
    let second = store.add_sprite_variable(CAT, "x");
    assert_ne!(first, second);
    assert_eq!(store.lookup_variable(CAT, "x"), Some(second));
}

#[test]
fn test_rename_keeps_identity() {
    let mut store = Store::new();
    let id = store.add_project_variable("old");
    store.set_variable(id, Value::Number(3.0)).unwrap();

    let renamed = store.rename_variable(Scope::Project, "old", "new");
    assert_eq!(renamed, Ok(id));
    assert_eq!(store.find_project_variable("old"), None);
    assert_eq!(store.find_project_variable("new"), Some(id));
    assert_eq!(store.variable_name(id), Some("new"));
    assert_eq!(store.variable(id), Some(&Value::Number(3.0)));
}

#[test]
fn test_rename_only_touches_its_scope() {
    let mut store = Store::new();
    let global = store.add_project_variable("hp");
    let local = store.add_sprite_variable(CAT, "hp");

    store.rename_variable(Scope::Sprite(CAT), "hp", "health").unwrap();

    assert_eq!(store.variable_name(global), Some("hp"));
    assert_eq!(store.variable_name(local), Some("health"));
    assert_eq!(store.lookup_variable(CAT, "hp"), Some(global));
    assert_eq!(store.lookup_variable(CAT, "health"), Some(local));
}

#[test]
fn test_rename_onto_taken_name_fails() {
    let mut store = Store::new();
    store.add_project_list("a");
    store.add_project_list("b");

    let err = store.rename_list(Scope::Project, "a", "b");
    assert_eq!(
        err,
        Err(StoreError::NameTaken {
            kind: CellKind::List,
            name: "b".to_owned(),
            scope: Scope::Project,
        })
    );
}

#[test]
fn test_rename_unknown_name_fails() {
    let mut store = Store::new();
    let err = store.rename_variable(Scope::Sprite(DOG), "ghost", "spirit");
    assert!(matches!(err, Err(StoreError::UnknownName { .. })));
}

#[test]
fn test_delete_removes_nearest_scope() {
    let mut store = Store::new();
    let global = store.add_project_variable("v");
    let local = store.add_sprite_variable(CAT, "v");

    assert_eq!(store.delete_variable_by_name(Some(CAT), "v"), Some(local));
    assert_eq!(store.variable(local), None);
    assert_eq!(store.lookup_variable(CAT, "v"), Some(global));

    assert_eq!(store.delete_variable_by_name(None, "v"), Some(global));
    assert_eq!(store.lookup_variable(CAT, "v"), None);
    assert_eq!(store.delete_variable_by_name(None, "v"), None);
}

#[test]
fn test_set_on_deleted_cell_reports_dead_cell() {
    let mut store = Store::new();
    let id = store.add_project_variable("gone");
    store.delete_variable_by_name(None, "gone");

    let err = store.set_variable(id, Value::Bool(true));
    assert!(matches!(err, Err(StoreError::DeadCell { kind: CellKind::Variable, .. })));
}

#[test]
fn test_clone_gets_independent_copies() {
    let mut store = Store::new();
    let var = store.add_sprite_variable(CAT, "lives");
    let list = store.add_sprite_list(CAT, "bag");
    store.set_variable(var, Value::Number(3.0)).unwrap();
    store.set_list(list, vec![Value::from("key")]).unwrap();

    store.register_clone(CAT_CLONE, CAT);
    assert!(store.is_clone(CAT_CLONE));
    assert_eq!(store.root_of(CAT_CLONE), CAT);

    let clone_var = store.lookup_variable(CAT_CLONE, "lives").unwrap();
    assert_ne!(clone_var, var);
    assert_eq!(store.variable(clone_var), Some(&Value::Number(3.0)));

    store.set_variable(clone_var, Value::Number(1.0)).unwrap();
    assert_eq!(store.variable(var), Some(&Value::Number(3.0)));

    let clone_list = store.lookup_list(CAT_CLONE, "bag");
    assert!(clone_list.is_some_and(|id| id != list));
}

#[test]
fn test_clone_of_clone_inherits_clone_values() {
    let mut store = Store::new();
    let var = store.add_sprite_variable(CAT, "n");
    store.register_clone(CAT_CLONE, CAT);
    let first = store.find_clone_variable(CAT_CLONE, "n").unwrap();
    store.set_variable(first, Value::Number(5.0)).unwrap();

    let grandchild = SpriteId::new(8);
    store.register_clone(grandchild, CAT_CLONE);
    assert_eq!(store.root_of(grandchild), CAT);
    let second = store.find_clone_variable(grandchild, "n").unwrap();
    assert_eq!(store.variable(second), Some(&Value::Number(5.0)));
    assert_eq!(store.variable(var), Some(&Value::Number(0.0)));
}

#[test]
fn test_resolve_for_redirects_clones() {
    let mut store = Store::new();
    let global = store.add_project_variable("g");
    let local = store.add_sprite_variable(CAT, "l");
    store.register_clone(CAT_CLONE, CAT);

    let clone_local = store.find_clone_variable(CAT_CLONE, "l");
    assert_eq!(store.resolve_variable_for(CAT_CLONE, local), clone_local);
    assert_eq!(store.resolve_variable_for(CAT, local), Some(local));
    assert_eq!(store.resolve_variable_for(CAT_CLONE, global), Some(global));
}

#[test]
fn test_resolve_for_dead_cell_is_none() {
    let mut store = Store::new();
    let list = store.add_project_list("l");
    store.delete_list_by_name(None, "l");
    assert_eq!(store.resolve_list_for(CAT, list), None);
}

#[test]
fn test_remove_clone_purges_its_cells() {
    let mut store = Store::new();
    store.add_sprite_variable(CAT, "v");
    store.register_clone(CAT_CLONE, CAT);
    let clone_var = store.find_clone_variable(CAT_CLONE, "v");
    assert!(clone_var.is_some());

    store.remove_clone(CAT_CLONE);
    assert!(!store.is_clone(CAT_CLONE));
    assert_eq!(store.find_clone_variable(CAT_CLONE, "v"), None);
    assert!(clone_var.is_some_and(|id| store.variable(id).is_none()));
}

#[test]
fn test_enumeration_in_creation_order() {
    let mut store = Store::new();
    store.add_project_variable("b");
    store.add_project_variable("a");
    store.add_sprite_list(DOG, "l");
    store.add_sprite_variable(CAT, "v");

    let names: Vec<&str> = store
        .variables_in(Scope::Project)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(store.sprites_with_locals(), vec![CAT, DOG]);
}
