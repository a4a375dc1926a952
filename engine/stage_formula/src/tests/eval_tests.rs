//! Tests for formula evaluation against a scene.

use pretty_assertions::assert_eq;
use stage_ir::{Formula, FormulaNode, Look, Sensor, SpriteId, Value};

use super::TestScene;
use crate::{
    evaluate, interpret_bool, interpret_number, interpret_text, list_value, parse_formula,
    EvalError,
};

fn eval_text(scene: &TestScene, sprite: SpriteId, source: &str) -> Result<Value, EvalError> {
    evaluate(&parse_formula(source).unwrap(), sprite, scene)
}

fn scene_with_cat() -> (TestScene, SpriteId) {
    let mut scene = TestScene::default();
    let cat = scene.add_sprite("cat", Look::default());
    (scene, cat)
}

#[test]
fn test_arithmetic_precedence() {
    let (scene, cat) = scene_with_cat();
    assert_eq!(eval_text(&scene, cat, "1 + 2 * 3"), Ok(Value::Number(7.0)));
    assert_eq!(eval_text(&scene, cat, "(1 + 2) * 3"), Ok(Value::Number(9.0)));
    assert_eq!(eval_text(&scene, cat, "2 ^ 3 ^ 2"), Ok(Value::Number(512.0)));
    assert_eq!(eval_text(&scene, cat, "10 - 4 - 3"), Ok(Value::Number(3.0)));
}

#[test]
fn test_variables_resolve_through_scopes() {
    let (mut scene, cat) = scene_with_cat();
    let dog = scene.add_sprite("dog", Look::default());
    let global = scene.store.add_project_variable("score");
    scene.store.set_variable(global, Value::Number(10.0)).unwrap();
    let local = scene.store.add_sprite_variable(cat, "score");
    scene.store.set_variable(local, Value::Number(3.0)).unwrap();

    assert_eq!(eval_text(&scene, cat, "\"score\" + 1"), Ok(Value::Number(4.0)));
    assert_eq!(eval_text(&scene, dog, "\"score\" + 1"), Ok(Value::Number(11.0)));
}

#[test]
fn test_unknown_variable_degrades_to_defaults() {
    let (scene, cat) = scene_with_cat();
    let formula = Formula::variable("missing");

    assert_eq!(
        evaluate(&formula, cat, &scene),
        Err(EvalError::UnknownVariable {
            name: "missing".to_owned()
        })
    );
    assert_eq!(interpret_number(&formula, cat, &scene), 0.0);
    assert!(!interpret_bool(&formula, cat, &scene));
    assert_eq!(interpret_text(&formula, cat, &scene), "");
}

#[test]
fn test_division_by_zero_degrades_to_zero() {
    let (scene, cat) = scene_with_cat();
    let formula = parse_formula("5 / (2 - 2)").unwrap();
    assert_eq!(evaluate(&formula, cat, &scene), Err(EvalError::DivisionByZero));
    assert_eq!(interpret_number(&formula, cat, &scene), 0.0);
}

#[test]
fn test_non_numeric_result_interprets_as_zero() {
    let (scene, cat) = scene_with_cat();
    assert_eq!(interpret_number(&Formula::text("hello"), cat, &scene), 0.0);
    assert_eq!(interpret_number(&Formula::text("12"), cat, &scene), 12.0);
}

#[test]
fn test_logical_operators_short_circuit() {
    let (scene, cat) = scene_with_cat();
    assert_eq!(eval_text(&scene, cat, "false and 1 / 0"), Ok(Value::Bool(false)));
    assert_eq!(eval_text(&scene, cat, "true or \"missing\""), Ok(Value::Bool(true)));
    assert!(eval_text(&scene, cat, "true and 1 / 0").is_err());
}

#[test]
fn test_list_value_joins_items() {
    let letters = [Value::from("a"), Value::from("b"), Value::from("c")];
    assert_eq!(list_value(&letters), Value::from("abc"));

    let words = [Value::from("hello"), Value::from("world")];
    assert_eq!(list_value(&words), Value::from("hello world"));

    let digits = [Value::Number(1.0), Value::Number(2.0)];
    assert_eq!(list_value(&digits), Value::from("12"));

    assert_eq!(list_value(&[Value::Number(42.0)]), Value::Number(42.0));
    assert_eq!(list_value(&[]), Value::from(""));
}

#[test]
fn test_list_functions() {
    let (mut scene, cat) = scene_with_cat();
    let list = scene.store.add_project_list("fruit");
    scene
        .store
        .set_list(list, vec![Value::from("apple"), Value::from("pear")])
        .unwrap();

    assert_eq!(eval_text(&scene, cat, "number_of_items(*fruit*)"), Ok(Value::Number(2.0)));
    assert_eq!(eval_text(&scene, cat, "item(2, *fruit*)"), Ok(Value::from("pear")));
    assert_eq!(eval_text(&scene, cat, "item(3, *fruit*)"), Ok(Value::from("")));
    assert_eq!(eval_text(&scene, cat, "contains(*fruit*, 'apple')"), Ok(Value::Bool(true)));
    assert_eq!(eval_text(&scene, cat, "contains(*fruit*, 'plum')"), Ok(Value::Bool(false)));
    assert_eq!(eval_text(&scene, cat, "*fruit*"), Ok(Value::from("apple pear")));
    assert_eq!(
        eval_text(&scene, cat, "number_of_items('fruit')"),
        Err(EvalError::ExpectedList {
            function: "number_of_items"
        })
    );
    assert_eq!(
        eval_text(&scene, cat, "number_of_items(*veg*)"),
        Err(EvalError::UnknownList {
            name: "veg".to_owned()
        })
    );
}

#[test]
fn test_math_functions() {
    let (scene, cat) = scene_with_cat();
    assert_eq!(eval_text(&scene, cat, "sin(90)"), Ok(Value::Number(1.0)));
    assert_eq!(eval_text(&scene, cat, "cos(0)"), Ok(Value::Number(1.0)));
    assert_eq!(eval_text(&scene, cat, "abs(-3)"), Ok(Value::Number(3.0)));
    assert_eq!(eval_text(&scene, cat, "round(2.5)"), Ok(Value::Number(3.0)));
    assert_eq!(eval_text(&scene, cat, "floor(2.7)"), Ok(Value::Number(2.0)));
    assert_eq!(eval_text(&scene, cat, "ceil(2.1)"), Ok(Value::Number(3.0)));
    assert_eq!(eval_text(&scene, cat, "sqrt(16)"), Ok(Value::Number(4.0)));
    assert_eq!(eval_text(&scene, cat, "log(10)"), Ok(Value::Number(1.0)));
    assert_eq!(eval_text(&scene, cat, "pow(2, 10)"), Ok(Value::Number(1024.0)));
    assert_eq!(eval_text(&scene, cat, "mod(-1, 3)"), Ok(Value::Number(2.0)));
    assert_eq!(eval_text(&scene, cat, "max(4, '7')"), Ok(Value::Number(7.0)));
    assert_eq!(eval_text(&scene, cat, "mod(4, 0)"), Err(EvalError::DivisionByZero));
}

#[test]
fn test_text_functions() {
    let (scene, cat) = scene_with_cat();
    assert_eq!(eval_text(&scene, cat, "join('a', 1)"), Ok(Value::from("a1")));
    assert_eq!(eval_text(&scene, cat, "length('hello')"), Ok(Value::Number(5.0)));
    assert_eq!(eval_text(&scene, cat, "letter(2, 'abc')"), Ok(Value::from("b")));
    assert_eq!(eval_text(&scene, cat, "letter(0, 'abc')"), Ok(Value::from("")));
}

#[test]
fn test_wrong_arity_is_an_error() {
    let (scene, cat) = scene_with_cat();
    let formula = Formula::new(FormulaNode::call(
        stage_ir::Function::Max,
        vec![FormulaNode::Number(1.0)],
    ));
    assert_eq!(
        evaluate(&formula, cat, &scene),
        Err(EvalError::Arity {
            function: "max",
            expected: 2,
            found: 1
        })
    );
}

#[test]
fn test_sensors_read_the_look() {
    let mut scene = TestScene::default();
    let mut look = Look::default();
    look.set_position(12.0, -4.0);
    look.set_direction(45.0);
    look.visible = false;
    let cat = scene.add_sprite("cat", look);

    assert_eq!(eval_text(&scene, cat, "x_position - y_position"), Ok(Value::Number(16.0)));
    assert_eq!(eval_text(&scene, cat, "direction"), Ok(Value::Number(45.0)));
    assert_eq!(eval_text(&scene, cat, "visible"), Ok(Value::Bool(false)));
    assert_eq!(
        eval_text(&scene, SpriteId::new(9), "size"),
        Err(EvalError::MissingLook {
            sprite: SpriteId::new(9)
        })
    );
}

#[test]
fn test_external_sensor() {
    let (mut scene, cat) = scene_with_cat();
    scene.sensors.push(("compass".to_owned(), 270.0));
    let compass = Formula::new(FormulaNode::Sensor(Sensor::External("compass".to_owned())));
    assert_eq!(evaluate(&compass, cat, &scene), Ok(Value::Number(270.0)));

    let missing = Formula::new(FormulaNode::Sensor(Sensor::External("nfc".to_owned())));
    assert_eq!(interpret_number(&missing, cat, &scene), 0.0);
}

#[test]
fn test_collision_with_named_sprite() {
    let mut scene = TestScene::default();
    let cat = scene.add_square("cat", 0.0, 0.0);
    scene.add_square("dog", 300.0, 0.0);
    scene.add_square("mouse", 60.0, 0.0);

    assert_eq!(evaluate(&Formula::collision("dog"), cat, &scene), Ok(Value::Number(0.0)));
    assert!(interpret_number(&Formula::collision("mouse"), cat, &scene) > 0.0);
    assert_eq!(
        evaluate(&Formula::collision("bird"), cat, &scene),
        Err(EvalError::UnknownSprite {
            name: "bird".to_owned()
        })
    );
}

#[test]
fn test_collision_includes_clones_but_not_self() {
    let mut scene = TestScene::default();
    let cat = scene.add_square("cat", 0.0, 0.0);
    // A clone of "cat" far away, and one overlapping the original.
    scene.add_square("cat", 500.0, 0.0);
    let near_clone = scene.add_square("cat", 20.0, 0.0);

    let touching = interpret_number(&Formula::collision("cat"), cat, &scene);
    assert_eq!(touching, 80.0);
    let from_clone = interpret_number(&Formula::collision("cat"), near_clone, &scene);
    assert_eq!(from_clone, 80.0);
}

#[test]
fn test_unmigrated_legacy_token_fails() {
    let (scene, cat) = scene_with_cat();
    let formula = Formula::new(FormulaNode::LegacyCollision("ab".to_owned()));
    assert_eq!(
        evaluate(&formula, cat, &scene),
        Err(EvalError::LegacyCollision {
            token: "ab".to_owned()
        })
    );
}

#[test]
fn test_deeply_nested_formula_does_not_overflow() {
    let (scene, cat) = scene_with_cat();
    let mut node = FormulaNode::Number(0.0);
    for _ in 0..20_000 {
        node = FormulaNode::binary(stage_ir::BinaryOp::Add, node, FormulaNode::Number(1.0));
    }
    let formula = Formula::new(node);
    assert_eq!(interpret_number(&formula, cat, &scene), 20_000.0);
    // Dropping a tree this deep recurses too; keep it off the test's stack.
    std::mem::forget(formula);
}
