//! Tree-walking formula evaluator.

use stage_ir::{BinaryOp, Formula, FormulaNode, Sensor, SpriteId, Value};

use crate::functions;
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::stack::ensure_sufficient_stack;
use crate::{EvalError, EvalResult, SceneView};

/// Evaluate a formula on behalf of `sprite`.
///
/// Errors are returned to the caller; use the `interpret_*` functions for
/// the degrade-to-default behaviour bricks rely on.
pub fn evaluate(formula: &Formula, sprite: SpriteId, view: &dyn SceneView) -> EvalResult {
    evaluate_node(formula.root(), sprite, view)
}

pub(crate) fn evaluate_node(node: &FormulaNode, sprite: SpriteId, view: &dyn SceneView) -> EvalResult {
    ensure_sufficient_stack(|| match node {
        FormulaNode::Number(n) => Ok(Value::Number(*n)),
        FormulaNode::Text(s) => Ok(Value::Text(s.clone())),
        FormulaNode::Bool(b) => Ok(Value::Bool(*b)),
        FormulaNode::Variable(name) => {
            let store = view.store();
            store
                .lookup_variable(sprite, name)
                .and_then(|id| store.variable(id))
                .cloned()
                .ok_or_else(|| EvalError::UnknownVariable { name: name.clone() })
        }
        FormulaNode::List(name) => list_items(name, sprite, view).map(list_value),
        FormulaNode::Sensor(sensor) => read_sensor(sensor, sprite, view),
        FormulaNode::Call { function, args } => functions::call(*function, args, sprite, view),
        FormulaNode::Collision { target } => collision_with(target, sprite, view),
        FormulaNode::LegacyCollision(token) => Err(EvalError::LegacyCollision {
            token: token.clone(),
        }),
        FormulaNode::Unary { op, operand } => {
            let value = evaluate_node(operand, sprite, view)?;
            evaluate_unary(*op, &value)
        }
        FormulaNode::Binary { op, left, right } => {
            let left = evaluate_node(left, sprite, view)?;
            match op {
                BinaryOp::And if !left.is_truthy() => Ok(Value::Bool(false)),
                BinaryOp::Or if left.is_truthy() => Ok(Value::Bool(true)),
                _ => {
                    let right = evaluate_node(right, sprite, view)?;
                    evaluate_binary(*op, &left, &right)
                }
            }
        }
    })
}

/// Items of the list `name` as seen from `sprite`.
pub(crate) fn list_items<'v>(
    name: &str,
    sprite: SpriteId,
    view: &'v dyn SceneView,
) -> Result<&'v [Value], EvalError> {
    let store = view.store();
    store
        .lookup_list(sprite, name)
        .and_then(|id| store.list(id))
        .ok_or_else(|| EvalError::UnknownList {
            name: name.to_owned(),
        })
}

/// Value of a list used directly as an expression.
///
/// A single item stands for itself. Otherwise items are joined: without a
/// separator when every item is a single character, else with one space.
pub fn list_value(items: &[Value]) -> Value {
    if let [only] = items {
        return only.clone();
    }
    let rendered: Vec<String> = items.iter().map(ToString::to_string).collect();
    let separator = if rendered.iter().all(|s| s.chars().count() == 1) {
        ""
    } else {
        " "
    };
    Value::Text(rendered.join(separator))
}

fn read_sensor(sensor: &Sensor, sprite: SpriteId, view: &dyn SceneView) -> EvalResult {
    let look = || view.look(sprite).ok_or(EvalError::MissingLook { sprite });
    Ok(match sensor {
        Sensor::XPosition => Value::Number(look()?.x),
        Sensor::YPosition => Value::Number(look()?.y),
        Sensor::Direction => Value::Number(look()?.direction()),
        Sensor::Size => Value::Number(look()?.size()),
        Sensor::Transparency => Value::Number(look()?.transparency()),
        Sensor::Brightness => Value::Number(look()?.brightness()),
        Sensor::Visible => Value::Bool(look()?.visible),
        Sensor::External(name) => view
            .external_sensor(name)
            .map(Value::Number)
            .ok_or_else(|| EvalError::UnknownSensor { name: name.clone() })?,
    })
}

/// Largest overlap between `sprite` and any live instance of `target`.
fn collision_with(target: &str, sprite: SpriteId, view: &dyn SceneView) -> EvalResult {
    let own = view.look(sprite).ok_or(EvalError::MissingLook { sprite })?;
    let others = view
        .looks_named(target)
        .ok_or_else(|| EvalError::UnknownSprite {
            name: target.to_owned(),
        })?;
    let magnitude = others
        .into_iter()
        .filter(|(other, _)| *other != sprite)
        .map(|(_, look)| stage_collision::check_collision(own, look))
        .fold(0.0, f64::max);
    Ok(Value::Number(magnitude))
}

/// Evaluate to a number; failures and non-numeric results become `0`.
pub fn interpret_number(formula: &Formula, sprite: SpriteId, view: &dyn SceneView) -> f64 {
    match evaluate(formula, sprite, view) {
        Ok(value) => match value.as_number() {
            Some(n) if !n.is_nan() => n,
            _ => {
                tracing::debug!(%formula, %value, "formula result is not a number, using 0");
                0.0
            }
        },
        Err(error) => {
            degraded(formula, sprite, &error, "0");
            0.0
        }
    }
}

/// Evaluate to a truth value; failures become `false`.
pub fn interpret_bool(formula: &Formula, sprite: SpriteId, view: &dyn SceneView) -> bool {
    match evaluate(formula, sprite, view) {
        Ok(value) => value.is_truthy(),
        Err(error) => {
            degraded(formula, sprite, &error, "false");
            false
        }
    }
}

/// Evaluate to display text; failures become the empty string.
pub fn interpret_text(formula: &Formula, sprite: SpriteId, view: &dyn SceneView) -> String {
    match evaluate(formula, sprite, view) {
        Ok(value) => value.to_string(),
        Err(error) => {
            degraded(formula, sprite, &error, "empty text");
            String::new()
        }
    }
}

/// Evaluate to a value; failures become the number `0`.
pub fn interpret_value(formula: &Formula, sprite: SpriteId, view: &dyn SceneView) -> Value {
    evaluate(formula, sprite, view).unwrap_or_else(|error| {
        degraded(formula, sprite, &error, "0");
        Value::default()
    })
}

fn degraded(formula: &Formula, sprite: SpriteId, error: &EvalError, fallback: &str) {
    tracing::debug!(
        %formula,
        sprite = sprite.raw(),
        %error,
        fallback,
        "formula evaluation failed"
    );
}
