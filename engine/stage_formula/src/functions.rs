//! Built-in formula functions.
//!
//! Trigonometry works in degrees. Text positions (`letter`, `item`) are
//! 1-based; out-of-range positions yield empty text.

use stage_ir::{FormulaNode, Function, SpriteId, Value};

use crate::eval::{evaluate_node, list_items};
use crate::operators::{compare, to_number};
use crate::{EvalError, EvalResult, SceneView};

pub(crate) fn call(
    function: Function,
    args: &[FormulaNode],
    sprite: SpriteId,
    view: &dyn SceneView,
) -> EvalResult {
    if args.len() != function.arity() {
        return Err(EvalError::Arity {
            function: function.name(),
            expected: function.arity(),
            found: args.len(),
        });
    }
    let number = |index: usize| -> Result<f64, EvalError> {
        to_number(&evaluate_node(&args[index], sprite, view)?)
    };

    let result = match function {
        Function::Sin => number(0)?.to_radians().sin(),
        Function::Cos => number(0)?.to_radians().cos(),
        Function::Tan => number(0)?.to_radians().tan(),
        Function::Abs => number(0)?.abs(),
        Function::Sqrt => number(0)?.sqrt(),
        Function::Round => number(0)?.round(),
        Function::Floor => number(0)?.floor(),
        Function::Ceil => number(0)?.ceil(),
        Function::Ln => number(0)?.ln(),
        Function::Log => number(0)?.log10(),
        Function::Exp => number(0)?.exp(),
        Function::Pow => number(0)?.powf(number(1)?),
        Function::Mod => {
            let dividend = number(0)?;
            let divisor = number(1)?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            // Result takes the sign of the divisor.
            ((dividend % divisor) + divisor) % divisor
        }
        Function::Min => number(0)?.min(number(1)?),
        Function::Max => number(0)?.max(number(1)?),
        Function::Join => {
            let left = evaluate_node(&args[0], sprite, view)?;
            let right = evaluate_node(&args[1], sprite, view)?;
            return Ok(Value::Text(format!("{left}{right}")));
        }
        Function::Length => {
            let text = evaluate_node(&args[0], sprite, view)?.to_string();
            text.chars().count() as f64
        }
        Function::Letter => {
            let position = number(0)?;
            let text = evaluate_node(&args[1], sprite, view)?.to_string();
            let letter = nth_from_one(position).and_then(|i| text.chars().nth(i));
            return Ok(Value::Text(letter.map(String::from).unwrap_or_default()));
        }
        Function::NumberOfItems => list_arg(function, &args[0], sprite, view)?.len() as f64,
        Function::Item => {
            let position = number(0)?;
            let items = list_arg(function, &args[1], sprite, view)?;
            return Ok(nth_from_one(position)
                .and_then(|i| items.get(i).cloned())
                .unwrap_or_else(|| Value::Text(String::new())));
        }
        Function::Contains => {
            let items = list_arg(function, &args[0], sprite, view)?;
            let needle = evaluate_node(&args[1], sprite, view)?;
            return Ok(Value::Bool(
                items
                    .iter()
                    .any(|item| compare(item, &needle) == Some(std::cmp::Ordering::Equal)),
            ));
        }
    };
    Ok(Value::Number(result))
}

/// Zero-based index of a 1-based position, `None` when out of range.
fn nth_from_one(position: f64) -> Option<usize> {
    let position = position.floor();
    (position >= 1.0 && position.is_finite()).then(|| position as usize - 1)
}

fn list_arg<'v>(
    function: Function,
    arg: &FormulaNode,
    sprite: SpriteId,
    view: &'v dyn SceneView,
) -> Result<&'v [Value], EvalError> {
    match arg {
        FormulaNode::List(name) => list_items(name, sprite, view),
        _ => Err(EvalError::ExpectedList {
            function: function.name(),
        }),
    }
}
