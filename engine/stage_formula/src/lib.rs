//! Stage Formula - evaluation of formula trees against a running scene.
//!
//! - [`evaluate`] walks a formula for one sprite and reports failures
//! - [`interpret_number`], [`interpret_bool`], [`interpret_text`] degrade
//!   failures to `0`, `false` and `""` (logged), which is what bricks use
//! - [`parse_formula`] reads the canonical text syntax back into a tree
//! - [`migrate_project`] rewrites pre-0.993 collision tokens
//!
//! Evaluation reads state only through a [`SceneView`].

mod error;
mod eval;
mod functions;
mod migrate;
mod operators;
mod parse;
mod stack;
mod view;

pub use error::{EvalError, MigrationIssue, ParseError};
pub use eval::{
    evaluate, interpret_bool, interpret_number, interpret_text, interpret_value, list_value,
};
pub use migrate::{migrate_formula, migrate_project, resolve_collision_token, MigrationReport};
pub use parse::parse_formula;
pub use stack::ensure_sufficient_stack;
pub use view::SceneView;

/// Result of evaluating a formula or sub-expression.
pub type EvalResult = Result<stage_ir::Value, EvalError>;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
