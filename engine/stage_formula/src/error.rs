//! Evaluation, parse and migration errors.

use stage_ir::SpriteId;

/// Why a formula could not be evaluated.
///
/// These never escape the `interpret_*` entry points: there they are logged
/// and replaced by the default value for the requested type.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("no variable named `{name}` is visible")]
    UnknownVariable { name: String },
    #[error("no list named `{name}` is visible")]
    UnknownList { name: String },
    #[error("no sprite named `{name}`")]
    UnknownSprite { name: String },
    #[error("sprite #{} has no look", .sprite.raw())]
    MissingLook { sprite: SpriteId },
    #[error("no sensor named `{name}`")]
    UnknownSensor { name: String },
    #[error("`{function}` takes {expected} argument(s), got {found}")]
    Arity {
        function: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{function}` expects a list reference")]
    ExpectedList { function: &'static str },
    #[error("`{text}` is not a number")]
    NotANumber { text: String },
    #[error("division by zero")]
    DivisionByZero,
    #[error("legacy collision token `{token}` was never migrated")]
    LegacyCollision { token: String },
}

/// Malformed formula text.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected character `{found}` at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("unexpected `{found}` at offset {offset}, expected {expected}")]
    UnexpectedToken {
        found: String,
        offset: usize,
        expected: &'static str,
    },
    #[error("unexpected end of formula, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("unterminated {quote}-quoted name starting at offset {offset}")]
    Unterminated { quote: char, offset: usize },
    #[error("invalid number `{text}` at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("unknown identifier `{name}` at offset {offset}")]
    UnknownIdentifier { name: String, offset: usize },
    #[error("`{function}` takes {expected} argument(s), got {found}")]
    Arity {
        function: &'static str,
        expected: usize,
        found: usize,
    },
}

/// A legacy collision token the migrator refused to rewrite.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MigrationIssue {
    #[error("legacy collision token `{token}` matches no sprite")]
    Unresolved { token: String },
    #[error("legacy collision token `{token}` is ambiguous between {}", .candidates.join(", "))]
    Ambiguous {
        token: String,
        candidates: Vec<String>,
    },
}

impl MigrationIssue {
    pub fn token(&self) -> &str {
        match self {
            MigrationIssue::Unresolved { token } | MigrationIssue::Ambiguous { token, .. } => token,
        }
    }
}
