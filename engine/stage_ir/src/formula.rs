//! Formula expression trees.
//!
//! A formula is a small, side-effect-free expression: literals, references to
//! variables and lists (by name, resolved when evaluated), sensor reads,
//! function calls and operators. Evaluation lives in `stage_formula`; this
//! module only defines the tree, its canonical text rendering, and resource
//! analysis.
//!
//! # Text syntax
//!
//! | node                | rendering               |
//! |---------------------|-------------------------|
//! | number              | `12`, `0.5`             |
//! | text                | `'hello'`               |
//! | boolean             | `true`, `false`         |
//! | variable            | `"score"`               |
//! | list                | `*items*`               |
//! | sensor              | `x_position`            |
//! | external sensor     | `sensor(compass)`       |
//! | function call       | `max(1, "score")`       |
//! | collision           | `collision(Sprite 2)`   |
//! | legacy collision    | `legacy_collision(ab)`  |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::brick::Resources;
use crate::value::{format_number, Value};

/// A formula slot of a brick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Formula {
    root: FormulaNode,
}

impl Formula {
    pub fn new(root: FormulaNode) -> Self {
        Formula { root }
    }

    pub fn number(n: f64) -> Self {
        Formula::new(FormulaNode::Number(n))
    }

    pub fn text(s: impl Into<String>) -> Self {
        Formula::new(FormulaNode::Text(s.into()))
    }

    pub fn boolean(b: bool) -> Self {
        Formula::new(FormulaNode::Bool(b))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Formula::new(FormulaNode::Variable(name.into()))
    }

    pub fn collision(target: impl Into<String>) -> Self {
        Formula::new(FormulaNode::Collision {
            target: target.into(),
        })
    }

    #[inline]
    pub fn root(&self) -> &FormulaNode {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut FormulaNode {
        &mut self.root
    }

    /// Literal value if the whole formula is a single literal.
    pub fn as_literal(&self) -> Option<Value> {
        match &self.root {
            FormulaNode::Number(n) => Some(Value::Number(*n)),
            FormulaNode::Text(s) => Some(Value::Text(s.clone())),
            FormulaNode::Bool(b) => Some(Value::Bool(*b)),
            _ => None,
        }
    }

    pub fn required_resources(&self) -> Resources {
        let mut resources = Resources::empty();
        self.root.walk(&mut |node| match node {
            FormulaNode::Collision { .. } | FormulaNode::LegacyCollision(_) => {
                resources |= Resources::COLLISION;
            }
            FormulaNode::Sensor(Sensor::External(_)) => {
                resources |= Resources::EXTERNAL_SENSOR;
            }
            _ => {}
        });
        resources
    }

    /// Names of all variables and lists the formula refers to, in order of
    /// first appearance.
    pub fn referenced_names(&self) -> (Vec<String>, Vec<String>) {
        let mut variables: Vec<String> = Vec::new();
        let mut lists: Vec<String> = Vec::new();
        self.root.walk(&mut |node| match node {
            FormulaNode::Variable(name) if !variables.contains(name) => {
                variables.push(name.clone());
            }
            FormulaNode::List(name) if !lists.contains(name) => lists.push(name.clone()),
            _ => {}
        });
        (variables, lists)
    }

    pub fn contains_legacy_collision(&self) -> bool {
        let mut found = false;
        self.root.walk(&mut |node| {
            if matches!(node, FormulaNode::LegacyCollision(_)) {
                found = true;
            }
        });
        found
    }
}

impl From<FormulaNode> for Formula {
    fn from(root: FormulaNode) -> Self {
        Formula::new(root)
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}

/// Expression node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FormulaNode {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Variable reference by name.
    Variable(String),
    /// List reference by name.
    List(String),
    Sensor(Sensor),
    Call {
        function: Function,
        args: Vec<FormulaNode>,
    },
    /// Overlap with the named sprite (and its clones).
    Collision { target: String },
    /// Pre-0.993 collision token: sprite names concatenated without delimiter.
    LegacyCollision(String),
    Unary {
        op: UnaryOp,
        operand: Box<FormulaNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<FormulaNode>,
        right: Box<FormulaNode>,
    },
}

impl FormulaNode {
    pub fn call(function: Function, args: Vec<FormulaNode>) -> Self {
        FormulaNode::Call { function, args }
    }

    pub fn unary(op: UnaryOp, operand: FormulaNode) -> Self {
        FormulaNode::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: FormulaNode, right: FormulaNode) -> Self {
        FormulaNode::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Pre-order traversal.
    ///
    /// Iterative, so arbitrarily deep formulas do not grow the call stack.
    pub fn walk(&self, visit: &mut dyn FnMut(&FormulaNode)) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            visit(node);
            match node {
                FormulaNode::Call { args, .. } => pending.extend(args.iter().rev()),
                FormulaNode::Unary { operand, .. } => pending.push(operand),
                FormulaNode::Binary { left, right, .. } => {
                    pending.push(right);
                    pending.push(left);
                }
                _ => {}
            }
        }
    }

    /// Pre-order traversal with mutable access; children are visited after
    /// their parent has been (possibly) rewritten.
    pub fn walk_mut(&mut self, visit: &mut dyn FnMut(&mut FormulaNode)) {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            visit(node);
            match node {
                FormulaNode::Call { args, .. } => pending.extend(args.iter_mut().rev()),
                FormulaNode::Unary { operand, .. } => pending.push(operand),
                FormulaNode::Binary { left, right, .. } => {
                    pending.push(right);
                    pending.push(left);
                }
                _ => {}
            }
        }
    }

    /// Binding strength used for parenthesisation.
    fn precedence(&self) -> u8 {
        match self {
            FormulaNode::Binary { op, .. } => op.precedence(),
            FormulaNode::Unary { .. } => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }
}

const UNARY_PRECEDENCE: u8 = 7;
const ATOM_PRECEDENCE: u8 = 8;

/// Built-in sensors readable by a formula.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sensor {
    XPosition,
    YPosition,
    Direction,
    Size,
    Transparency,
    Brightness,
    Visible,
    /// Value supplied by an external sensor provider (device, robot, ...).
    External(String),
}

impl Sensor {
    const BUILTIN: [Sensor; 7] = [
        Sensor::XPosition,
        Sensor::YPosition,
        Sensor::Direction,
        Sensor::Size,
        Sensor::Transparency,
        Sensor::Brightness,
        Sensor::Visible,
    ];

    /// Identifier used in the text syntax; `None` for external sensors.
    pub fn keyword(&self) -> Option<&'static str> {
        Some(match self {
            Sensor::XPosition => "x_position",
            Sensor::YPosition => "y_position",
            Sensor::Direction => "direction",
            Sensor::Size => "size",
            Sensor::Transparency => "transparency",
            Sensor::Brightness => "brightness",
            Sensor::Visible => "visible",
            Sensor::External(_) => return None,
        })
    }

    pub fn from_keyword(word: &str) -> Option<Sensor> {
        Sensor::BUILTIN
            .into_iter()
            .find(|sensor| sensor.keyword() == Some(word))
    }
}

/// Built-in functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Abs,
    Sqrt,
    Round,
    Floor,
    Ceil,
    Ln,
    Log,
    Exp,
    Pow,
    Mod,
    Min,
    Max,
    Join,
    Length,
    Letter,
    NumberOfItems,
    Item,
    Contains,
}

impl Function {
    const ALL: [Function; 21] = [
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Abs,
        Function::Sqrt,
        Function::Round,
        Function::Floor,
        Function::Ceil,
        Function::Ln,
        Function::Log,
        Function::Exp,
        Function::Pow,
        Function::Mod,
        Function::Min,
        Function::Max,
        Function::Join,
        Function::Length,
        Function::Letter,
        Function::NumberOfItems,
        Function::Item,
        Function::Contains,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Abs => "abs",
            Function::Sqrt => "sqrt",
            Function::Round => "round",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Ln => "ln",
            Function::Log => "log",
            Function::Exp => "exp",
            Function::Pow => "pow",
            Function::Mod => "mod",
            Function::Min => "min",
            Function::Max => "max",
            Function::Join => "join",
            Function::Length => "length",
            Function::Letter => "letter",
            Function::NumberOfItems => "number_of_items",
            Function::Item => "item",
            Function::Contains => "contains",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Function::Pow
            | Function::Mod
            | Function::Min
            | Function::Max
            | Function::Join
            | Function::Letter
            | Function::Item
            | Function::Contains => 2,
            _ => 1,
        }
    }

    pub fn from_name(name: &str) -> Option<Function> {
        Function::ALL.into_iter().find(|f| f.name() == name)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => 3,
            BinaryOp::Add | BinaryOp::Sub => 4,
            BinaryOp::Mul | BinaryOp::Div => 5,
            BinaryOp::Pow => 6,
        }
    }

    #[inline]
    pub fn is_right_associative(self) -> bool {
        matches!(self, BinaryOp::Pow)
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str, quote: char) -> fmt::Result {
    use fmt::Write;
    f.write_char(quote)?;
    for c in s.chars() {
        if c == quote || c == '\\' {
            f.write_char('\\')?;
        }
        f.write_char(c)?;
    }
    f.write_char(quote)
}

fn write_operand(f: &mut fmt::Formatter<'_>, node: &FormulaNode, parens: bool) -> fmt::Result {
    if parens {
        write!(f, "({node})")
    } else {
        write!(f, "{node}")
    }
}

impl fmt::Display for FormulaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaNode::Number(n) => f.write_str(&format_number(*n)),
            FormulaNode::Text(s) => write_quoted(f, s, '\''),
            FormulaNode::Bool(b) => write!(f, "{b}"),
            FormulaNode::Variable(name) => write_quoted(f, name, '"'),
            FormulaNode::List(name) => write_quoted(f, name, '*'),
            FormulaNode::Sensor(Sensor::External(name)) => write!(f, "sensor({name})"),
            FormulaNode::Sensor(sensor) => f.write_str(sensor.keyword().unwrap_or_default()),
            FormulaNode::Call { function, args } => {
                write!(f, "{}(", function.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            FormulaNode::Collision { target } => write!(f, "collision({target})"),
            FormulaNode::LegacyCollision(token) => write!(f, "legacy_collision({token})"),
            FormulaNode::Unary { op, operand } => {
                f.write_str(match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "not ",
                })?;
                write_operand(f, operand, operand.precedence() < UNARY_PRECEDENCE)
            }
            FormulaNode::Binary { op, left, right } => {
                let prec = op.precedence();
                let left_parens = left.precedence() < prec
                    || (op.is_right_associative() && left.precedence() == prec);
                let right_parens = right.precedence() < prec
                    || (!op.is_right_associative() && right.precedence() == prec);
                write_operand(f, left, left_parens)?;
                write!(f, " {} ", op.symbol())?;
                write_operand(f, right, right_parens)
            }
        }
    }
}
