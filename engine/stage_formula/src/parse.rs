//! Parser for the canonical formula text syntax.
//!
//! Accepts exactly what `Formula`'s `Display` produces, plus insignificant
//! whitespace and redundant parentheses. The grammar is small enough for a
//! scannerless precedence-climbing parser: `*` starts a list name in operand
//! position and means multiplication in operator position, which a separate
//! tokenizer could not tell apart.

use stage_ir::{BinaryOp, Formula, FormulaNode, Function, Sensor, UnaryOp};

use crate::stack::ensure_sufficient_stack;
use crate::ParseError;

/// Binding power of prefix operators; tighter than every binary operator.
const UNARY_PRECEDENCE: u8 = 7;

/// Parse formula text.
pub fn parse_formula(source: &str) -> Result<Formula, ParseError> {
    let mut parser = Parser { source, pos: 0 };
    let root = parser.parse_expr(0)?;
    parser.skip_whitespace();
    if let Some(c) = parser.peek() {
        return Err(ParseError::UnexpectedToken {
            found: c.to_string(),
            offset: parser.pos,
            expected: "an operator or the end of the formula",
        });
    }
    Ok(Formula::new(root))
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    #[inline]
    fn rest(&self) -> &str {
        &self.source[self.pos..]
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    /// Consume `c` after optional whitespace.
    fn expect_char(&mut self, c: char, expected: &'static str) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(found) if found == c => {
                self.bump();
                Ok(())
            }
            Some(found) => Err(ParseError::UnexpectedToken {
                found: found.to_string(),
                offset: self.pos,
                expected,
            }),
            None => Err(ParseError::UnexpectedEnd { expected }),
        }
    }

    /// Whether a keyword (not just an identifier prefix) starts here.
    fn at_keyword(&self, word: &str) -> bool {
        self.rest().strip_prefix(word).is_some_and(|after| {
            !after
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || c == '_')
        })
    }

    fn parse_expr(&mut self, min_precedence: u8) -> Result<FormulaNode, ParseError> {
        ensure_sufficient_stack(|| {
            let mut left = self.parse_prefix()?;
            loop {
                self.skip_whitespace();
                let Some((op, width)) = self.peek_binary_op() else {
                    break;
                };
                let precedence = op.precedence();
                if precedence < min_precedence {
                    break;
                }
                self.pos += width;
                let next_min = if op.is_right_associative() {
                    precedence
                } else {
                    precedence + 1
                };
                let right = self.parse_expr(next_min)?;
                left = FormulaNode::binary(op, left, right);
            }
            Ok(left)
        })
    }

    fn peek_binary_op(&self) -> Option<(BinaryOp, usize)> {
        if self.at_keyword("and") {
            return Some((BinaryOp::And, 3));
        }
        if self.at_keyword("or") {
            return Some((BinaryOp::Or, 2));
        }
        let rest = self.rest();
        for (symbol, op) in [("!=", BinaryOp::NotEq), ("<=", BinaryOp::LtEq), (">=", BinaryOp::GtEq)] {
            if rest.starts_with(symbol) {
                return Some((op, 2));
            }
        }
        let op = match rest.chars().next()? {
            '=' => BinaryOp::Eq,
            '<' => BinaryOp::Lt,
            '>' => BinaryOp::Gt,
            '+' => BinaryOp::Add,
            '-' => BinaryOp::Sub,
            '*' => BinaryOp::Mul,
            '/' => BinaryOp::Div,
            '^' => BinaryOp::Pow,
            _ => return None,
        };
        Some((op, 1))
    }

    fn parse_prefix(&mut self) -> Result<FormulaNode, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let Some(c) = self.peek() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "an operand",
            });
        };
        match c {
            '-' => {
                self.bump();
                match self.parse_expr(UNARY_PRECEDENCE)? {
                    FormulaNode::Number(n) => Ok(FormulaNode::Number(-n)),
                    operand => Ok(FormulaNode::unary(UnaryOp::Neg, operand)),
                }
            }
            '(' => {
                self.bump();
                let inner = self.parse_expr(0)?;
                self.expect_char(')', "`)`")?;
                Ok(inner)
            }
            '\'' => Ok(FormulaNode::Text(self.read_quoted('\'')?)),
            '"' => Ok(FormulaNode::Variable(self.read_quoted('"')?)),
            '*' => Ok(FormulaNode::List(self.read_quoted('*')?)),
            c if c.is_ascii_digit() || c == '.' => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.parse_word(start),
            other => Err(ParseError::UnexpectedChar {
                found: other,
                offset: start,
            }),
        }
    }

    fn parse_word(&mut self, start: usize) -> Result<FormulaNode, ParseError> {
        let word = self.read_identifier();
        match word {
            "true" => return Ok(FormulaNode::Bool(true)),
            "false" => return Ok(FormulaNode::Bool(false)),
            "not" => {
                let operand = self.parse_expr(UNARY_PRECEDENCE)?;
                return Ok(FormulaNode::unary(UnaryOp::Not, operand));
            }
            _ => {}
        }
        if let Some(sensor) = Sensor::from_keyword(word) {
            return Ok(FormulaNode::Sensor(sensor));
        }

        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Err(ParseError::UnknownIdentifier {
                name: word.to_owned(),
                offset: start,
            });
        }
        self.bump();
        match word {
            "sensor" => Ok(FormulaNode::Sensor(Sensor::External(self.read_raw_name()?))),
            "collision" => Ok(FormulaNode::Collision {
                target: self.read_raw_name()?,
            }),
            "legacy_collision" => Ok(FormulaNode::LegacyCollision(self.read_raw_name()?)),
            name => {
                let function =
                    Function::from_name(name).ok_or_else(|| ParseError::UnknownIdentifier {
                        name: name.to_owned(),
                        offset: start,
                    })?;
                let args = self.parse_arguments()?;
                if args.len() != function.arity() {
                    return Err(ParseError::Arity {
                        function: function.name(),
                        expected: function.arity(),
                        found: args.len(),
                    });
                }
                Ok(FormulaNode::call(function, args))
            }
        }
    }

    /// Comma-separated arguments after the opening parenthesis.
    fn parse_arguments(&mut self) -> Result<Vec<FormulaNode>, ParseError> {
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr(0)?);
            self.skip_whitespace();
            match self.bump() {
                Some(',') => {}
                Some(')') => return Ok(args),
                Some(found) => {
                    return Err(ParseError::UnexpectedToken {
                        found: found.to_string(),
                        offset: self.pos - found.len_utf8(),
                        expected: "`,` or `)`",
                    })
                }
                None => {
                    return Err(ParseError::UnexpectedEnd {
                        expected: "`,` or `)`",
                    })
                }
            }
        }
    }

    fn read_identifier(&mut self) -> &'a str {
        let source = self.source;
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        &source[start..self.pos]
    }

    /// Verbatim text up to the closing parenthesis (sprite and sensor names).
    fn read_raw_name(&mut self) -> Result<String, ParseError> {
        let start = self.pos;
        let len = self.rest().find(')').ok_or(ParseError::Unterminated {
            quote: ')',
            offset: start,
        })?;
        self.pos += len + 1;
        Ok(self.source[start..start + len].to_owned())
    }

    fn read_quoted(&mut self, quote: char) -> Result<String, ParseError> {
        let start = self.pos;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('\\') => match self.bump() {
                    Some(escaped) => text.push(escaped),
                    None => break,
                },
                Some(c) if c == quote => return Ok(text),
                Some(c) => text.push(c),
                None => break,
            }
        }
        Err(ParseError::Unterminated {
            quote,
            offset: start,
        })
    }

    fn read_number(&mut self) -> Result<FormulaNode, ParseError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
            self.bump();
        }
        let text = &self.source[start..self.pos];
        text.parse::<f64>()
            .map(FormulaNode::Number)
            .map_err(|_| ParseError::InvalidNumber {
                text: text.to_owned(),
                offset: start,
            })
    }
}
