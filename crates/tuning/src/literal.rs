//! Closed literal grammar for operator-entered values.
//!
//! Only numbers, `true`/`false` and bracketed groups of literals are
//! recognised. Anything else is a parse failure; nothing is ever evaluated.

use std::iter::Peekable;
use std::str::CharIndices;

use crate::error::{ConsoleError, Result};
use crate::value::{Value, ValueKind};

/// Deepest bracket nesting accepted; sequences of vectors need two levels.
const MAX_DEPTH: usize = 8;

/// Parsed but not yet typed literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number { value: f64, integral: bool },
    Bool(bool),
    Group(Vec<Literal>),
}

impl Literal {
    pub fn int(value: i64) -> Self {
        Literal::Number {
            value: value as f64,
            integral: true,
        }
    }

    pub fn float(value: f64) -> Self {
        Literal::Number {
            value,
            integral: false,
        }
    }

    /// Converts the literal into a value of the requested kind.
    pub fn coerce(&self, name: &str, kind: ValueKind) -> Result<Value> {
        let mismatch = || ConsoleError::TypeMismatch {
            name: name.to_string(),
            expected: kind,
            found: self.natural_kind(),
        };

        match kind {
            ValueKind::Float => self.as_f32().map(Value::Float).ok_or_else(mismatch),
            ValueKind::Int => match self {
                Literal::Number {
                    value,
                    integral: true,
                } if *value >= f64::from(i32::MIN) && *value <= f64::from(i32::MAX) => {
                    Ok(Value::Int(*value as i32))
                }
                _ => Err(mismatch()),
            },
            ValueKind::Bool => match self {
                Literal::Bool(flag) => Ok(Value::Bool(*flag)),
                Literal::Number {
                    value,
                    integral: true,
                } if *value == 0.0 || *value == 1.0 => Ok(Value::Bool(*value == 1.0)),
                _ => Err(mismatch()),
            },
            ValueKind::Vec3 => self.as_vec3().map(Value::Vec3).ok_or_else(mismatch),
            ValueKind::FloatSeq => match self {
                Literal::Group(items) => items
                    .iter()
                    .map(Literal::as_f32)
                    .collect::<Option<Vec<_>>>()
                    .map(Value::FloatSeq)
                    .ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            ValueKind::Vec3Seq => match self {
                Literal::Group(items) => items
                    .iter()
                    .map(Literal::as_vec3)
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Vec3Seq)
                    .ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
        }
    }

    fn as_f32(&self) -> Option<f32> {
        match self {
            Literal::Number { value, .. } => Some(*value as f32).filter(|v| v.is_finite()),
            _ => None,
        }
    }

    fn as_vec3(&self) -> Option<[f32; 3]> {
        match self {
            Literal::Group(items) if items.len() == 3 => {
                Some([items[0].as_f32()?, items[1].as_f32()?, items[2].as_f32()?])
            }
            _ => None,
        }
    }

    /// Best-effort kind used when reporting mismatches.
    fn natural_kind(&self) -> ValueKind {
        match self {
            Literal::Number { integral: true, .. } => ValueKind::Int,
            Literal::Number { .. } => ValueKind::Float,
            Literal::Bool(_) => ValueKind::Bool,
            Literal::Group(items) => match items.first() {
                Some(Literal::Group(_)) => ValueKind::Vec3Seq,
                _ if items.len() == 3 => ValueKind::Vec3,
                _ => ValueKind::FloatSeq,
            },
        }
    }
}

/// Parses a complete literal; trailing input is an error.
pub fn parse_literal(input: &str) -> Result<Literal> {
    let mut parser = Parser {
        input,
        chars: input.char_indices().peekable(),
        depth: 0,
    };
    parser.skip_whitespace();
    let literal = parser.literal()?;
    parser.skip_whitespace();
    match parser.chars.peek() {
        None => Ok(literal),
        Some(&(_, ch)) => Err(ConsoleError::parse(
            input,
            format!("unexpected '{ch}' after value"),
        )),
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn literal(&mut self) -> Result<Literal> {
        match self.chars.peek().copied() {
            Some((_, '(')) => self.group(')'),
            Some((_, '[')) => self.group(']'),
            Some((_, ch)) if ch.is_ascii_alphabetic() => self.word(),
            Some((start, ch)) if ch.is_ascii_digit() || matches!(ch, '+' | '-' | '.') => {
                self.number(start)
            }
            Some((_, ch)) => Err(self.fail(format!("unexpected '{ch}'"))),
            None => Err(self.fail("missing value")),
        }
    }

    fn group(&mut self, close: char) -> Result<Literal> {
        if self.depth == MAX_DEPTH {
            return Err(self.fail("brackets nested too deeply"));
        }
        self.depth += 1;
        let group = self.group_items(close);
        self.depth -= 1;
        group
    }

    fn group_items(&mut self, close: char) -> Result<Literal> {
        self.chars.next();
        let mut items = Vec::new();
        loop {
            self.skip_separators(items.is_empty())?;
            match self.chars.peek().copied() {
                Some((_, ch)) if ch == close => {
                    self.chars.next();
                    return Ok(Literal::Group(items));
                }
                Some((_, ')' | ']')) => return Err(self.fail("mismatched bracket")),
                Some(_) => items.push(self.literal()?),
                None => return Err(self.fail(format!("missing '{close}'"))),
            }
        }
    }

    fn word(&mut self) -> Result<Literal> {
        let mut word = String::new();
        while let Some(&(_, ch)) = self.chars.peek() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                break;
            }
            word.push(ch);
            self.chars.next();
        }
        match word.as_str() {
            "true" => Ok(Literal::Bool(true)),
            "false" => Ok(Literal::Bool(false)),
            _ => Err(self.fail(format!("'{word}' is not a literal"))),
        }
    }

    fn number(&mut self, start: usize) -> Result<Literal> {
        let mut end = start;
        let mut integral = true;
        let mut previous = None;
        while let Some(&(index, ch)) = self.chars.peek() {
            let accepted = match ch {
                '0'..='9' => true,
                '+' | '-' => index == start || matches!(previous, Some('e' | 'E')),
                '.' | 'e' | 'E' => {
                    integral = false;
                    true
                }
                _ => false,
            };
            if !accepted {
                break;
            }
            previous = Some(ch);
            end = index + ch.len_utf8();
            self.chars.next();
        }

        let text = &self.input[start..end];
        if integral {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(Literal::int(value));
            }
        }
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .map(Literal::float)
            .ok_or_else(|| self.fail(format!("'{text}' is not a number")))
    }

    /// Consumes whitespace and at most one comma between group items.
    fn skip_separators(&mut self, first: bool) -> Result<()> {
        self.skip_whitespace();
        if let Some(&(_, ',')) = self.chars.peek() {
            if first {
                return Err(self.fail("leading ',' in group"));
            }
            self.chars.next();
            self.skip_whitespace();
        }
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.chars.peek(), Some((_, ch)) if ch.is_whitespace()) {
            self.chars.next();
        }
    }

    fn fail(&self, reason: impl Into<String>) -> ConsoleError {
        ConsoleError::parse(self.input, reason)
    }
}
