//! Array calculator behind the `ivy` command.
//!
//! Expressions are evaluated right to left with no operator precedence,
//! APL style: `2 * 3 + 4` is `14`. Every value is a vector of numbers and a
//! scalar is a vector of length one, so `1 2 3 * 2` is `2 4 6`.

mod lexer;
mod parser;
mod value;

use thiserror::Error;

/// Longest vector `iota` will build
pub const MAX_VECTOR_LEN: usize = 10_000;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unexpected {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unbalanced parenthesis")]
    UnbalancedParen,
    #[error("unknown word {0:?}")]
    UnknownWord(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("length mismatch: {0} and {1}")]
    LengthMismatch(usize, usize),
    #[error("domain error: {0}")]
    Domain(String),
    #[error("vector too long: {0} elements (max 10000)")]
    TooLong(usize),
    #[error("expression nested too deeply")]
    TooDeep,
}

/// Turns an expression into printable output.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, expression: &str) -> Result<String, EvalError>;
}

/// The built-in ivy-flavoured calculator.
#[derive(Debug, Default, Clone, Copy)]
pub struct IvyEvaluator;

impl IvyEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for IvyEvaluator {
    /// Each non-blank line is evaluated on its own; outputs are joined with newlines.
    fn evaluate(&self, expression: &str) -> Result<String, EvalError> {
        let mut outputs = Vec::new();
        for line in expression.lines().filter(|l| !l.trim().is_empty()) {
            let tokens = lexer::tokenize(line)?;
            let value = parser::evaluate(&tokens)?;
            outputs.push(value.to_string());
        }

        if outputs.is_empty() {
            return Err(EvalError::Empty);
        }

        Ok(outputs.join("\n"))
    }
}
