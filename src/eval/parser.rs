use super::lexer::Token;
use super::value::{Dyadic, Monadic, Value};
use super::EvalError;

/// Deepest nesting of parentheses, functions and operators in one line
pub const MAX_DEPTH: usize = 256;

/// Evaluate one line of tokens.
pub fn evaluate(tokens: &[Token]) -> Result<Value, EvalError> {
    if tokens.is_empty() {
        return Err(EvalError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;

    match parser.peek() {
        None => Ok(value),
        Some(Token::RParen) => Err(EvalError::UnbalancedParen),
        Some(tok) => Err(EvalError::UnexpectedToken(tok.to_string())),
    }
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
    depth: usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    /// Every recursive path passes through here, so this bounds the stack.
    fn expr(&mut self) -> Result<Value, EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::TooDeep);
        }
        self.depth += 1;
        let value = self.expr_inner();
        self.depth -= 1;
        value
    }

    /// expr := op '/' expr | monadic expr | strand [dyadic expr]
    ///
    /// Everything to the right is evaluated first, so there is no precedence.
    fn expr_inner(&mut self) -> Result<Value, EvalError> {
        let Some(tok) = self.peek() else {
            return Err(EvalError::UnexpectedEnd);
        };

        if matches!(self.peek_at(1), Some(Token::Slash)) {
            if let Some(op) = dyadic_of(tok) {
                self.pos += 2;
                return self.expr()?.reduce(op);
            }
        }

        if let Some(f) = monadic_of(tok) {
            self.pos += 1;
            return self.expr()?.monadic(f);
        }

        let left = self.strand()?;
        match self.peek() {
            None | Some(Token::RParen) => Ok(left),
            Some(tok) => {
                let op = match dyadic_of(tok) {
                    Some(op) => op,
                    None => return Err(unexpected(tok)),
                };
                self.pos += 1;
                let right = self.expr()?;
                left.dyadic(op, right)
            }
        }
    }

    /// One or more juxtaposed atoms: numbers or parenthesised expressions.
    fn strand(&mut self) -> Result<Value, EvalError> {
        let mut value = self.atom()?;
        while matches!(self.peek(), Some(Token::Number(_) | Token::LParen)) {
            value = value.concat(self.atom()?);
        }
        Ok(value)
    }

    fn atom(&mut self) -> Result<Value, EvalError> {
        match self.advance() {
            Some(Token::Number(n)) => Ok(Value::scalar(*n)),
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(EvalError::UnbalancedParen),
                }
            }
            Some(tok) => Err(unexpected(tok)),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

fn dyadic_of(tok: &Token) -> Option<Dyadic> {
    match tok {
        Token::Plus => Some(Dyadic::Add),
        Token::Minus => Some(Dyadic::Sub),
        Token::Star => Some(Dyadic::Mul),
        Token::Slash => Some(Dyadic::Div),
        Token::Power => Some(Dyadic::Pow),
        Token::Word(w) => match w.as_str() {
            "max" => Some(Dyadic::Max),
            "min" => Some(Dyadic::Min),
            "mod" => Some(Dyadic::Mod),
            _ => None,
        },
        _ => None,
    }
}

fn monadic_of(tok: &Token) -> Option<Monadic> {
    match tok {
        Token::Minus => Some(Monadic::Negate),
        Token::Word(w) => match w.as_str() {
            "iota" => Some(Monadic::Iota),
            "abs" => Some(Monadic::Abs),
            "sqrt" => Some(Monadic::Sqrt),
            "floor" => Some(Monadic::Floor),
            "ceil" => Some(Monadic::Ceil),
            _ => None,
        },
        _ => None,
    }
}

fn unexpected(tok: &Token) -> EvalError {
    match tok {
        Token::Word(w) if dyadic_of(tok).is_none() && monadic_of(tok).is_none() => {
            EvalError::UnknownWord(w.clone())
        }
        Token::RParen => EvalError::UnbalancedParen,
        _ => EvalError::UnexpectedToken(tok.to_string()),
    }
}
