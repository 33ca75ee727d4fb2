use std::fmt;

use super::{EvalError, MAX_VECTOR_LEN};

/// Binary operators, also usable as reductions (`+/`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dyadic {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Max,
    Min,
    Mod,
}

impl Dyadic {
    fn apply(self, a: f64, b: f64) -> Result<f64, EvalError> {
        let result = match self {
            Dyadic::Add => a + b,
            Dyadic::Sub => a - b,
            Dyadic::Mul => a * b,
            Dyadic::Div if b == 0.0 => return Err(EvalError::DivisionByZero),
            Dyadic::Div => a / b,
            Dyadic::Pow => a.powf(b),
            Dyadic::Max => a.max(b),
            Dyadic::Min => a.min(b),
            Dyadic::Mod if b == 0.0 => return Err(EvalError::DivisionByZero),
            Dyadic::Mod => a % b,
        };
        finite(result)
    }

    /// Result of reducing an empty vector, where one exists
    fn identity(self) -> Option<f64> {
        match self {
            Dyadic::Add | Dyadic::Sub => Some(0.0),
            Dyadic::Mul | Dyadic::Div | Dyadic::Pow => Some(1.0),
            Dyadic::Max | Dyadic::Min | Dyadic::Mod => None,
        }
    }
}

/// Functions taking only a right argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monadic {
    Negate,
    Iota,
    Abs,
    Sqrt,
    Floor,
    Ceil,
}

fn finite(n: f64) -> Result<f64, EvalError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(EvalError::Domain("result is not a finite number".to_string()))
    }
}

/// A vector of numbers. Scalars are vectors of length one.
#[derive(Debug, Clone, PartialEq)]
pub struct Value(pub Vec<f64>);

impl Value {
    pub fn scalar(n: f64) -> Self {
        Value(vec![n])
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    /// Join two values into one vector (`1 (2 3)` is `1 2 3`).
    pub fn concat(mut self, other: Value) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn monadic(self, f: Monadic) -> Result<Value, EvalError> {
        match f {
            Monadic::Iota => iota(&self),
            Monadic::Negate => self.map(|n| Ok(-n)),
            Monadic::Abs => self.map(|n| Ok(n.abs())),
            Monadic::Floor => self.map(|n| Ok(n.floor())),
            Monadic::Ceil => self.map(|n| Ok(n.ceil())),
            Monadic::Sqrt => self.map(|n| {
                if n < 0.0 {
                    Err(EvalError::Domain(format!("sqrt of negative number {}", n)))
                } else {
                    Ok(n.sqrt())
                }
            }),
        }
    }

    /// Element-wise, with a scalar on either side extended to the other's length.
    pub fn dyadic(self, op: Dyadic, right: Value) -> Result<Value, EvalError> {
        let (l, r) = (self.len(), right.len());
        let pairs: Vec<(f64, f64)> = if l == 1 {
            right.0.iter().map(|&b| (self.0[0], b)).collect()
        } else if r == 1 {
            self.0.iter().map(|&a| (a, right.0[0])).collect()
        } else if l == r {
            self.0.iter().copied().zip(right.0.iter().copied()).collect()
        } else {
            return Err(EvalError::LengthMismatch(l, r));
        };

        pairs
            .into_iter()
            .map(|(a, b)| op.apply(a, b))
            .collect::<Result<Vec<_>, _>>()
            .map(Value)
    }

    /// Fold right to left: `-/ 1 2 3` is `1 - (2 - 3)`.
    pub fn reduce(self, op: Dyadic) -> Result<Value, EvalError> {
        let mut items = self.0.into_iter().rev();
        let Some(mut acc) = items.next() else {
            return op
                .identity()
                .map(Value::scalar)
                .ok_or_else(|| EvalError::Domain("reduction of empty vector".to_string()));
        };
        for n in items {
            acc = op.apply(n, acc)?;
        }
        Ok(Value::scalar(acc))
    }

    fn map(self, f: impl Fn(f64) -> Result<f64, EvalError>) -> Result<Value, EvalError> {
        self.0
            .into_iter()
            .map(f)
            .collect::<Result<Vec<_>, _>>()
            .map(Value)
    }
}

fn iota(arg: &Value) -> Result<Value, EvalError> {
    let [n] = arg.0.as_slice() else {
        return Err(EvalError::Domain("iota needs a single number".to_string()));
    };
    let n = *n;
    if n < 0.0 || n.fract() != 0.0 {
        return Err(EvalError::Domain(format!(
            "iota needs a non-negative integer, got {}",
            n
        )));
    }
    let n = n as usize;
    if n > MAX_VECTOR_LEN {
        return Err(EvalError::TooLong(n));
    }
    Ok(Value((1..=n).map(|i| i as f64).collect()))
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "()");
        }
        let parts: Vec<String> = self.0.iter().map(|&n| format_number(n)).collect();
        write!(f, "{}", parts.join(" "))
    }
}
