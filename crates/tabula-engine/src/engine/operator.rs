//! The fixed set of n-ary operators a formula may use.

use super::TypeError;

/// Arithmetic and comparison operators over one or more integer operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Plus,
    Minus,
    Times,
    Divide,
    Less,
    Equal,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Plus,
        Operator::Minus,
        Operator::Times,
        Operator::Divide,
        Operator::Less,
        Operator::Equal,
    ];

    /// The symbol used when rendering and parsing.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Times => "*",
            Operator::Divide => "/",
            Operator::Less => "<",
            Operator::Equal => "=",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Apply the operator to already-reduced operands.
    ///
    /// Arithmetic wraps on overflow. An empty operand list yields the
    /// operator's identity (0 for `+`/`-`/`/`, 1 for the rest).
    pub fn apply(&self, operands: &[i64]) -> Result<i64, TypeError> {
        let Some((&first, rest)) = operands.split_first() else {
            return Ok(match self {
                Operator::Plus | Operator::Minus | Operator::Divide => 0,
                Operator::Times | Operator::Less | Operator::Equal => 1,
            });
        };

        let result = match self {
            Operator::Plus => rest.iter().fold(first, |acc, n| acc.wrapping_add(*n)),
            Operator::Minus => rest.iter().fold(first, |acc, n| acc.wrapping_sub(*n)),
            Operator::Times => rest.iter().fold(first, |acc, n| acc.wrapping_mul(*n)),
            Operator::Divide => {
                let mut acc = first;
                for &divisor in rest {
                    if divisor == 0 {
                        return Err(TypeError::DivisionByZero);
                    }
                    acc = acc.wrapping_div(divisor);
                }
                acc
            }
            Operator::Less => operands.windows(2).all(|pair| pair[0] < pair[1]) as i64,
            Operator::Equal => operands.windows(2).all(|pair| pair[0] == pair[1]) as i64,
        };
        Ok(result)
    }
}
