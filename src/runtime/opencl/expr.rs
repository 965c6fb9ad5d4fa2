//! Integer index expressions printed into kernel source

use std::fmt;
use std::ops::{Add, Div, Mul, Rem, Sub};

/// Binary integer operator, C semantics
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`, truncating
    Div,
    /// `a % b`
    Rem,
}

impl BinOp {
    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
        }
    }

    fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Sub => 1,
            Self::Mul | Self::Div | Self::Rem => 2,
        }
    }
}

/// An integer expression over named kernel variables
///
/// Built with the arithmetic operators, which fold constants and drop
/// identities so the printed source stays readable. [`IndexExpr::eval`]
/// computes the same value on the host.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexExpr {
    /// Integer literal
    Lit(i64),
    /// Kernel variable
    Var(String),
    /// Binary operation
    Binary(BinOp, Box<IndexExpr>, Box<IndexExpr>),
}

impl IndexExpr {
    /// Literal from an extent or stride
    pub fn lit(value: usize) -> Self {
        Self::Lit(value as i64)
    }

    /// Variable reference
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    fn literal(&self) -> Option<i64> {
        match self {
            Self::Lit(v) => Some(*v),
            _ => None,
        }
    }

    /// Sum of all `terms`, `0` when empty
    pub fn sum(terms: impl IntoIterator<Item = Self>) -> Self {
        terms.into_iter().fold(Self::Lit(0), |acc, t| acc + t)
    }

    /// Evaluate with variable values from `lookup`
    ///
    /// Returns `None` for an unbound variable or a division by zero.
    pub fn eval<F>(&self, lookup: &F) -> Option<i64>
    where
        F: Fn(&str) -> Option<i64>,
    {
        match self {
            Self::Lit(v) => Some(*v),
            Self::Var(name) => lookup(name),
            Self::Binary(op, lhs, rhs) => {
                let a = lhs.eval(lookup)?;
                let b = rhs.eval(lookup)?;
                match op {
                    BinOp::Add => Some(a + b),
                    BinOp::Sub => Some(a - b),
                    BinOp::Mul => Some(a * b),
                    BinOp::Div => a.checked_div(b),
                    BinOp::Rem => a.checked_rem(b),
                }
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Binary(op, _, _) => op.precedence(),
            _ => u8::MAX,
        }
    }
}

impl Add for IndexExpr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match (self.literal(), rhs.literal()) {
            (Some(a), Some(b)) => Self::Lit(a + b),
            (Some(0), _) => rhs,
            (_, Some(0)) => self,
            _ => binary(BinOp::Add, self, rhs),
        }
    }
}

impl Sub for IndexExpr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match (self.literal(), rhs.literal()) {
            (Some(a), Some(b)) => Self::Lit(a - b),
            (_, Some(0)) => self,
            _ => binary(BinOp::Sub, self, rhs),
        }
    }
}

impl Mul for IndexExpr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        match (self.literal(), rhs.literal()) {
            (Some(a), Some(b)) => Self::Lit(a * b),
            (Some(0), _) | (_, Some(0)) => Self::Lit(0),
            (Some(1), _) => rhs,
            (_, Some(1)) => self,
            _ => binary(BinOp::Mul, self, rhs),
        }
    }
}

impl Div for IndexExpr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        match (self.literal(), rhs.literal()) {
            (Some(a), Some(b)) if b != 0 => Self::Lit(a / b),
            (_, Some(1)) => self,
            _ => binary(BinOp::Div, self, rhs),
        }
    }
}

impl Rem for IndexExpr {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self {
        match (self.literal(), rhs.literal()) {
            (Some(a), Some(b)) if b != 0 => Self::Lit(a % b),
            (_, Some(1)) => Self::Lit(0),
            _ => binary(BinOp::Rem, self, rhs),
        }
    }
}

fn binary(op: BinOp, lhs: IndexExpr, rhs: IndexExpr) -> IndexExpr {
    IndexExpr::Binary(op, Box::new(lhs), Box::new(rhs))
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lit(v) => write!(f, "{v}"),
            Self::Var(name) => f.write_str(name),
            Self::Binary(op, lhs, rhs) => {
                let prec = op.precedence();
                // operators are left-associative, so a right operand of equal
                // precedence needs parentheses
                if lhs.precedence() < prec {
                    write!(f, "({lhs})")?;
                } else {
                    write!(f, "{lhs}")?;
                }
                write!(f, " {} ", op.symbol())?;
                if rhs.precedence() <= prec {
                    write!(f, "({rhs})")
                } else {
                    write!(f, "{rhs}")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x() -> IndexExpr {
        IndexExpr::var("x")
    }

    fn lit(v: usize) -> IndexExpr {
        IndexExpr::lit(v)
    }

    #[test]
    fn test_simplification() {
        assert_eq!(x() / lit(1), x());
        assert_eq!(x() * lit(1), x());
        assert_eq!(x() * lit(0), IndexExpr::Lit(0));
        assert_eq!(x() + lit(0), x());
        assert_eq!(x() % lit(1), IndexExpr::Lit(0));
        assert_eq!(lit(9) - lit(4), IndexExpr::Lit(5));
        assert_eq!(IndexExpr::sum([]), IndexExpr::Lit(0));
    }

    #[test]
    fn test_display_precedence() {
        assert_eq!((x() / lit(3) % lit(4)).to_string(), "x / 3 % 4");
        assert_eq!((x() * (IndexExpr::var("y") + lit(2))).to_string(), "x * (y + 2)");
        assert_eq!((lit(9) - IndexExpr::var("c") * lit(4)).to_string(), "9 - c * 4");
        assert_eq!(
            (x() - (IndexExpr::var("y") - IndexExpr::var("z"))).to_string(),
            "x - (y - z)"
        );
    }

    #[test]
    fn test_eval() {
        let e = x() / lit(3) % lit(4) * lit(9);
        let lookup = |name: &str| (name == "x").then_some(10);
        assert_eq!(e.eval(&lookup), Some(27));
        assert_eq!(IndexExpr::var("y").eval(&lookup), None);
        assert_eq!((x() / x()).eval(&|_: &str| Some(0)), None);
    }
}
