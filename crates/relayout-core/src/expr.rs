//! Layout expressions.
//!
//! An [`Expr`] is an immutable tree of constants, references to other boxes'
//! attributes and binary operators. Expressions are built with the factory
//! functions and operator overloads below:
//!
//! ```
//! use relayout_core::{Attribute, Expr};
//!
//! let width = Expr::parent(Attribute::Width) * 0.3 + 10 - 30;
//! assert_eq!(width.to_string(), "parent.width * 0.3 + 10 - 30");
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use crate::errors::EvalError;
use crate::types::{Attribute, BinaryOp, Relation};

/// Source of resolved attribute values for expression evaluation.
///
/// Implemented by the layout tree for a particular box; `lookup` locates the
/// box reached through `relation` and reads its resolved `attribute`.
pub trait AttributeSource {
    fn lookup(&self, relation: Relation, attribute: Attribute) -> Result<f64, EvalError>;
}

/// A layout expression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    Constant(f64),
    Reference {
        relation: Relation,
        attribute: Attribute,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn reference(relation: Relation, attribute: Attribute) -> Self {
        Expr::Reference { relation, attribute }
    }

    /// An attribute of the box the expression is attached to.
    pub fn this(attribute: Attribute) -> Self {
        Self::reference(Relation::This, attribute)
    }

    pub fn parent(attribute: Attribute) -> Self {
        Self::reference(Relation::Parent, attribute)
    }

    pub fn previous(attribute: Attribute) -> Self {
        Self::reference(Relation::PreviousSibling, attribute)
    }

    pub fn next(attribute: Attribute) -> Self {
        Self::reference(Relation::NextSibling, attribute)
    }

    pub fn binary(op: BinaryOp, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    pub fn min(self, other: impl Into<Expr>) -> Self {
        Self::binary(BinaryOp::Min, self, other)
    }

    pub fn max(self, other: impl Into<Expr>) -> Self {
        Self::binary(BinaryOp::Max, self, other)
    }

    /// Evaluate against a box context.
    ///
    /// Binary operators evaluate their left operand first and return its
    /// error without touching the right operand, so the reported error names
    /// the leftmost reference that blocked progress.
    pub fn evaluate(&self, source: &impl AttributeSource) -> Result<f64, EvalError> {
        match self {
            Expr::Constant(value) => Ok(*value),
            Expr::Reference { relation, attribute } => source.lookup(*relation, *attribute),
            Expr::Binary { op, left, right } => {
                let l = left.evaluate(source)?;
                let r = right.evaluate(source)?;
                Ok(op.apply(l, r))
            }
        }
    }

    /// All references in this expression, left to right.
    pub fn references(&self) -> Vec<(Relation, Attribute)> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs);
        refs
    }

    fn collect_references(&self, refs: &mut Vec<(Relation, Attribute)>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Reference { relation, attribute } => refs.push((*relation, *attribute)),
            Expr::Binary { left, right, .. } => {
                left.collect_references(refs);
                right.collect_references(refs);
            }
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary { op, .. } => op.precedence(),
            _ => u8::MAX,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, wrap: bool) -> fmt::Result {
        if wrap {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{}", value),
            Expr::Reference { relation, attribute } => write!(f, "{}.{}", relation, attribute),
            Expr::Binary { op: op @ (BinaryOp::Min | BinaryOp::Max), left, right } => {
                write!(f, "{}({}, {})", op.symbol(), left, right)
            }
            Expr::Binary { op, left, right } => {
                let prec = op.precedence();
                left.fmt_operand(f, left.precedence() < prec)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f, right.precedence() <= prec)
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Constant(value)
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Constant(value as f64)
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<i32> for Expr {
            type Output = Expr;
            fn $method(self, rhs: i32) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<Expr> for i32 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOp::Add);
impl_binary_operator!(Sub, sub, BinaryOp::Sub);
impl_binary_operator!(Mul, mul, BinaryOp::Mul);
impl_binary_operator!(Div, div, BinaryOp::Div);
