//! Error types for the relayout engine.

use crate::types::{Attribute, Relation};
use thiserror::Error;

/// Why an expression could not be evaluated.
///
/// All variants are retryable while a tree is being solved: a later pass may
/// have resolved the missing value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("box has no parent")]
    NoParent,

    #[error("box has no {relation} sibling")]
    NoSuchSibling { relation: Relation },

    #[error("{relation}.{attribute} not yet resolved")]
    NotYetResolved {
        relation: Relation,
        attribute: Attribute,
    },
}

/// Errors from tree operations and layout readout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Unknown box index {index}")]
    UnknownBox { index: usize },

    #[error("Box {name} is missing resolved {}", format_attributes(.missing))]
    Unresolved { name: String, missing: Vec<Attribute> },

    #[error("Layout did not converge after {rounds} rounds: {}", .diagnostics.join("; "))]
    Unconverged { rounds: usize, diagnostics: Vec<String> },

    #[error("Evaluation failed: {0}")]
    Eval(#[from] EvalError),
}

fn format_attributes(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(|a| a.name())
        .collect::<Vec<_>>()
        .join(", ")
}
