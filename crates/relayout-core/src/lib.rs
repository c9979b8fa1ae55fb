//! Core types for the relayout engine.
//!
//! This crate provides the foundational types shared by the other relayout crates:
//! - Attribute, axis and relation vocabulary
//! - The expression tree and its evaluator
//! - Error types

pub mod errors;
pub mod expr;
pub mod types;

pub use errors::*;
pub use expr::{AttributeSource, Expr};
pub use types::*;
