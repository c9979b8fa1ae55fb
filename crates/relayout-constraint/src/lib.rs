//! Geometric constraints between a box's attributes.
//!
//! Every box carries Left/Right/Width/HCenter on the horizontal axis and
//! Top/Bottom/Height/VCenter on the vertical axis. Two values per axis fix
//! the other two; [`AttributeSet`] stores resolved values and fills in the
//! implied ones as soon as they become derivable.

mod attributes;

pub use attributes::AttributeSet;
