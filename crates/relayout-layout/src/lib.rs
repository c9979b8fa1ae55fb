//! Expression-driven box layout.
//!
//! Boxes in a [`BoxTree`] describe their edges with [`Expr`]essions that
//! reference the box itself, its parent or its neighbouring siblings. The
//! [`Solver`] evaluates those expressions pass after pass until every box is
//! resolved or the round budget runs out; each box's axes are completed from
//! any two known attributes as soon as possible.
//!
//! # Architecture
//!
//! 1. **Tree**: an arena of boxes addressed by [`BoxId`]
//! 2. **Evaluation**: expressions read resolved attributes through [`BoxContext`]
//! 3. **Solving**: bounded multi-pass driver with stall detection
//! 4. **Readout**: [`BoxTree::frame`] and [`BoxTree::apply_frames`] hand out
//!    origin and size per box
//!
//! # Example
//!
//! ```ignore
//! use relayout_layout::{resolve, Attribute, BoxTree, Expr, LayoutBox};
//!
//! let mut tree = BoxTree::new();
//! let root = tree.add_root(LayoutBox::new().with(Attribute::Width, 200));
//! let child = tree.add_child(
//!     root,
//!     LayoutBox::new()
//!         .with(Attribute::Left, 20)
//!         .with(Attribute::Width, Expr::parent(Attribute::Width) * 0.5),
//! )?;
//!
//! let resolution = resolve(&mut tree, root, 3)?.into_result()?;
//! println!("{:?}", tree.attributes(child));
//! ```

mod eval;
mod solver;
mod tree;

pub use eval::BoxContext;
pub use solver::{resolve, run_pass, Diagnostic, PassReport, Resolution, ResolveOptions, Solver};
pub use tree::{Bounds, BoxId, BoxTree, FrameSink, LayoutBox};

pub use relayout_constraint::AttributeSet;
pub use relayout_core::{Attribute, Axis, BinaryOp, EvalError, Expr, LayoutError, Relation};
