//! Box tree data structures.
//!
//! Boxes live in an arena owned by [`BoxTree`] and refer to each other by
//! [`BoxId`]. Each box keeps its parent's handle and an ordered list of child
//! handles; sibling lookups go through the parent's list.

use indexmap::IndexMap;
use relayout_constraint::AttributeSet;
use relayout_core::{Attribute, EvalError, Expr, LayoutError, Relation};
use smallvec::SmallVec;

use crate::eval::BoxContext;

/// Attributes an external frame consumer needs: origin and size.
const FRAME_ATTRIBUTES: [Attribute; 4] = [
    Attribute::Left,
    Attribute::Top,
    Attribute::Width,
    Attribute::Height,
];

/// Handle of a box in a [`BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(usize);

impl BoxId {
    /// Arena index of this box.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Axis-aligned rectangle handed to frame consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Create bounds with position and size.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Check if a point is inside the bounds.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

/// Consumer of resolved frames, e.g. a view hierarchy adapter.
pub trait FrameSink {
    fn apply_frame(&mut self, id: BoxId, name: Option<&str>, bounds: Bounds);
}

impl<F> FrameSink for F
where
    F: FnMut(BoxId, Option<&str>, Bounds),
{
    fn apply_frame(&mut self, id: BoxId, name: Option<&str>, bounds: Bounds) {
        self(id, name, bounds)
    }
}

/// A box in the layout tree.
#[derive(Debug, Clone, Default)]
pub struct LayoutBox {
    /// Optional name for diagnostics
    name: Option<String>,
    /// One optional expression per attribute slot
    exprs: [Option<Expr>; 8],
    /// Resolved values
    attributes: AttributeSet,
    /// Parent box (None for roots)
    parent: Option<BoxId>,
    /// Children in layout order
    children: SmallVec<[BoxId; 4]>,
}

impl LayoutBox {
    /// Create a box with no expressions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach an expression to an attribute slot.
    pub fn with(mut self, attribute: Attribute, expr: impl Into<Expr>) -> Self {
        self.set_expr(attribute, expr);
        self
    }

    /// Attach an expression, replacing any previous one for the slot.
    pub fn set_expr(&mut self, attribute: Attribute, expr: impl Into<Expr>) {
        self.exprs[attribute.index()] = Some(expr.into());
    }

    pub fn expr(&self, attribute: Attribute) -> Option<&Expr> {
        self.exprs[attribute.index()].as_ref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub fn parent(&self) -> Option<BoxId> {
        self.parent
    }

    pub fn children(&self) -> &[BoxId] {
        &self.children
    }
}

/// Arena owning every box of a layout.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    boxes: Vec<LayoutBox>,
    roots: Vec<BoxId>,
}

impl BoxTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box with no parent.
    pub fn add_root(&mut self, node: LayoutBox) -> BoxId {
        let id = self.insert(node, None);
        self.roots.push(id);
        id
    }

    /// Append a box to the end of `parent`'s children.
    pub fn add_child(&mut self, parent: BoxId, node: LayoutBox) -> Result<BoxId, LayoutError> {
        self.check(parent)?;
        let id = self.insert(node, Some(parent));
        self.boxes[parent.0].children.push(id);
        Ok(id)
    }

    fn insert(&mut self, mut node: LayoutBox, parent: Option<BoxId>) -> BoxId {
        let id = BoxId(self.boxes.len());
        node.parent = parent;
        node.children.clear();
        self.boxes.push(node);
        id
    }

    /// Remove a box (with its subtree) from its parent. The box becomes a root.
    pub fn detach(&mut self, id: BoxId) -> Result<(), LayoutError> {
        self.check(id)?;
        let Some(parent) = self.boxes[id.0].parent.take() else {
            return Ok(());
        };
        self.boxes[parent.0].children.retain(|child| *child != id);
        self.roots.push(id);
        Ok(())
    }

    fn check(&self, id: BoxId) -> Result<(), LayoutError> {
        if id.0 < self.boxes.len() {
            Ok(())
        } else {
            Err(LayoutError::UnknownBox { index: id.0 })
        }
    }

    /// Get a box by ID.
    pub fn get(&self, id: BoxId) -> Option<&LayoutBox> {
        self.boxes.get(id.0)
    }

    /// Get a mutable box by ID.
    ///
    /// Replacing an expression does not touch values that are already
    /// resolved; call [`BoxTree::clear_resolved`] before resolving again.
    pub fn get_mut(&mut self, id: BoxId) -> Option<&mut LayoutBox> {
        self.boxes.get_mut(id.0)
    }

    pub fn roots(&self) -> &[BoxId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Resolved attributes of a box.
    pub fn attributes(&self, id: BoxId) -> Option<&AttributeSet> {
        self.get(id).map(|b| &b.attributes)
    }

    /// Resolve one attribute of a box whose handle came from this tree.
    pub(crate) fn resolve_slot(&mut self, id: BoxId, attribute: Attribute, value: f64) -> bool {
        self.boxes[id.0].attributes.set(attribute, value)
    }

    /// Resolve one attribute of a box and derive what its axis now implies.
    ///
    /// Returns `Ok(false)` if the attribute already had a value; it is kept.
    pub fn set_attribute(
        &mut self,
        id: BoxId,
        attribute: Attribute,
        value: f64,
    ) -> Result<bool, LayoutError> {
        self.check(id)?;
        Ok(self.boxes[id.0].attributes.set(attribute, value))
    }

    /// Label for diagnostics: the box name, or `#index`.
    pub fn label(&self, id: BoxId) -> String {
        match self.get(id).and_then(|b| b.name()) {
            Some(name) => name.to_string(),
            None => format!("#{}", id.0),
        }
    }

    /// Previous sibling of a box, if any.
    pub fn previous_sibling(&self, id: BoxId) -> Option<BoxId> {
        let (siblings, index) = self.sibling_index(id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Next sibling of a box, if any.
    pub fn next_sibling(&self, id: BoxId) -> Option<BoxId> {
        let (siblings, index) = self.sibling_index(id)?;
        siblings.get(index + 1).copied()
    }

    /// The parent's child list and this box's index in it.
    fn sibling_index(&self, id: BoxId) -> Option<(&[BoxId], usize)> {
        let parent = self.get(id)?.parent?;
        let siblings = self.get(parent)?.children();
        let index = siblings.iter().position(|child| *child == id)?;
        Some((siblings, index))
    }

    /// Find the box reached from `id` through `relation`.
    pub fn related(&self, id: BoxId, relation: Relation) -> Result<BoxId, EvalError> {
        match relation {
            Relation::This => Ok(id),
            Relation::Parent => self.get(id).and_then(|b| b.parent).ok_or(EvalError::NoParent),
            Relation::PreviousSibling => self
                .previous_sibling(id)
                .ok_or(EvalError::NoSuchSibling { relation }),
            Relation::NextSibling => self
                .next_sibling(id)
                .ok_or(EvalError::NoSuchSibling { relation }),
        }
    }

    /// Evaluate an expression in the context of a box.
    pub fn evaluate(&self, id: BoxId, expr: &Expr) -> Result<f64, LayoutError> {
        self.check(id)?;
        Ok(expr.evaluate(&BoxContext::new(self, id))?)
    }

    /// All boxes of the subtree rooted at `root`, in preorder.
    pub fn descendants(&self, root: BoxId) -> Vec<BoxId> {
        let mut order = Vec::new();
        if self.get(root).is_none() {
            return order;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.boxes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Forget every resolved value in a subtree so it can be solved again.
    pub fn clear_resolved(&mut self, root: BoxId) -> Result<(), LayoutError> {
        self.check(root)?;
        for id in self.descendants(root) {
            self.boxes[id.0].attributes.clear();
        }
        Ok(())
    }

    /// The resolved frame (Left, Top, Width, Height) of a box.
    pub fn frame(&self, id: BoxId) -> Result<Bounds, LayoutError> {
        let node = self.get(id).ok_or(LayoutError::UnknownBox { index: id.0 })?;
        let attrs = &node.attributes;
        match FRAME_ATTRIBUTES.map(|a| attrs.get(a)) {
            [Some(x), Some(y), Some(width), Some(height)] => Ok(Bounds::new(x, y, width, height)),
            _ => Err(LayoutError::Unresolved {
                name: self.label(id),
                missing: attrs.missing(&FRAME_ATTRIBUTES),
            }),
        }
    }

    /// Frames of every fully resolved box in a subtree, in preorder.
    pub fn frames(&self, root: BoxId) -> IndexMap<BoxId, Bounds> {
        self.descendants(root)
            .into_iter()
            .filter_map(|id| self.frame(id).ok().map(|bounds| (id, bounds)))
            .collect()
    }

    /// Hand every frame of a subtree to `sink`, in preorder.
    ///
    /// Fails without touching the sink if any box in the subtree is missing
    /// one of Left, Top, Width or Height.
    pub fn apply_frames(&self, root: BoxId, sink: &mut impl FrameSink) -> Result<(), LayoutError> {
        self.check(root)?;
        let frames = self
            .descendants(root)
            .into_iter()
            .map(|id| self.frame(id).map(|bounds| (id, bounds)))
            .collect::<Result<Vec<_>, _>>()?;

        for (id, bounds) in frames {
            sink.apply_frame(id, self.boxes[id.0].name(), bounds);
        }
        Ok(())
    }
}
