//! Expression evaluation against a box in a [`BoxTree`].

use relayout_core::{Attribute, AttributeSource, EvalError, Relation};

use crate::tree::{BoxId, BoxTree};

/// A box viewed as the context of an expression.
#[derive(Debug, Clone, Copy)]
pub struct BoxContext<'a> {
    tree: &'a BoxTree,
    id: BoxId,
}

impl<'a> BoxContext<'a> {
    pub fn new(tree: &'a BoxTree, id: BoxId) -> Self {
        Self { tree, id }
    }
}

impl AttributeSource for BoxContext<'_> {
    fn lookup(&self, relation: Relation, attribute: Attribute) -> Result<f64, EvalError> {
        let target = self.tree.related(self.id, relation)?;
        self.tree
            .attributes(target)
            .and_then(|attrs| attrs.get(attribute))
            .ok_or(EvalError::NotYetResolved { relation, attribute })
    }
}
