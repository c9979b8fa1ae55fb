//! Multi-pass expression solver.
//!
//! A pass walks a subtree in preorder and evaluates every expression whose
//! attribute is still unresolved, in the slot order Left, Right, Width,
//! HCenter, Top, Bottom, Height, VCenter. Each pass can move the resolution
//! frontier one hop along a chain of references, so a chain of `k` boxes
//! that each depend on a box visited later needs `k` passes.

use relayout_core::{Attribute, EvalError, LayoutError};
use thiserror::Error;
use tracing::{debug, trace};

use crate::eval::BoxContext;
use crate::tree::{BoxId, BoxTree};

/// Options for resolving a box tree.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// Maximum number of passes; at least one pass always runs
    pub max_rounds: usize,
    /// Stop as soon as an incomplete pass resolves nothing new
    pub stop_on_stall: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            stop_on_stall: true,
        }
    }
}

impl ResolveOptions {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

/// An expression that failed to evaluate during a pass.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{label}.{attribute} = {expression}: {error}")]
pub struct Diagnostic {
    pub node: BoxId,
    pub label: String,
    pub attribute: Attribute,
    pub expression: String,
    pub error: EvalError,
}

/// Outcome of a single pass.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    /// Some expression could not be evaluated
    pub incomplete: bool,
    /// Attributes newly resolved by this pass, derived ones included
    pub resolved: usize,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of a full resolve.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The last pass evaluated every expression
    pub complete: bool,
    /// Number of passes run
    pub rounds: usize,
    /// Failures of the last pass; empty when complete
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolution {
    /// Diagnostics rendered as strings.
    pub fn messages(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.to_string()).collect()
    }

    /// Turn an unconverged resolution into an error.
    pub fn into_result(self) -> Result<Resolution, LayoutError> {
        if self.complete {
            Ok(self)
        } else {
            Err(LayoutError::Unconverged {
                rounds: self.rounds,
                diagnostics: self.messages(),
            })
        }
    }
}

/// Drives evaluation passes over a box tree.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    options: ResolveOptions,
}

impl Solver {
    pub fn new(options: ResolveOptions) -> Self {
        Self { options }
    }

    /// Resolve the subtree rooted at `root`.
    ///
    /// Passes run until one evaluates every pending expression or the round
    /// budget is spent. An unconverged tree is not an error here; check
    /// [`Resolution::complete`] or call [`Resolution::into_result`].
    pub fn resolve(&self, tree: &mut BoxTree, root: BoxId) -> Result<Resolution, LayoutError> {
        if tree.get(root).is_none() {
            return Err(LayoutError::UnknownBox { index: root.index() });
        }

        let max_rounds = self.options.max_rounds.max(1);
        let mut rounds = 0;
        let mut report = PassReport::default();

        while rounds < max_rounds {
            rounds += 1;
            report = run_pass(tree, root);
            debug!(
                round = rounds,
                resolved = report.resolved,
                failures = report.diagnostics.len(),
                "layout pass finished"
            );

            if !report.incomplete {
                break;
            }
            if self.options.stop_on_stall && report.resolved == 0 {
                debug!(round = rounds, "layout pass made no progress, stopping");
                break;
            }
        }

        let complete = !report.incomplete;
        Ok(Resolution {
            complete,
            rounds,
            diagnostics: if complete { Vec::new() } else { report.diagnostics },
        })
    }
}

/// Resolve `root` with a round budget and stall detection on.
pub fn resolve(tree: &mut BoxTree, root: BoxId, max_rounds: usize) -> Result<Resolution, LayoutError> {
    Solver::new(ResolveOptions::default().with_max_rounds(max_rounds)).resolve(tree, root)
}

/// Run one evaluation pass over the subtree rooted at `root`.
pub fn run_pass(tree: &mut BoxTree, root: BoxId) -> PassReport {
    let mut report = PassReport::default();

    for id in tree.descendants(root) {
        for attribute in Attribute::ALL {
            // Derivation from an earlier slot may already have filled this one.
            let outcome = {
                let Some(node) = tree.get(id) else { continue };
                let Some(expr) = node.expr(attribute) else { continue };
                if node.attributes().is_resolved(attribute) {
                    continue;
                }
                expr.evaluate(&BoxContext::new(tree, id))
                    .map_err(|error| (expr.to_string(), error))
            };

            match outcome {
                Ok(value) => {
                    let before = resolved_count(tree, id);
                    let written = tree.resolve_slot(id, attribute, value);
                    debug_assert!(written, "slot was checked unresolved");
                    report.resolved += resolved_count(tree, id) - before;
                }
                Err((expression, error)) => {
                    let diagnostic = Diagnostic {
                        node: id,
                        label: tree.label(id),
                        attribute,
                        expression,
                        error,
                    };
                    trace!(%diagnostic, "expression not resolved");
                    report.incomplete = true;
                    report.diagnostics.push(diagnostic);
                }
            }
        }
    }

    report
}

fn resolved_count(tree: &BoxTree, id: BoxId) -> usize {
    tree.attributes(id).map_or(0, |attrs| attrs.resolved_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::LayoutBox;
    use relayout_core::{Expr, Relation};

    fn value(tree: &BoxTree, id: BoxId, attribute: Attribute) -> f64 {
        tree.attributes(id)
            .and_then(|attrs| attrs.get(attribute))
            .unwrap_or_else(|| panic!("{}.{} unresolved", tree.label(id), attribute))
    }

    /// Root with width 200 and three children referencing each other.
    fn sibling_scenario() -> (BoxTree, BoxId, [BoxId; 3]) {
        let mut tree = BoxTree::new();
        let root = tree.add_root(LayoutBox::new().with_name("root").with(Attribute::Width, 200));
        let a = tree
            .add_child(
                root,
                LayoutBox::new()
                    .with_name("a")
                    .with(Attribute::Left, 20)
                    .with(Attribute::Width, Expr::parent(Attribute::Width) * 0.3 + 10 - 30),
            )
            .unwrap();
        let b = tree
            .add_child(
                root,
                LayoutBox::new()
                    .with_name("b")
                    .with(Attribute::Left, Expr::previous(Attribute::Left) + 20)
                    .with(
                        Attribute::Width,
                        Expr::next(Attribute::Left) - Expr::this(Attribute::Left),
                    ),
            )
            .unwrap();
        let c = tree
            .add_child(
                root,
                LayoutBox::new()
                    .with_name("c")
                    .with(Attribute::Left, Expr::previous(Attribute::Left) + 80),
            )
            .unwrap();
        (tree, root, [a, b, c])
    }

    /// `k` siblings where each left edge depends on the next sibling's, so
    /// every pass resolves exactly one more box.
    fn backward_chain(k: usize) -> (BoxTree, BoxId) {
        let mut tree = BoxTree::new();
        let root = tree.add_root(LayoutBox::new());
        for i in 0..k {
            let node = if i + 1 == k {
                LayoutBox::new().with(Attribute::Left, 0)
            } else {
                LayoutBox::new().with(Attribute::Left, Expr::next(Attribute::Left) - 10)
            };
            tree.add_child(root, node).unwrap();
        }
        (tree, root)
    }

    #[test]
    fn test_sibling_scenario() {
        let (mut tree, root, [a, b, c]) = sibling_scenario();

        let result = resolve(&mut tree, root, 1).unwrap();
        assert!(!result.complete);
        assert_eq!(result.rounds, 1);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].node, b);
        assert_eq!(result.diagnostics[0].attribute, Attribute::Width);

        let result = resolve(&mut tree, root, 3).unwrap();
        assert!(result.complete);
        assert!(result.diagnostics.is_empty());

        assert!((value(&tree, a, Attribute::Width) - 40.0).abs() < 1e-9);
        assert!((value(&tree, b, Attribute::Left) - 40.0).abs() < 1e-9);
        assert!((value(&tree, b, Attribute::Width) - 80.0).abs() < 1e-9);
        assert!((value(&tree, c, Attribute::Left) - 120.0).abs() < 1e-9);
        assert!((value(&tree, b, Attribute::Right) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_converges_in_two_rounds() {
        let (mut tree, root, _) = sibling_scenario();
        let result = resolve(&mut tree, root, 3).unwrap();
        assert!(result.complete);
        assert_eq!(result.rounds, 2);
    }

    #[test]
    fn test_diagnostic_message() {
        let (mut tree, root, _) = sibling_scenario();
        let result = resolve(&mut tree, root, 1).unwrap();
        assert_eq!(
            result.messages(),
            vec!["b.width = next.left - this.left: next.left not yet resolved".to_string()]
        );
    }

    #[test]
    fn test_convergence_bound() {
        for k in 2..6 {
            let (mut tree, root) = backward_chain(k);
            let result = resolve(&mut tree, root, k - 1).unwrap();
            assert!(!result.complete, "chain of {k} resolved in {} rounds", k - 1);
            assert!(!result.diagnostics.is_empty());

            let (mut tree, root) = backward_chain(k);
            let result = resolve(&mut tree, root, k).unwrap();
            assert!(result.complete, "chain of {k} unresolved after {k} rounds");
            assert_eq!(result.rounds, k);
        }
    }

    #[test]
    fn test_chain_values() {
        let (mut tree, root) = backward_chain(4);
        resolve(&mut tree, root, 4).unwrap().into_result().unwrap();
        let children = tree.get(root).unwrap().children().to_vec();
        let lefts: Vec<f64> = children.iter().map(|&id| value(&tree, id, Attribute::Left)).collect();
        assert_eq!(lefts, vec![-30.0, -20.0, -10.0, 0.0]);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (mut tree, root, _) = sibling_scenario();
        resolve(&mut tree, root, 3).unwrap();
        let before: Vec<_> = tree
            .descendants(root)
            .into_iter()
            .map(|id| *tree.attributes(id).unwrap())
            .collect();

        let report = run_pass(&mut tree, root);
        assert!(!report.incomplete);
        assert_eq!(report.resolved, 0);

        let result = resolve(&mut tree, root, 3).unwrap();
        assert!(result.complete);
        assert_eq!(result.rounds, 1);
        let after: Vec<_> = tree
            .descendants(root)
            .into_iter()
            .map(|id| *tree.attributes(id).unwrap())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_replaced_expression_needs_clear_before_resolve() {
        let mut tree = BoxTree::new();
        let root = tree.add_root(
            LayoutBox::new()
                .with(Attribute::Left, 0)
                .with(Attribute::Width, 10),
        );
        resolve(&mut tree, root, 3).unwrap();

        tree.get_mut(root).unwrap().set_expr(Attribute::Left, 50);
        let result = resolve(&mut tree, root, 3).unwrap();
        assert!(result.complete);
        assert!((value(&tree, root, Attribute::Left) - 0.0).abs() < 1e-9);

        tree.clear_resolved(root).unwrap();
        let result = resolve(&mut tree, root, 3).unwrap();
        assert!(result.complete);
        assert!((value(&tree, root, Attribute::Left) - 50.0).abs() < 1e-9);
        assert!((value(&tree, root, Attribute::Right) - 60.0).abs() < 1e-9);
        assert!((value(&tree, root, Attribute::HCenter) - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_stall_stops_early_with_same_outcome() {
        let build = || {
            let mut tree = BoxTree::new();
            let root = tree.add_root(LayoutBox::new().with(Attribute::Left, Expr::parent(Attribute::Left)));
            (tree, root)
        };

        let (mut tree, root) = build();
        let stalled = Solver::new(ResolveOptions::default().with_max_rounds(5))
            .resolve(&mut tree, root)
            .unwrap();

        let (mut tree, root) = build();
        let exhaustive = Solver::new(ResolveOptions { max_rounds: 5, stop_on_stall: false })
            .resolve(&mut tree, root)
            .unwrap();

        assert_eq!(stalled.rounds, 1);
        assert_eq!(exhaustive.rounds, 5);
        assert!(!stalled.complete && !exhaustive.complete);
        assert_eq!(stalled.diagnostics, exhaustive.diagnostics);
        assert_eq!(stalled.diagnostics[0].error, EvalError::NoParent);
    }

    #[test]
    fn test_derivation_preempts_later_slot() {
        let mut tree = BoxTree::new();
        let root = tree.add_root(
            LayoutBox::new()
                .with(Attribute::Left, 0)
                .with(Attribute::Right, 100)
                // Width is already derived from Left and Right when its slot comes up.
                .with(Attribute::Width, 50),
        );
        let result = resolve(&mut tree, root, 1).unwrap();
        assert!(result.complete);
        assert!((value(&tree, root, Attribute::Width) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_root_without_parent_is_reported() {
        let mut tree = BoxTree::new();
        let root = tree.add_root(LayoutBox::new().with(Attribute::Width, Expr::parent(Attribute::Width)));
        let result = resolve(&mut tree, root, 3).unwrap();
        assert!(!result.complete);
        assert_eq!(result.diagnostics[0].error, EvalError::NoParent);
        assert!(matches!(
            result.into_result(),
            Err(LayoutError::Unconverged { rounds: 1, .. })
        ));
    }

    #[test]
    fn test_first_child_previous_is_reported() {
        let mut tree = BoxTree::new();
        let root = tree.add_root(LayoutBox::new());
        tree.add_child(root, LayoutBox::new().with(Attribute::Top, Expr::previous(Attribute::Bottom)))
            .unwrap();
        let result = resolve(&mut tree, root, 2).unwrap();
        assert_eq!(
            result.diagnostics[0].error,
            EvalError::NoSuchSibling { relation: Relation::PreviousSibling }
        );
    }

    #[test]
    fn test_full_frames_after_resolve() {
        let mut tree = BoxTree::new();
        let root = tree.add_root(
            LayoutBox::new()
                .with(Attribute::Left, 0)
                .with(Attribute::Right, 300)
                .with(Attribute::Top, 0)
                .with(Attribute::Height, 500),
        );
        let card = tree
            .add_child(
                root,
                LayoutBox::new()
                    .with(Attribute::Left, Expr::parent(Attribute::Width) * 0.3)
                    .with(Attribute::Width, Expr::parent(Attribute::Width) * 0.4 - 40)
                    .with(Attribute::VCenter, Expr::parent(Attribute::Height) * 0.5)
                    .with(Attribute::Height, 100),
            )
            .unwrap();
        let strip = tree
            .add_child(
                root,
                LayoutBox::new()
                    .with(Attribute::Left, 0)
                    .with(Attribute::Top, Expr::previous(Attribute::Top))
                    .with(Attribute::Width, Expr::previous(Attribute::Width) * 2)
                    .with(Attribute::Height, 20),
            )
            .unwrap();

        resolve(&mut tree, root, 3).unwrap().into_result().unwrap();

        let frames = tree.frames(root);
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[&root], crate::Bounds::new(0.0, 0.0, 300.0, 500.0));
        let card_frame = frames[&card];
        assert!((card_frame.x - 90.0).abs() < 1e-9);
        assert!((card_frame.y - 200.0).abs() < 1e-9);
        assert!((card_frame.width - 80.0).abs() < 1e-9);
        let strip_frame = frames[&strip];
        assert!((strip_frame.y - 200.0).abs() < 1e-9);
        assert!((strip_frame.width - 160.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_root() {
        let mut tree = BoxTree::new();
        let root = tree.add_root(LayoutBox::new());
        let mut other = BoxTree::new();
        assert!(matches!(
            resolve(&mut other, root, 3),
            Err(LayoutError::UnknownBox { index: 0 })
        ));
    }
}
