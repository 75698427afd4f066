//! Generic tree walkers.
//!
//! [`Tree::traverse`] is a depth-first, pre-order walk that calls back into
//! a [`Traverser`]. Interior nodes are visited before their children
//! ([`Visit::Pre`]), between binary operands ([`Visit::In`]) and after
//! their children ([`Visit::Post`]). Returning `false` from a pre-visit
//! skips the children and the remaining visits of that node.
//!
//! [`Tree::breadth_first`] yields nodes level by level using the canonical
//! child order of [`Tree::enqueue_children`].

use std::collections::VecDeque;

use crate::node::{Aggregate, Binary, Branch, Constant, Loop, NodeId, NodeKind, Selection, Symbol, Unary};
use crate::tree::Tree;

/// Which of the visits of an interior node is being reported.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Visit {
    Pre,
    In,
    Post,
}

/// Callbacks for [`Tree::traverse`]. Every hook defaults to "continue".
#[allow(unused_variables)]
pub trait Traverser {
    fn visit_symbol(&mut self, depth: usize, id: NodeId, node: &Symbol) {}

    fn visit_constant(&mut self, depth: usize, id: NodeId, node: &Constant) {}

    fn visit_unary(&mut self, visit: Visit, depth: usize, id: NodeId, node: &Unary) -> bool {
        true
    }

    fn visit_binary(&mut self, visit: Visit, depth: usize, id: NodeId, node: &Binary) -> bool {
        true
    }

    fn visit_aggregate(
        &mut self,
        visit: Visit,
        depth: usize,
        id: NodeId,
        node: &Aggregate,
    ) -> bool {
        true
    }

    fn visit_selection(
        &mut self,
        visit: Visit,
        depth: usize,
        id: NodeId,
        node: &Selection,
    ) -> bool {
        true
    }

    fn visit_loop(&mut self, visit: Visit, depth: usize, id: NodeId, node: &Loop) -> bool {
        true
    }

    fn visit_branch(&mut self, visit: Visit, depth: usize, id: NodeId, node: &Branch) -> bool {
        true
    }
}

impl Tree {
    /// Walks the subtree rooted at `root` depth-first.
    ///
    /// Handles that no longer refer to a live node are skipped.
    pub fn traverse<T: Traverser + ?Sized>(&self, root: NodeId, traverser: &mut T) {
        self.traverse_at(root, 0, traverser);
    }

    fn traverse_at<T: Traverser + ?Sized>(&self, id: NodeId, depth: usize, t: &mut T) {
        let Some(node) = self.get(id) else {
            log::trace!("traverse: skipping dead handle {id:?}");
            return;
        };
        let child = depth + 1;
        match &node.kind {
            NodeKind::Symbol(n) => t.visit_symbol(depth, id, n),
            NodeKind::Constant(n) => t.visit_constant(depth, id, n),
            NodeKind::Unary(n) => {
                if t.visit_unary(Visit::Pre, depth, id, n) {
                    self.traverse_at(n.operand, child, t);
                    t.visit_unary(Visit::Post, depth, id, n);
                }
            }
            NodeKind::Binary(n) => {
                if t.visit_binary(Visit::Pre, depth, id, n) {
                    self.traverse_at(n.left, child, t);
                    if t.visit_binary(Visit::In, depth, id, n) {
                        self.traverse_at(n.right, child, t);
                    }
                    t.visit_binary(Visit::Post, depth, id, n);
                }
            }
            NodeKind::Aggregate(n) => {
                if t.visit_aggregate(Visit::Pre, depth, id, n) {
                    for (i, &c) in n.sequence.iter().enumerate() {
                        if i > 0 && !t.visit_aggregate(Visit::In, depth, id, n) {
                            break;
                        }
                        self.traverse_at(c, child, t);
                    }
                    t.visit_aggregate(Visit::Post, depth, id, n);
                }
            }
            NodeKind::Selection(n) => {
                if t.visit_selection(Visit::Pre, depth, id, n) {
                    self.traverse_at(n.condition, child, t);
                    for c in [n.true_block, n.false_block].into_iter().flatten() {
                        self.traverse_at(c, child, t);
                    }
                    t.visit_selection(Visit::Post, depth, id, n);
                }
            }
            NodeKind::Loop(n) => {
                if t.visit_loop(Visit::Pre, depth, id, n) {
                    for c in [n.init, n.cond, n.expr, n.body].into_iter().flatten() {
                        self.traverse_at(c, child, t);
                    }
                    t.visit_loop(Visit::Post, depth, id, n);
                }
            }
            NodeKind::Branch(n) => {
                if t.visit_branch(Visit::Pre, depth, id, n) {
                    if let Some(e) = n.expression {
                        self.traverse_at(e, child, t);
                    }
                    t.visit_branch(Visit::Post, depth, id, n);
                }
            }
        }
    }

    /// Level-order iterator over the subtree rooted at `root`.
    pub fn breadth_first(&self, root: NodeId) -> BreadthFirst<'_> {
        BreadthFirst {
            tree: self,
            queue: VecDeque::from([root]),
        }
    }

    /// Finds the node whose direct child is `target`, searching from `root`.
    pub fn find_parent(&self, root: NodeId, target: NodeId) -> Option<NodeId> {
        self.breadth_first(root)
            .find(|&id| self.get(id).is_some_and(|n| n.children().contains(&target)))
    }

    /// Replaces `original` wherever it hangs below `root`.
    ///
    /// Locates the immediate parent first, then performs a direct child
    /// replacement on it. Returns `false` if `original` is not reachable.
    pub fn replace_in_subtree(&mut self, root: NodeId, original: NodeId, replacement: NodeId) -> bool {
        match self.find_parent(root, original) {
            Some(parent) => self.replace_child_node(parent, original, replacement),
            None => false,
        }
    }
}

/// See [`Tree::breadth_first`].
pub struct BreadthFirst<'a> {
    tree: &'a Tree,
    queue: VecDeque<NodeId>,
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let id = self.queue.pop_front()?;
            if self.tree.contains(id) {
                self.tree.enqueue_children(id, &mut self.queue);
                return Some(id);
            }
        }
    }
}
