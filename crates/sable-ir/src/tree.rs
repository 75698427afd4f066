//! The node arena and the structural mutation protocol.

use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

use crate::arena::Arena;
use crate::error::IrError;
use crate::info_sink::SourceLoc;
use crate::node::{Node, NodeId, NodeKind};
use crate::types::Type;

/// Owns every node of one compile.
///
/// Subtrees that are abandoned (for example, operands replaced by a folded
/// constant) stay allocated until the tree itself is dropped; only
/// [`Tree::remove`] vacates slots early.
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Arena<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a detached node.
    pub fn add(&mut self, loc: SourceLoc, kind: NodeKind) -> NodeId {
        self.nodes.append(Node::new(loc, kind))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.try_get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.try_get_mut(id)
    }

    pub fn try_node(&self, id: NodeId) -> Result<&Node, IrError> {
        match self.nodes.try_get(id) {
            Some(node) => Ok(node),
            None if id.index() < self.nodes.len() => Err(IrError::Removed(id.index())),
            None => Err(IrError::BadHandle {
                index: id.index(),
                size: self.nodes.len(),
            }),
        }
    }

    /// The value type of `id`, or `None` for untyped or missing nodes.
    pub fn typed(&self, id: NodeId) -> Option<&Type> {
        self.get(id).and_then(Node::ty)
    }

    /// Like [`Tree::typed`], but reports why no type is available.
    pub fn try_type(&self, id: NodeId) -> Result<&Type, IrError> {
        self.try_node(id)?
            .ty()
            .ok_or(IrError::NotTyped(id.index()))
    }

    pub fn loc(&self, id: NodeId) -> Option<SourceLoc> {
        self.get(id).map(|n| n.loc)
    }

    pub fn set_loc(&mut self, id: NodeId, loc: SourceLoc) {
        if let Some(node) = self.get_mut(id) {
            node.loc = loc;
        }
    }

    /// Returns `true` if `id` still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains(id)
    }

    /// Number of live nodes.
    pub fn live_count(&self) -> usize {
        self.nodes.live_count()
    }

    /// Iterates every live node, attached or not.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter()
    }

    /// Replaces the direct child `original` of `parent` with `replacement`.
    ///
    /// Returns `false` and leaves the tree untouched when `original` is not
    /// literally one of `parent`'s children.
    pub fn replace_child_node(
        &mut self,
        parent: NodeId,
        original: NodeId,
        replacement: NodeId,
    ) -> bool {
        match self.get_mut(parent) {
            Some(node) => node.replace_child(original, replacement),
            None => false,
        }
    }

    /// Appends the direct children of `id` in canonical order.
    pub fn enqueue_children(&self, id: NodeId, queue: &mut VecDeque<NodeId>) {
        if let Some(node) = self.get(id) {
            node.push_children(queue);
        }
    }

    /// Frees the subtree reachable from `root`. Each node is freed once
    /// even if it is reachable twice; returns the number of nodes freed.
    pub fn remove(&mut self, root: Option<NodeId>) -> usize {
        let mut stack: Vec<NodeId> = root.into_iter().collect();
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(id) {
                node.push_children(&mut stack);
                freed += 1;
            }
        }
        freed
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for Tree {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ConstantUnion;
    use crate::node::{Aggregate, Binary, Branch, Constant};
    use crate::ops::Op;
    use crate::types::BasicType;

    fn int(tree: &mut Tree, v: i32) -> NodeId {
        tree.add(
            SourceLoc::default(),
            NodeKind::Constant(Constant {
                values: vec![ConstantUnion::Int(v)],
                ty: Type::scalar(BasicType::Int),
            }),
        )
    }

    fn add(tree: &mut Tree, l: NodeId, r: NodeId) -> NodeId {
        tree.add(
            SourceLoc::default(),
            NodeKind::Binary(Binary {
                op: Op::Add,
                left: l,
                right: r,
                ty: Type::scalar(BasicType::Int),
            }),
        )
    }

    #[test]
    fn typed_view_is_empty_for_branches() {
        let mut tree = Tree::new();
        let c = int(&mut tree, 1);
        let ret = tree.add(
            SourceLoc::default(),
            NodeKind::Branch(Branch {
                op: Op::Return,
                expression: Some(c),
            }),
        );
        assert!(tree.typed(c).is_some());
        assert!(tree.typed(ret).is_none());
        assert!(matches!(tree.try_type(ret), Err(IrError::NotTyped(_))));
    }

    #[test]
    fn replace_child_node_rejects_non_children() {
        let mut tree = Tree::new();
        let a = int(&mut tree, 1);
        let b = int(&mut tree, 2);
        let sum = add(&mut tree, a, b);
        let inner = add(&mut tree, a, b);
        let fresh = int(&mut tree, 3);

        // `inner` is not a child of `sum`, even though it shares children.
        assert!(!tree.replace_child_node(sum, inner, fresh));
        assert_eq!(tree[sum].children(), vec![a, b]);

        assert!(tree.replace_child_node(sum, a, fresh));
        assert_eq!(tree[sum].children(), vec![fresh, b]);
    }

    #[test]
    fn enqueue_children_appends_in_order() {
        let mut tree = Tree::new();
        let a = int(&mut tree, 1);
        let b = int(&mut tree, 2);
        let c = int(&mut tree, 3);
        let mut agg = Aggregate::new(Op::Sequence);
        agg.sequence = vec![c, a, b];
        let seq = tree.add(SourceLoc::default(), NodeKind::Aggregate(agg));

        let mut queue = VecDeque::from([seq]);
        tree.enqueue_children(seq, &mut queue);
        assert_eq!(queue, VecDeque::from([seq, c, a, b]));
    }

    #[test]
    fn remove_frees_subtree_once() {
        let mut tree = Tree::new();
        let a = int(&mut tree, 1);
        let b = int(&mut tree, 2);
        let sum = add(&mut tree, a, b);
        let unrelated = int(&mut tree, 9);

        assert_eq!(tree.remove(Some(sum)), 3);
        assert_eq!(tree.remove(Some(sum)), 0);
        assert_eq!(tree.remove(None), 0);
        assert!(!tree.contains(a));
        assert!(tree.contains(unrelated));
        assert_eq!(tree.live_count(), 1);
        assert!(matches!(tree.try_node(a), Err(IrError::Removed(_))));
    }
}
