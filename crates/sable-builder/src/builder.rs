//! The IR builder façade called by the parser.
//!
//! Every operation takes a source location and either returns a fully typed
//! node or an error; a rejected node is never linked into the tree. When
//! all operands of an operator are constant leaves the result is folded
//! immediately and the constant is returned in place of the operator node.

use sable_ir::{
    Aggregate, Binary, Branch, Constant, ConstantUnion, InfoSink, Loop, LoopKind, Name, Node,
    NodeId, NodeKind, Op, Qualifier, Selection, SourceLoc, Symbol, Tree, Type, Unary,
};

use crate::error::BuildError;
use crate::fold::{fold_binary, fold_unary};
use crate::promote::{promote_binary, promote_unary};

/// An index expression whose result type is not known yet.
///
/// Produced by [`Builder::begin_index`]; nothing is allocated until
/// [`Builder::finish_index`] supplies the type.
#[must_use = "an index expression is only built by finish_index"]
#[derive(Clone, Copy, Debug)]
pub struct PendingIndex {
    op: Op,
    base: NodeId,
    index: NodeId,
    loc: SourceLoc,
}

impl PendingIndex {
    pub fn op(&self) -> Op {
        self.op
    }

    pub fn base(&self) -> NodeId {
        self.base
    }

    pub fn index(&self) -> NodeId {
        self.index
    }
}

/// Owns the tree and the diagnostic sink of one compile.
#[derive(Debug, Default)]
pub struct Builder {
    tree: Tree,
    sink: InfoSink,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn sink(&self) -> &InfoSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut InfoSink {
        &mut self.sink
    }

    /// Hands the finished tree and its diagnostics to the backend.
    pub fn into_parts(self) -> (Tree, InfoSink) {
        (self.tree, self.sink)
    }

    fn node(&self, id: NodeId) -> Result<&Node, BuildError> {
        Ok(self.tree.try_node(id)?)
    }

    fn type_of(&self, id: NodeId) -> Result<Type, BuildError> {
        self.node(id)?
            .ty()
            .cloned()
            .ok_or(BuildError::NotTyped(id))
    }

    fn constant(&self, id: NodeId) -> Option<&Constant> {
        self.tree.get(id).and_then(Node::as_constant)
    }

    fn is_constant(&self, id: NodeId) -> bool {
        self.constant(id).is_some()
    }

    // ------------------------------------------------------------------
    // Leaves
    // ------------------------------------------------------------------

    pub fn add_symbol(&mut self, id: i32, name: Name, ty: Type, loc: SourceLoc) -> NodeId {
        self.tree
            .add(loc, NodeKind::Symbol(Symbol { id, name, ty }))
    }

    /// A constant leaf; `values` must hold one entry per scalar component.
    pub fn add_constant(
        &mut self,
        values: Vec<ConstantUnion>,
        ty: Type,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        let expected = ty.object_size();
        if values.len() != expected {
            return Err(BuildError::SizeMismatch {
                expected,
                found: values.len(),
            });
        }
        Ok(self.tree.add(loc, NodeKind::Constant(Constant { values, ty })))
    }

    /// A `Sequence` aggregate of constant component offsets, e.g. `.xzy`.
    pub fn add_swizzle(&mut self, offsets: &[i32], loc: SourceLoc) -> NodeId {
        let const_int = Type::scalar(sable_ir::BasicType::Int).with_qualifier(Qualifier::Const);
        let mut agg = Aggregate::new(Op::Sequence);
        for &offset in offsets {
            agg.sequence.push(self.tree.add(
                loc,
                NodeKind::Constant(Constant {
                    values: vec![ConstantUnion::Int(offset)],
                    ty: const_int.clone(),
                }),
            ));
        }
        self.tree.add(loc, NodeKind::Aggregate(agg))
    }

    // ------------------------------------------------------------------
    // Operators
    // ------------------------------------------------------------------

    /// Builds `left op right`, promoting and folding where possible.
    pub fn add_binary_math(
        &mut self,
        op: Op,
        left: NodeId,
        right: NodeId,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        let left_ty = self.type_of(left)?;
        let right_ty = self.type_of(right)?;

        match op {
            Op::Equal | Op::NotEqual if left_ty.is_array() => {
                return Err(BuildError::ArrayOperand { op });
            }
            Op::LessThan | Op::GreaterThan | Op::LessThanEqual | Op::GreaterThanEqual
                if left_ty.is_matrix()
                    || left_ty.is_array()
                    || left_ty.is_vector()
                    || left_ty.is_struct() =>
            {
                return Err(BuildError::InvalidOperand {
                    op,
                    reason: "relational operators need scalar operands",
                });
            }
            Op::LogicalOr | Op::LogicalXor | Op::LogicalAnd
                if left_ty.basic != sable_ir::BasicType::Bool
                    || left_ty.is_matrix()
                    || left_ty.is_array()
                    || left_ty.is_vector() =>
            {
                return Err(BuildError::InvalidOperand {
                    op,
                    reason: "logical operators need scalar bool operands",
                });
            }
            Op::Add | Op::Sub | Op::Div | Op::Mul
                if left_ty.is_struct() || left_ty.basic == sable_ir::BasicType::Bool =>
            {
                return Err(BuildError::InvalidOperand {
                    op,
                    reason: "arithmetic needs numeric operands",
                });
            }
            _ => {}
        }

        if left_ty.basic != right_ty.basic {
            return Err(BuildError::KindMismatch {
                op,
                left: left_ty.basic,
                right: right_ty.basic,
            });
        }

        let (op, ty) = self.promote(op, &left_ty, &right_ty, loc)?;

        if let (Some(l), Some(r)) = (self.tree.get(left).and_then(Node::as_constant), self.tree.get(right).and_then(Node::as_constant)) {
            match fold_binary(op, l, r, loc, &mut self.sink) {
                Ok(folded) => return Ok(self.tree.add(loc, NodeKind::Constant(folded))),
                Err(e) => log::trace!("keeping unfolded {op:?} at {loc}: {e}"),
            }
        }

        Ok(self.tree.add(
            loc,
            NodeKind::Binary(Binary {
                op,
                left,
                right,
                ty,
            }),
        ))
    }

    fn promote(
        &mut self,
        op: Op,
        left: &Type,
        right: &Type,
        loc: SourceLoc,
    ) -> Result<(Op, Type), BuildError> {
        promote_binary(op, left, right).inspect_err(|e| {
            if matches!(e, BuildError::ArrayOperand { .. }) {
                self.sink.internal_error(loc, "Invalid operation for arrays");
            }
        })
    }

    /// Builds an assignment. Never folds.
    pub fn add_assign(
        &mut self,
        op: Op,
        left: NodeId,
        right: NodeId,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        let left_ty = self.type_of(left)?;
        let right_ty = self.type_of(right)?;
        if (left_ty.is_struct() || right_ty.is_struct()) && left_ty != right_ty {
            return Err(BuildError::StructMismatch);
        }

        let (op, ty) = self.promote(op, &left_ty, &right_ty, loc)?;
        Ok(self.tree.add(
            loc,
            NodeKind::Binary(Binary {
                op,
                left,
                right,
                ty,
            }),
        ))
    }

    /// First half of an index expression: checks the operands.
    pub fn begin_index(
        &self,
        op: Op,
        base: NodeId,
        index: NodeId,
        loc: SourceLoc,
    ) -> Result<PendingIndex, BuildError> {
        if !matches!(
            op,
            Op::IndexDirect | Op::IndexIndirect | Op::IndexDirectStruct | Op::IndexDirectInterfaceBlock
        ) {
            return Err(BuildError::InvalidOperand {
                op,
                reason: "not an indexing operator",
            });
        }
        self.type_of(base)?;
        self.type_of(index)?;
        Ok(PendingIndex {
            op,
            base,
            index,
            loc,
        })
    }

    /// Second half of an index expression: allocates the typed node.
    pub fn finish_index(&mut self, pending: PendingIndex, ty: Type) -> NodeId {
        self.tree.add(
            pending.loc,
            NodeKind::Binary(Binary {
                op: pending.op,
                left: pending.base,
                right: pending.index,
                ty,
            }),
        )
    }

    /// Builds `op operand`, folding constant operands where a rule exists.
    pub fn add_unary_math(
        &mut self,
        op: Op,
        operand: NodeId,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        let Ok(operand_ty) = self.type_of(operand) else {
            self.sink.internal_error(loc, "Bad type in AddUnaryMath");
            return Err(BuildError::NotTyped(operand));
        };

        match op {
            Op::LogicalNot
                if operand_ty.basic != sable_ir::BasicType::Bool
                    || operand_ty.is_matrix()
                    || operand_ty.is_array()
                    || operand_ty.is_vector() =>
            {
                return Err(BuildError::InvalidOperand {
                    op,
                    reason: "operand must be a scalar bool",
                });
            }
            Op::PostIncrement
            | Op::PreIncrement
            | Op::PostDecrement
            | Op::PreDecrement
            | Op::Negative
                if operand_ty.is_struct() || operand_ty.is_array() =>
            {
                return Err(BuildError::InvalidOperand {
                    op,
                    reason: "operand must not be a struct or array",
                });
            }
            _ => {}
        }

        let ty = promote_unary(op, &operand_ty)?;

        if let Some(c) = self.tree.get(operand).and_then(Node::as_constant) {
            match fold_unary(op, c, loc, &mut self.sink) {
                Ok(folded) => return Ok(self.tree.add(loc, NodeKind::Constant(folded))),
                Err(e) => log::trace!("keeping unfolded {op:?} at {loc}: {e}"),
            }
        }

        Ok(self
            .tree
            .add(loc, NodeKind::Unary(Unary { op, operand, ty })))
    }

    /// Evaluates `op` on constant leaves without building an operator node.
    pub fn fold(
        &mut self,
        op: Op,
        operand: NodeId,
        other: Option<NodeId>,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        let left = self
            .tree
            .get(operand)
            .and_then(Node::as_constant)
            .ok_or(BuildError::NotConstant(operand))?;
        let folded = match other {
            Some(other) => {
                let right = self.tree.get(other).and_then(Node::as_constant).ok_or(BuildError::NotConstant(other))?;
                fold_binary(op, left, right, loc, &mut self.sink)?
            }
            None => fold_unary(op, left, loc, &mut self.sink)?,
        };
        Ok(self.tree.add(loc, NodeKind::Constant(folded)))
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    /// Returns `node` itself when it is an aggregate whose role is still
    /// undecided, otherwise a fresh aggregate wrapping it.
    fn open_aggregate(&mut self, node: Option<NodeId>, loc: SourceLoc) -> NodeId {
        if let Some(id) = node {
            if self
                .tree
                .get(id)
                .and_then(Node::as_aggregate)
                .is_some_and(|a| a.op == Op::Null)
            {
                return id;
            }
        }
        let mut agg = Aggregate::new(Op::Null);
        agg.sequence.extend(node);
        self.tree.add(loc, NodeKind::Aggregate(agg))
    }

    fn aggregate_mut(&mut self, id: NodeId) -> Option<&mut Aggregate> {
        self.tree.get_mut(id).and_then(Node::as_aggregate_mut)
    }

    /// Assigns `op` to an aggregate, wrapping non-aggregates first.
    pub fn set_aggregate_operator(
        &mut self,
        node: Option<NodeId>,
        op: Op,
        loc: SourceLoc,
    ) -> NodeId {
        let id = self.open_aggregate(node, loc);
        if let Some(agg) = self.aggregate_mut(id) {
            agg.op = op;
        }
        self.tree.set_loc(id, loc);
        id
    }

    /// Appends `right` to `left`, turning `left` into a list if needed.
    /// Returns `None` only if both inputs are `None`.
    pub fn grow_aggregate(
        &mut self,
        left: Option<NodeId>,
        right: Option<NodeId>,
        loc: SourceLoc,
    ) -> Option<NodeId> {
        if left.is_none() && right.is_none() {
            return None;
        }
        let id = self.open_aggregate(left, loc);
        if let Some(agg) = self.aggregate_mut(id) {
            agg.sequence.extend(right);
        }
        self.tree.set_loc(id, loc);
        Some(id)
    }

    /// Wraps `node` in a fresh, role-less aggregate.
    pub fn make_aggregate(&mut self, node: Option<NodeId>, loc: SourceLoc) -> Option<NodeId> {
        let node = node?;
        let mut agg = Aggregate::new(Op::Null);
        agg.sequence.push(node);
        Some(self.tree.add(loc, NodeKind::Aggregate(agg)))
    }

    /// Gives a value-producing aggregate (call, constructor) its type.
    pub fn set_aggregate_type(&mut self, node: NodeId, ty: Type) -> Result<(), BuildError> {
        let agg = self
            .aggregate_mut(node)
            .ok_or(BuildError::NotAggregate(node))?;
        agg.ty = Some(ty);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    /// Builds an `if`. A constant condition prunes the dead branch and
    /// returns the live one as a sequence, or `None` if it is empty.
    pub fn add_selection(
        &mut self,
        condition: NodeId,
        true_block: Option<NodeId>,
        false_block: Option<NodeId>,
        loc: SourceLoc,
    ) -> Option<NodeId> {
        if let Some(c) = self.constant(condition) {
            let live = if c.first_bool() { true_block } else { false_block };
            let live = live?;
            let live_loc = self.tree.loc(live).unwrap_or(loc);
            return Some(self.set_aggregate_operator(Some(live), Op::Sequence, live_loc));
        }

        Some(self.tree.add(
            loc,
            NodeKind::Selection(Selection {
                condition,
                true_block,
                false_block,
                ty: None,
            }),
        ))
    }

    /// Builds `condition ? true_block : false_block`.
    pub fn add_ternary(
        &mut self,
        condition: NodeId,
        true_block: NodeId,
        false_block: NodeId,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        let true_ty = self.type_of(true_block)?;
        let false_ty = self.type_of(false_block)?;
        if true_ty != false_ty {
            return Err(BuildError::BranchTypeMismatch);
        }

        if self.is_constant(true_block)
            && self.is_constant(false_block)
            && let Some(c) = self.constant(condition)
        {
            return Ok(if c.first_bool() { true_block } else { false_block });
        }

        Ok(self.tree.add(
            loc,
            NodeKind::Selection(Selection {
                condition,
                true_block: Some(true_block),
                false_block: Some(false_block),
                ty: Some(true_ty.with_qualifier(Qualifier::Temporary)),
            }),
        ))
    }

    /// Builds `left, right`. Two `const` operands collapse to `right`.
    pub fn add_comma(
        &mut self,
        left: NodeId,
        right: NodeId,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        let left_ty = self.type_of(left)?;
        let right_ty = self.type_of(right)?;
        if left_ty.is_const() && right_ty.is_const() {
            return Ok(right);
        }

        let id = self.open_aggregate(Some(left), loc);
        if let Some(agg) = self.aggregate_mut(id) {
            agg.sequence.push(right);
            agg.op = Op::Comma;
            agg.ty = Some(right_ty.with_qualifier(Qualifier::Temporary));
        }
        self.tree.set_loc(id, loc);
        Ok(id)
    }

    pub fn add_loop(
        &mut self,
        kind: LoopKind,
        init: Option<NodeId>,
        cond: Option<NodeId>,
        expr: Option<NodeId>,
        body: Option<NodeId>,
        loc: SourceLoc,
    ) -> NodeId {
        self.tree.add(
            loc,
            NodeKind::Loop(Loop {
                kind,
                init,
                cond,
                expr,
                body,
            }),
        )
    }

    pub fn add_branch(
        &mut self,
        op: Op,
        expression: Option<NodeId>,
        loc: SourceLoc,
    ) -> Result<NodeId, BuildError> {
        if !op.is_branch() {
            return Err(BuildError::InvalidOperand {
                op,
                reason: "not a branch operator",
            });
        }
        Ok(self
            .tree
            .add(loc, NodeKind::Branch(Branch { op, expression })))
    }

    // ------------------------------------------------------------------
    // Finalization
    // ------------------------------------------------------------------

    /// Tags a role-less root aggregate as the top-level statement sequence.
    ///
    /// Succeeds trivially for `None`; fails only for a dead handle.
    pub fn post_process(&mut self, root: Option<NodeId>) -> bool {
        let Some(root) = root else {
            return true;
        };
        match self.tree.get_mut(root) {
            Some(node) => {
                if let Some(agg) = node.as_aggregate_mut()
                    && agg.op == Op::Null
                {
                    agg.op = Op::Sequence;
                }
                true
            }
            None => false,
        }
    }

    /// Frees the subtree at `root`; see [`Tree::remove`].
    pub fn remove(&mut self, root: Option<NodeId>) -> usize {
        self.tree.remove(root)
    }
}
