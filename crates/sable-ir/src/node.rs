//! IR nodes.
//!
//! Nodes live in a [`Tree`](crate::Tree) arena and refer to their children
//! by [`NodeId`]. Each node has exactly one parent once attached; node
//! identity is handle identity.

use crate::arena::Handle;
use crate::constant::ConstantUnion;
use crate::info_sink::SourceLoc;
use crate::intern::Name;
use crate::ops::{LoopKind, Op};
use crate::types::Type;

/// Identity of a node inside its tree.
pub type NodeId = Handle<Node>;

/// A node plus its source position.
#[derive(Clone, Debug)]
pub struct Node {
    pub loc: SourceLoc,
    pub kind: NodeKind,
}

/// The closed set of node kinds.
#[derive(Clone, Debug)]
pub enum NodeKind {
    Symbol(Symbol),
    Constant(Constant),
    Unary(Unary),
    Binary(Binary),
    Aggregate(Aggregate),
    Selection(Selection),
    Loop(Loop),
    Branch(Branch),
}

/// A reference to a declared identifier.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub id: i32,
    pub name: Name,
    pub ty: Type,
}

/// A folded compile-time value: one entry per scalar component.
#[derive(Clone, Debug)]
pub struct Constant {
    pub values: Vec<ConstantUnion>,
    pub ty: Type,
}

impl Constant {
    /// The first component as a boolean; `false` for non-bool constants.
    pub fn first_bool(&self) -> bool {
        self.values
            .first()
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}

#[derive(Clone, Debug)]
pub struct Unary {
    pub op: Op,
    pub operand: NodeId,
    pub ty: Type,
}

#[derive(Clone, Debug)]
pub struct Binary {
    pub op: Op,
    pub left: NodeId,
    pub right: NodeId,
    pub ty: Type,
}

/// An ordered child list: statement sequences, argument lists, swizzles.
#[derive(Clone, Debug)]
pub struct Aggregate {
    /// [`Op::Null`] until the aggregate's role is decided.
    pub op: Op,
    pub sequence: Vec<NodeId>,
    /// Set for value-producing aggregates (comma, calls, constructors).
    pub ty: Option<Type>,
    /// Callee name for function calls and definitions.
    pub name: Option<Name>,
}

impl Aggregate {
    pub fn new(op: Op) -> Self {
        Self {
            op,
            sequence: Vec::new(),
            ty: None,
            name: None,
        }
    }
}

/// `if` statement or `?:` expression.
#[derive(Clone, Debug)]
pub struct Selection {
    pub condition: NodeId,
    pub true_block: Option<NodeId>,
    pub false_block: Option<NodeId>,
    /// Present only for the ternary form.
    pub ty: Option<Type>,
}

#[derive(Clone, Debug)]
pub struct Loop {
    pub kind: LoopKind,
    pub init: Option<NodeId>,
    pub cond: Option<NodeId>,
    pub expr: Option<NodeId>,
    pub body: Option<NodeId>,
}

/// `break`, `continue`, `return` or `discard`.
#[derive(Clone, Debug)]
pub struct Branch {
    pub op: Op,
    pub expression: Option<NodeId>,
}

fn replace_if_is(slot: &mut NodeId, original: NodeId, replacement: NodeId) -> bool {
    if *slot == original {
        *slot = replacement;
        true
    } else {
        false
    }
}

fn replace_opt_if_is(slot: &mut Option<NodeId>, original: NodeId, replacement: NodeId) -> bool {
    match slot {
        Some(id) => replace_if_is(id, original, replacement),
        None => false,
    }
}

impl Node {
    pub fn new(loc: SourceLoc, kind: NodeKind) -> Self {
        Self { loc, kind }
    }

    /// The value type, or `None` for nodes that produce no value.
    pub fn ty(&self) -> Option<&Type> {
        match &self.kind {
            NodeKind::Symbol(n) => Some(&n.ty),
            NodeKind::Constant(n) => Some(&n.ty),
            NodeKind::Unary(n) => Some(&n.ty),
            NodeKind::Binary(n) => Some(&n.ty),
            NodeKind::Aggregate(n) => n.ty.as_ref(),
            NodeKind::Selection(n) => n.ty.as_ref(),
            NodeKind::Loop(_) | NodeKind::Branch(_) => None,
        }
    }

    pub fn ty_mut(&mut self) -> Option<&mut Type> {
        match &mut self.kind {
            NodeKind::Symbol(n) => Some(&mut n.ty),
            NodeKind::Constant(n) => Some(&mut n.ty),
            NodeKind::Unary(n) => Some(&mut n.ty),
            NodeKind::Binary(n) => Some(&mut n.ty),
            NodeKind::Aggregate(n) => n.ty.as_mut(),
            NodeKind::Selection(n) => n.ty.as_mut(),
            NodeKind::Loop(_) | NodeKind::Branch(_) => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match &self.kind {
            NodeKind::Symbol(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Constant> {
        match &self.kind {
            NodeKind::Constant(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_unary(&self) -> Option<&Unary> {
        match &self.kind {
            NodeKind::Unary(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match &self.kind {
            NodeKind::Binary(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match &self.kind {
            NodeKind::Aggregate(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_aggregate_mut(&mut self) -> Option<&mut Aggregate> {
        match &mut self.kind {
            NodeKind::Aggregate(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_selection(&self) -> Option<&Selection> {
        match &self.kind {
            NodeKind::Selection(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_loop(&self) -> Option<&Loop> {
        match &self.kind {
            NodeKind::Loop(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_branch(&self) -> Option<&Branch> {
        match &self.kind {
            NodeKind::Branch(n) => Some(n),
            _ => None,
        }
    }

    /// Direct children in canonical left-to-right order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.push_children(&mut out);
        out
    }

    pub(crate) fn push_children<E: Extend<NodeId>>(&self, out: &mut E) {
        match &self.kind {
            NodeKind::Symbol(_) | NodeKind::Constant(_) => {}
            NodeKind::Unary(n) => out.extend([n.operand]),
            NodeKind::Binary(n) => out.extend([n.left, n.right]),
            NodeKind::Aggregate(n) => out.extend(n.sequence.iter().copied()),
            NodeKind::Selection(n) => {
                out.extend([Some(n.condition), n.true_block, n.false_block].into_iter().flatten())
            }
            NodeKind::Loop(n) => out.extend([n.init, n.cond, n.expr, n.body].into_iter().flatten()),
            NodeKind::Branch(n) => out.extend(n.expression),
        }
    }

    /// Swaps `original` for `replacement` if it is a direct child.
    ///
    /// Compares handles only and never descends. Aggregates replace the
    /// first matching entry.
    pub fn replace_child(&mut self, original: NodeId, replacement: NodeId) -> bool {
        match &mut self.kind {
            NodeKind::Symbol(_) | NodeKind::Constant(_) => false,
            NodeKind::Unary(n) => replace_if_is(&mut n.operand, original, replacement),
            NodeKind::Binary(n) => {
                replace_if_is(&mut n.left, original, replacement)
                    || replace_if_is(&mut n.right, original, replacement)
            }
            NodeKind::Aggregate(n) => n
                .sequence
                .iter_mut()
                .any(|slot| replace_if_is(slot, original, replacement)),
            NodeKind::Selection(n) => {
                replace_if_is(&mut n.condition, original, replacement)
                    || replace_opt_if_is(&mut n.true_block, original, replacement)
                    || replace_opt_if_is(&mut n.false_block, original, replacement)
            }
            NodeKind::Loop(n) => {
                replace_opt_if_is(&mut n.init, original, replacement)
                    || replace_opt_if_is(&mut n.cond, original, replacement)
                    || replace_opt_if_is(&mut n.expr, original, replacement)
                    || replace_opt_if_is(&mut n.body, original, replacement)
            }
            NodeKind::Branch(n) => replace_opt_if_is(&mut n.expression, original, replacement),
        }
    }
}
