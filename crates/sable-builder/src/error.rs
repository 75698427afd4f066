//! Builder rejection reasons.

use sable_ir::{BasicType, IrError, NodeId, Op};

/// Why a builder operation refused to produce a node.
///
/// A rejected node is never attached to the tree; the caller is expected
/// to abort the enclosing expression.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Arithmetic and comparison promotion only handles non-array operands.
    #[error("'{op}' cannot operate on arrays")]
    ArrayOperand { op: Op },

    /// There are no implicit conversions between basic kinds.
    #[error("no operation '{op}' takes a left operand of type '{left}' and a right operand of type '{right}'")]
    KindMismatch {
        op: Op,
        left: BasicType,
        right: BasicType,
    },

    /// The operator is not defined for the operand's kind or shape.
    #[error("'{op}': {reason}")]
    InvalidOperand { op: Op, reason: &'static str },

    /// Assignment between a struct and a different type.
    #[error("cannot assign between different structure types")]
    StructMismatch,

    /// The two arms of `?:` have different types.
    #[error("the branches of a ternary expression must have the same type")]
    BranchTypeMismatch,

    /// A constant's value list does not match its type.
    #[error("constant of object size {expected} was given {found} values")]
    SizeMismatch { expected: usize, found: usize },

    /// Folding was requested on a node that is not a constant leaf.
    #[error("node {0:?} is not a constant")]
    NotConstant(NodeId),

    /// The folder has no rule for the operator and operand kinds.
    #[error("'{op}' cannot be folded")]
    Unfoldable { op: Op },

    /// The node produces no value.
    #[error("node {0:?} has no value type")]
    NotTyped(NodeId),

    #[error("node {0:?} is not an aggregate")]
    NotAggregate(NodeId),

    #[error(transparent)]
    Ir(#[from] IrError),
}
