//! Error types for the sable IR.

/// Errors raised when a handle does not lead to a usable node.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// A handle index is out of bounds for its arena.
    #[error("handle index {index} out of bounds (arena size: {size})")]
    BadHandle { index: usize, size: usize },

    /// The node was freed by a subtree removal.
    #[error("node {0} has been removed")]
    Removed(usize),

    /// The node produces no value.
    #[error("node {0} has no value type")]
    NotTyped(usize),
}
