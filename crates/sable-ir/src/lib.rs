//! Sable shader intermediate representation.
//!
//! A typed tree IR for a C-like shading language. Nodes live in an
//! arena-backed [`Tree`] and are addressed by [`NodeId`]; the builder crate
//! creates them, and later passes walk and rewrite them through
//! [`Traverser`] and [`Tree::replace_child_node`].

pub mod arena;
pub mod constant;
mod display;
mod error;
pub mod info_sink;
mod intern;
pub mod node;
mod ops;
pub mod traverse;
mod tree;
mod types;

pub use arena::{Arena, Handle, UniqueArena};
pub use constant::ConstantUnion;
pub use display::{dump_tree, format_shape};
pub use error::IrError;
pub use info_sink::{Diagnostic, InfoSink, Severity, SourceLoc};
pub use intern::{Interner, Name};
pub use node::{
    Aggregate, Binary, Branch, Constant, Loop, Node, NodeId, NodeKind, Selection, Symbol, Unary,
};
pub use ops::{LoopKind, Op};
pub use traverse::{BreadthFirst, Traverser, Visit};
pub use tree::Tree;
pub use types::{
    BasicType, BlockStorage, Field, InterfaceBlockType, LayoutQualifier, MatrixPacking, Precision,
    Qualifier, Structure, Type,
};
