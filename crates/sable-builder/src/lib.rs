//! IR construction for the sable shader compiler.
//!
//! The parser drives a [`Builder`] one grammar reduction at a time. Each
//! call validates its operands, resolves the final operator and result
//! type ([`promote_binary`], [`promote_unary`]) and folds constant operands
//! on the spot ([`fold_binary`], [`fold_unary`]).

mod builder;
mod error;
pub mod fold;
pub mod promote;

pub use builder::{Builder, PendingIndex};
pub use error::BuildError;
pub use fold::{fold_binary, fold_unary};
pub use promote::{promote_binary, promote_unary, validate_multiplication};
