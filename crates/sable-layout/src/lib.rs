//! Uniform and interface-block layout for the sable HLSL backend.
//!
//! Declared uniforms are flattened into [`Uniform`] descriptors and given
//! registers in declaration order; interface blocks are laid out member by
//! member by a [`BlockLayoutEncoder`] under either the std140 or the HLSL
//! packing rule. [`UniformLayout`] owns the per-compile tables and renders
//! the matching HLSL declarations.

pub mod encoder;
mod error;
pub mod hlsl;
mod options;
mod registers;
mod uniforms;
mod variable;

pub use encoder::{
    BlockLayoutEncoder, HlslBlockEncoder, HlslRule, LayoutRule, Std140BlockEncoder, Std140Rule,
    Strides,
};
pub use error::LayoutError;
pub use options::{LayoutOptions, ShaderOutput};
pub use registers::{assign_register_info, variable_register_count};
pub use uniforms::{ReferencedSymbols, UniformLayout, collect_referenced, set_block_layout};
pub use variable::{
    BlockLayoutType, BlockMemberInfo, InterfaceBlock, InterfaceBlockField, ShaderVariable,
    Uniform, VariableType, collect_variable,
};
