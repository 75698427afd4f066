//! Per-compile uniform tables and HLSL declaration headers.
//!
//! Registers are handed out strictly in declaration order. Samplers and
//! constants draw from separate counters, and each declaration consumes as
//! many consecutive registers as [`variable_register_count`] reports.

use std::fmt::Write;

use indexmap::IndexMap;
use sable_ir::{
    BasicType, InterfaceBlockType, MatrixPacking, NodeId, Qualifier, Symbol, Traverser, Tree,
    Type, format_shape,
};

use crate::encoder::{HlslBlockEncoder, HlslRule, Std140BlockEncoder};
use crate::error::LayoutError;
use crate::hlsl;
use crate::options::{LayoutOptions, ShaderOutput};
use crate::registers::{assign_register_info, variable_register_count};
use crate::variable::{
    BlockLayoutType, InterfaceBlock, InterfaceBlockField, Uniform, collect_variable,
};

// ---------------------------------------------------------------------------
// Referenced symbols
// ---------------------------------------------------------------------------

/// Uniform storage a shader body reads, keyed by name in first-use order.
#[derive(Clone, Debug, Default)]
pub struct ReferencedSymbols {
    pub uniforms: IndexMap<String, Symbol>,
    /// Keyed by block name; the symbol is the first one seen from the block.
    pub interface_blocks: IndexMap<String, Symbol>,
}

struct ReferenceCollector<'a> {
    referenced: &'a mut ReferencedSymbols,
}

impl Traverser for ReferenceCollector<'_> {
    fn visit_symbol(&mut self, _depth: usize, _id: NodeId, node: &Symbol) {
        if node.ty.qualifier != Qualifier::Uniform {
            return;
        }
        // Members of an unnamed block carry the block in their type.
        let (map, key) = match &node.ty.interface_block {
            Some(block) => (&mut self.referenced.interface_blocks, block.name.to_string()),
            None => (&mut self.referenced.uniforms, node.name.to_string()),
        };
        map.entry(key).or_insert_with(|| node.clone());
    }
}

/// Walks `root` and records every uniform and interface block it touches.
pub fn collect_referenced(tree: &Tree, root: NodeId) -> ReferencedSymbols {
    let mut referenced = ReferencedSymbols::default();
    tree.traverse(
        root,
        &mut ReferenceCollector {
            referenced: &mut referenced,
        },
    );
    log::debug!(
        "referenced {} uniform(s), {} interface block(s)",
        referenced.uniforms.len(),
        referenced.interface_blocks.len()
    );
    referenced
}

// ---------------------------------------------------------------------------
// Block layout
// ---------------------------------------------------------------------------

/// Recomputes `block_info` and `data_size` of `block` under `layout`.
/// Packed and shared blocks use the same HLSL packing.
pub fn set_block_layout(block: &mut InterfaceBlock, layout: BlockLayoutType) {
    block.layout = layout;
    let (info, size) = match layout {
        BlockLayoutType::Shared | BlockLayoutType::Packed => {
            let mut encoder = HlslBlockEncoder::new(HlslRule::Packed);
            encoder.encode_interface_block_fields(&block.fields);
            let size = encoder.block_size();
            (encoder.into_block_info(), size)
        }
        BlockLayoutType::Standard => {
            let mut encoder = Std140BlockEncoder::default();
            encoder.encode_interface_block_fields(&block.fields);
            let size = encoder.block_size();
            (encoder.into_block_info(), size)
        }
    };
    block.block_info = info;
    block.data_size = size;
}

// ---------------------------------------------------------------------------
// Uniform layout
// ---------------------------------------------------------------------------

/// Register allocator and declaration tables for one compile.
#[derive(Debug, Default)]
pub struct UniformLayout {
    options: LayoutOptions,
    uniform_register: u32,
    sampler_register: u32,
    interface_block_register: u32,
    active_uniforms: Vec<Uniform>,
    active_interface_blocks: Vec<InterfaceBlock>,
    interface_block_registers: IndexMap<String, u32>,
    pad_counter: u32,
}

impl UniformLayout {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            uniform_register: options.reserved_uniform_registers,
            interface_block_register: options.reserved_interface_block_registers,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Starts constant allocation at `count`, leaving lower registers to the backend.
    pub fn reserve_uniform_registers(&mut self, count: u32) {
        self.uniform_register = count;
    }

    pub fn reserve_interface_block_registers(&mut self, count: u32) {
        self.interface_block_register = count;
    }

    /// Records a uniform and returns its first register.
    pub fn declare_uniform(&mut self, ty: &Type, name: &str) -> Result<u32, LayoutError> {
        if matches!(ty.basic, BasicType::Void | BasicType::InterfaceBlock)
            || ty.interface_block.is_some()
        {
            return Err(LayoutError::UnsupportedType {
                name: name.to_owned(),
                ty: format_shape(ty),
            });
        }

        let output = self.options.output;
        let register = if ty.is_sampler() {
            self.sampler_register
        } else {
            self.uniform_register
        };

        let mut uniform: Uniform = collect_variable(ty, name, &mut |_: &mut Uniform| {});
        if uniform.is_struct() {
            assign_register_info(register, &mut uniform, output);
        } else {
            uniform.register_index = Some(register);
            uniform.element_index = Some(0);
        }

        let count = variable_register_count(&uniform, output);
        if ty.is_sampler() {
            self.sampler_register += count;
        } else {
            self.uniform_register += count;
        }
        log::debug!(
            "uniform '{name}' -> {}{register} ({count} register(s))",
            hlsl::register_prefix(ty)
        );

        self.active_uniforms.push(uniform);
        Ok(register)
    }

    /// Records an interface block, lays it out and returns its first
    /// constant-buffer slot. Block arrays take one slot per element.
    pub fn declare_interface_block(
        &mut self,
        block: &InterfaceBlockType,
    ) -> Result<u32, LayoutError> {
        if block.fields.is_empty() {
            return Err(LayoutError::EmptyBlock(block.name.to_string()));
        }

        let register = self.interface_block_register;
        let mut active = InterfaceBlock::new(block.name.as_str(), block.array_size, register);
        for field in &block.fields {
            let full_name = hlsl::interface_block_field_name(block, field);
            let row_major = hlsl::field_matrix_packing(block, field) == MatrixPacking::RowMajor;
            let variable = collect_variable(
                &field.ty,
                &full_name,
                &mut |f: &mut InterfaceBlockField| f.is_row_major_matrix = row_major,
            );
            active.fields.push(variable);
        }

        self.interface_block_registers
            .insert(active.name.clone(), register);
        self.interface_block_register += block.array_size.max(1);

        set_block_layout(&mut active, BlockLayoutType::from(block.block_storage));
        active.is_row_major_layout = block.matrix_packing == MatrixPacking::RowMajor;

        log::debug!(
            "interface block '{}' -> b{register}, {} byte(s), {:?}",
            active.name,
            active.data_size,
            active.layout
        );
        self.active_interface_blocks.push(active);
        Ok(register)
    }

    pub fn has_interface_block(&self, name: &str) -> bool {
        self.interface_block_registers.contains_key(name)
    }

    pub fn interface_block_register(&self, name: &str) -> Option<u32> {
        self.interface_block_registers.get(name).copied()
    }

    /// Uniforms in declaration order.
    pub fn uniforms(&self) -> &[Uniform] {
        &self.active_uniforms
    }

    pub fn interface_blocks(&self) -> &[InterfaceBlock] {
        &self.active_interface_blocks
    }

    /// Hands the finished tables to the program object.
    pub fn into_parts(self) -> (Vec<Uniform>, Vec<InterfaceBlock>) {
        (self.active_uniforms, self.active_interface_blocks)
    }

    /// Declares every referenced uniform and returns their HLSL declarations.
    pub fn uniforms_header(
        &mut self,
        referenced: &IndexMap<String, Symbol>,
    ) -> Result<String, LayoutError> {
        let mut out = String::new();
        for symbol in referenced.values() {
            let ty = &symbol.ty;
            if ty.qualifier != Qualifier::Uniform {
                return Err(LayoutError::NotUniform(symbol.name.to_string()));
            }
            let register = self.declare_uniform(ty, &symbol.name)?;
            let name = hlsl::decorate_uniform(&symbol.name, ty);
            let array = hlsl::array_string(ty);
            let unsupported = || LayoutError::UnsupportedType {
                name: symbol.name.to_string(),
                ty: format_shape(ty),
            };

            if self.options.output == ShaderOutput::Hlsl11 && ty.is_sampler() {
                let texture = hlsl::texture_string(ty).ok_or_else(unsupported)?;
                writeln!(
                    out,
                    "uniform {} sampler_{name}{array} : register(s{register});",
                    hlsl::sampler_string(ty)
                )?;
                writeln!(
                    out,
                    "uniform {texture} texture_{name}{array} : register(t{register});"
                )?;
            } else {
                let type_name = match &ty.structure {
                    Some(structure) => {
                        Some(hlsl::qualified_struct_name(structure, false, false))
                            .filter(|n| !n.is_empty())
                    }
                    None => hlsl::type_string(ty),
                }
                .ok_or_else(unsupported)?;
                writeln!(
                    out,
                    "uniform {type_name} {name}{array} : register({}{register});",
                    hlsl::register_prefix(ty)
                )?;
            }
        }

        if out.is_empty() {
            Ok(out)
        } else {
            Ok(format!("// Uniforms\n\n{out}"))
        }
    }

    /// Declares every referenced interface block and returns their `cbuffer`
    /// declarations.
    pub fn interface_blocks_header(
        &mut self,
        referenced: &IndexMap<String, Symbol>,
    ) -> Result<String, LayoutError> {
        let mut out = String::new();
        for symbol in referenced.values() {
            let block = symbol
                .ty
                .interface_block
                .as_ref()
                .ok_or_else(|| LayoutError::NotInterfaceBlock(symbol.name.to_string()))?;
            let register = self.declare_interface_block(block)?;

            if block.has_instance_name() {
                out += &hlsl::interface_block_struct_string(block, &mut self.pad_counter)?;
            }
            if block.is_array() {
                for index in 0..block.array_size {
                    out += &hlsl::interface_block_string(
                        block,
                        register + index,
                        Some(index),
                        &mut self.pad_counter,
                    )?;
                }
            } else {
                out += &hlsl::interface_block_string(block, register, None, &mut self.pad_counter)?;
            }
        }

        if out.is_empty() {
            Ok(out)
        } else {
            Ok(format!("// Interface Blocks\n\n{out}"))
        }
    }
}
