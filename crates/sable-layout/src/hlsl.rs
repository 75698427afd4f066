//! HLSL spelling of uniform declarations: names, types and std140 padding.

use std::fmt::Write;

use sable_ir::{BasicType, BlockStorage, Field, InterfaceBlockType, MatrixPacking, Structure, Type};

use crate::error::LayoutError;

/// Prefixes a user identifier so it cannot collide with HLSL keywords.
/// Built-in `gl_` names are left alone.
pub fn decorate(name: &str) -> String {
    if name.starts_with("gl_") {
        name.to_owned()
    } else {
        format!("_{name}")
    }
}

pub fn decorate_uniform(name: &str, ty: &Type) -> String {
    if ty.basic == BasicType::SamplerExternalOes {
        format!("ex_{name}")
    } else {
        decorate(name)
    }
}

/// Names the backend invents for itself.
pub fn decorate_private(name: &str) -> String {
    format!("dx_{name}")
}

pub fn array_string(ty: &Type) -> String {
    if ty.is_array() {
        format!("[{}]", ty.array_size)
    } else {
        String::new()
    }
}

/// `""` for anonymous structs.
pub fn struct_name(structure: &Structure) -> String {
    structure
        .name
        .as_ref()
        .map(|n| decorate(n))
        .unwrap_or_default()
}

/// Struct name variant for a given packing; each variant is a distinct
/// HLSL type.
pub fn qualified_struct_name(structure: &Structure, hlsl_row_major: bool, std140: bool) -> String {
    let name = struct_name(structure);
    if name.is_empty() {
        return name;
    }
    let mut prefix = String::new();
    if std140 {
        prefix.push_str("std_");
    }
    // GLSL column-major matrices are declared row_major in HLSL.
    if hlsl_row_major {
        prefix.push_str("rm_");
    }
    prefix + &name
}

/// HLSL spelling of a non-array type, or `None` if it has none.
pub fn type_string(ty: &Type) -> Option<String> {
    if let Some(structure) = &ty.structure {
        let name = struct_name(structure);
        return (!name.is_empty()).then_some(name);
    }
    if ty.is_matrix() {
        return Some(format!("float{}x{}", ty.cols(), ty.rows()));
    }
    let base = match ty.basic {
        BasicType::Float => "float",
        BasicType::Int => "int",
        BasicType::UInt => "uint",
        BasicType::Bool => "bool",
        BasicType::Void => return Some("void".to_owned()),
        BasicType::Sampler2D
        | BasicType::ISampler2D
        | BasicType::USampler2D
        | BasicType::Sampler2DArray
        | BasicType::ISampler2DArray
        | BasicType::USampler2DArray
        | BasicType::SamplerExternalOes
        | BasicType::Sampler2DShadow
        | BasicType::Sampler2DArrayShadow => return Some("sampler2D".to_owned()),
        BasicType::SamplerCube
        | BasicType::ISamplerCube
        | BasicType::USamplerCube
        | BasicType::SamplerCubeShadow => return Some("samplerCUBE".to_owned()),
        BasicType::Sampler3D | BasicType::ISampler3D | BasicType::USampler3D => {
            return Some("sampler3D".to_owned());
        }
        BasicType::Struct | BasicType::InterfaceBlock => return None,
    };
    Some(match ty.nominal_size() {
        1 => base.to_owned(),
        n => format!("{base}{n}"),
    })
}

/// Sampler state object paired with a texture in shader model 4+.
pub fn sampler_string(ty: &Type) -> &'static str {
    if ty.basic.is_shadow_sampler() {
        "SamplerComparisonState"
    } else {
        "SamplerState"
    }
}

pub fn texture_string(ty: &Type) -> Option<&'static str> {
    Some(match ty.basic {
        BasicType::Sampler2D | BasicType::SamplerExternalOes | BasicType::Sampler2DShadow => {
            "Texture2D"
        }
        BasicType::SamplerCube | BasicType::SamplerCubeShadow => "TextureCube",
        BasicType::Sampler2DArray | BasicType::Sampler2DArrayShadow => "Texture2DArray",
        BasicType::Sampler3D => "Texture3D",
        BasicType::ISampler2D => "Texture2D<int4>",
        BasicType::ISampler3D => "Texture3D<int4>",
        BasicType::ISamplerCube | BasicType::ISampler2DArray => "Texture2DArray<int4>",
        BasicType::USampler2D => "Texture2D<uint4>",
        BasicType::USampler3D => "Texture3D<uint4>",
        BasicType::USamplerCube | BasicType::USampler2DArray => "Texture2DArray<uint4>",
        _ => return None,
    })
}

/// `s` for the sampler register file, `c` for constants.
pub fn register_prefix(ty: &Type) -> char {
    if ty.is_sampler() {
        's'
    } else {
        'c'
    }
}

/// Externally visible name of a block member.
pub fn interface_block_field_name(block: &InterfaceBlockType, field: &Field) -> String {
    if block.has_instance_name() {
        format!("{}.{}", block.name, field.name)
    } else {
        field.name.to_string()
    }
}

/// Matrix packing of a block member after block defaults are applied.
pub fn field_matrix_packing(block: &InterfaceBlockType, field: &Field) -> MatrixPacking {
    match (field.ty.layout.matrix_packing, block.matrix_packing) {
        (MatrixPacking::Unspecified, MatrixPacking::Unspecified) => MatrixPacking::ColumnMajor,
        (MatrixPacking::Unspecified, packing) | (packing, _) => packing,
    }
}

pub fn interface_block_struct_name(block: &InterfaceBlockType) -> String {
    format!("{}_type", decorate_private(&block.name))
}

pub fn interface_block_instance_string(block: &InterfaceBlockType, array_index: Option<u32>) -> String {
    match (&block.instance_name, array_index) {
        (None, _) => String::new(),
        (Some(instance), Some(index)) if block.is_array() => {
            format!("{}_{index}", decorate_private(instance))
        }
        (Some(instance), _) => decorate(instance),
    }
}

fn unsupported(name: &str, ty: &Type) -> LayoutError {
    LayoutError::UnsupportedType {
        name: name.to_owned(),
        ty: sable_ir::format_shape(ty),
    }
}

fn field_type_string(
    block: &InterfaceBlockType,
    field: &Field,
) -> Result<String, LayoutError> {
    let packing = field_matrix_packing(block, field);
    let ty = &field.ty;
    if ty.is_matrix() {
        let spelled = type_string(ty).ok_or_else(|| unsupported(&field.name, ty))?;
        let order = if packing == MatrixPacking::RowMajor {
            "column_major"
        } else {
            "row_major"
        };
        Ok(format!("{order} {spelled}"))
    } else if let Some(structure) = &ty.structure {
        let name = qualified_struct_name(
            structure,
            packing == MatrixPacking::ColumnMajor,
            block.block_storage == BlockStorage::Std140,
        );
        if name.is_empty() {
            return Err(unsupported(&field.name, ty));
        }
        Ok(name)
    } else {
        type_string(ty).ok_or_else(|| unsupported(&field.name, ty))
    }
}

/// Emits `float pad_N;` members so HLSL packing matches std140.
#[derive(Debug)]
pub struct Std140PaddingHelper<'a> {
    counter: &'a mut u32,
    element_index: u32,
}

impl<'a> Std140PaddingHelper<'a> {
    /// `counter` numbers padding fields and is shared by every helper of a
    /// compile so the names stay unique.
    pub fn new(counter: &'a mut u32) -> Self {
        Self {
            counter,
            element_index: 0,
        }
    }

    /// Component position inside the current register.
    pub fn element_index(&self) -> u32 {
        self.element_index
    }

    fn next(&mut self) -> u32 {
        let value = *self.counter;
        *self.counter += 1;
        value
    }

    /// Padding components needed before a member of type `ty`.
    pub fn pre_padding(&mut self, ty: &Type) -> u32 {
        if ty.is_struct() || ty.is_matrix() || ty.is_array() {
            // HLSL already starts these on a new register.
            self.element_index = 0;
            return 0;
        }
        let components = u32::from(ty.cols()) * u32::from(ty.rows());
        if components >= 4 {
            self.element_index = 0;
            return 0;
        }
        if self.element_index + components > 4 {
            self.element_index = components;
            return 0;
        }
        let alignment = if components == 3 { 4 } else { components };
        let misalignment = self.element_index % alignment;
        let count = if misalignment != 0 { alignment - misalignment } else { 0 };
        self.element_index = (self.element_index + count + components) % 4;
        count
    }

    pub fn pre_padding_string(&mut self, ty: &Type) -> String {
        let count = self.pre_padding(ty);
        self.pad_fields(count)
    }

    /// Padding after matrices, arrays and structs, which HLSL would
    /// otherwise pack into.
    pub fn post_padding_string(&mut self, ty: &Type, hlsl_row_major: bool) -> String {
        if !ty.is_matrix() && !ty.is_array() && !ty.is_struct() {
            return String::new();
        }
        let used = if ty.is_matrix() {
            // HLSL row-major is GLSL column-major: one register per column
            // holding `rows` components.
            if hlsl_row_major {
                u32::from(ty.rows())
            } else {
                u32::from(ty.cols())
            }
        } else if let Some(structure) = &ty.structure {
            match struct_element_index(structure) {
                0 => return String::new(),
                n => n,
            }
        } else {
            u32::from(ty.cols()) * u32::from(ty.rows())
        };
        self.pad_fields(4u32.saturating_sub(used))
    }

    fn pad_fields(&mut self, count: u32) -> String {
        (0..count)
            .map(|_| format!("    float pad_{};\n", self.next()))
            .collect()
    }
}

/// Component position a struct's last member leaves behind.
pub fn struct_element_index(structure: &Structure) -> u32 {
    let mut scratch = 0;
    let mut helper = Std140PaddingHelper::new(&mut scratch);
    for field in &structure.fields {
        helper.pre_padding(&field.ty);
    }
    helper.element_index()
}

/// Member declarations of a block body, padded for std140 blocks.
pub fn interface_block_members(
    block: &InterfaceBlockType,
    pad_counter: &mut u32,
) -> Result<String, LayoutError> {
    let std140 = block.block_storage == BlockStorage::Std140;
    let mut padding = Std140PaddingHelper::new(pad_counter);
    let mut out = String::new();
    for field in &block.fields {
        if std140 {
            out += &padding.pre_padding_string(&field.ty);
        }
        writeln!(
            out,
            "    {} {}{};",
            field_type_string(block, field)?,
            decorate(&field.name),
            array_string(&field.ty)
        )?;
        if std140 {
            let hlsl_row_major = field_matrix_packing(block, field) == MatrixPacking::ColumnMajor;
            out += &padding.post_padding_string(&field.ty, hlsl_row_major);
        }
    }
    Ok(out)
}

/// `struct dx_Name_type { ... };` for blocks addressed through an instance.
pub fn interface_block_struct_string(
    block: &InterfaceBlockType,
    pad_counter: &mut u32,
) -> Result<String, LayoutError> {
    Ok(format!(
        "struct {}\n{{\n{}}};\n\n",
        interface_block_struct_name(block),
        interface_block_members(block, pad_counter)?
    ))
}

/// One `cbuffer` declaration; `array_index` selects an element of a block array.
pub fn interface_block_string(
    block: &InterfaceBlockType,
    register: u32,
    array_index: Option<u32>,
    pad_counter: &mut u32,
) -> Result<String, LayoutError> {
    let suffix = array_index
        .map(|i| decorate(&i.to_string()))
        .unwrap_or_default();
    let mut out = format!("cbuffer {}{suffix} : register(b{register})\n{{\n", block.name);
    if block.has_instance_name() {
        writeln!(
            out,
            "    {} {};",
            interface_block_struct_name(block),
            interface_block_instance_string(block, array_index)
        )?;
    } else {
        out += &interface_block_members(block, pad_counter)?;
    }
    out += "};\n\n";
    Ok(out)
}
