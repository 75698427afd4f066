//! Backend-facing descriptors of declared shader variables.
//!
//! These are flattened views of IR [`Type`]s: each variable records its
//! leaf shape, array size and, for structs, its fields as nested variables
//! of the same kind.

use sable_ir::{BasicType, BlockStorage, MatrixPacking, Precision, Type};

/// Shape of a variable as the register allocator sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VariableType {
    pub basic: BasicType,
    /// Vector size or matrix column count.
    pub cols: u8,
    /// Matrix row count; 1 for scalars and vectors.
    pub rows: u8,
}

impl VariableType {
    pub fn of(ty: &Type) -> Self {
        Self {
            basic: ty.basic,
            cols: ty.cols(),
            rows: ty.rows(),
        }
    }

    pub fn is_matrix(self) -> bool {
        self.cols > 1 && self.rows > 1
    }

    /// Scalar components in one element. Samplers occupy a single slot.
    pub fn component_count(self) -> u32 {
        if self.basic.is_sampler() {
            1
        } else {
            u32::from(self.cols) * u32::from(self.rows)
        }
    }

    /// Registers one matrix occupies: one per column, or per row when row-major.
    pub fn matrix_register_count(self, row_major: bool) -> u32 {
        u32::from(if row_major { self.rows } else { self.cols })
    }

    /// Components in each of those registers.
    pub fn matrix_component_count(self, row_major: bool) -> u32 {
        u32::from(if row_major { self.cols } else { self.rows })
    }
}

/// Placement of one leaf member inside a block, in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockMemberInfo {
    pub offset: u32,
    pub array_stride: u32,
    pub matrix_stride: u32,
    pub is_row_major_matrix: bool,
}

/// Block layout convention.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockLayoutType {
    /// std140.
    Standard,
    Packed,
    #[default]
    Shared,
}

impl From<BlockStorage> for BlockLayoutType {
    fn from(storage: BlockStorage) -> Self {
        match storage {
            BlockStorage::Std140 => Self::Standard,
            BlockStorage::Packed => Self::Packed,
            BlockStorage::Shared | BlockStorage::Unspecified => Self::Shared,
        }
    }
}

/// Common construction of variable descriptors from IR types.
pub trait ShaderVariable: Sized {
    fn from_type(name: String, ty: &Type, fields: Vec<Self>) -> Self;
}

/// Builds the descriptor tree of `ty`, calling `visit` on every variable
/// after its fields have been built.
pub fn collect_variable<V, F>(ty: &Type, name: &str, visit: &mut F) -> V
where
    V: ShaderVariable,
    F: FnMut(&mut V),
{
    let fields = ty
        .structure
        .as_ref()
        .map(|s| {
            s.fields
                .iter()
                .map(|field| collect_variable(&field.ty, &field.name, visit))
                .collect()
        })
        .unwrap_or_default();
    let mut variable = V::from_type(name.to_owned(), ty, fields);
    visit(&mut variable);
    variable
}

/// A declared uniform with its assigned register.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub ty: VariableType,
    pub precision: Precision,
    /// 0 when the uniform is not an array.
    pub array_size: u32,
    pub fields: Vec<Uniform>,
    pub register_index: Option<u32>,
    /// Component offset inside the register, for struct members.
    pub element_index: Option<u32>,
}

impl Uniform {
    pub fn is_struct(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.array_size > 0
    }

    pub fn element_count(&self) -> u32 {
        self.array_size.max(1)
    }

    pub fn is_sampler(&self) -> bool {
        self.ty.basic.is_sampler()
    }
}

impl ShaderVariable for Uniform {
    fn from_type(name: String, ty: &Type, fields: Vec<Self>) -> Self {
        Self {
            name,
            ty: VariableType::of(ty),
            precision: ty.precision,
            array_size: ty.array_size,
            fields,
            register_index: None,
            element_index: None,
        }
    }
}

/// A member of an interface block, flattened to a leaf or a struct.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceBlockField {
    pub name: String,
    pub ty: VariableType,
    pub precision: Precision,
    pub array_size: u32,
    pub is_row_major_matrix: bool,
    pub fields: Vec<InterfaceBlockField>,
}

impl InterfaceBlockField {
    pub fn is_struct(&self) -> bool {
        !self.fields.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.array_size > 0
    }
}

impl ShaderVariable for InterfaceBlockField {
    fn from_type(name: String, ty: &Type, fields: Vec<Self>) -> Self {
        Self {
            name,
            ty: VariableType::of(ty),
            precision: ty.precision,
            array_size: ty.array_size,
            is_row_major_matrix: ty.layout.matrix_packing == MatrixPacking::RowMajor,
            fields,
        }
    }
}

/// A laid-out interface block.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceBlock {
    pub name: String,
    /// 0 when the block is not an array.
    pub array_size: u32,
    /// Size of one block instance in bytes.
    pub data_size: u32,
    pub layout: BlockLayoutType,
    pub is_row_major_layout: bool,
    pub fields: Vec<InterfaceBlockField>,
    /// One entry per leaf field, in declaration order.
    pub block_info: Vec<BlockMemberInfo>,
    pub register_index: u32,
}

impl InterfaceBlock {
    pub fn new(name: impl Into<String>, array_size: u32, register_index: u32) -> Self {
        Self {
            name: name.into(),
            array_size,
            data_size: 0,
            layout: BlockLayoutType::Shared,
            is_row_major_layout: false,
            fields: Vec::new(),
            block_info: Vec::new(),
            register_index,
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_size > 0
    }
}
