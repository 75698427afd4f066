//! Type descriptors for the shading language.
//!
//! A [`Type`] is a flat descriptor: basic kind, precision, qualifier and two
//! size axes (primary = vector size or matrix columns, secondary = matrix
//! rows), plus an independent array size. Struct and interface-block types
//! own their field lists.

use std::sync::Arc;

use crate::intern::Name;

/// The basic kind of a type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BasicType {
    Void,
    Float,
    Int,
    UInt,
    Bool,
    Sampler2D,
    Sampler3D,
    SamplerCube,
    Sampler2DArray,
    SamplerExternalOes,
    ISampler2D,
    ISampler3D,
    ISamplerCube,
    ISampler2DArray,
    USampler2D,
    USampler3D,
    USamplerCube,
    USampler2DArray,
    Sampler2DShadow,
    SamplerCubeShadow,
    Sampler2DArrayShadow,
    Struct,
    InterfaceBlock,
}

impl BasicType {
    /// Returns `true` for every sampler kind.
    pub fn is_sampler(self) -> bool {
        matches!(
            self,
            Self::Sampler2D
                | Self::Sampler3D
                | Self::SamplerCube
                | Self::Sampler2DArray
                | Self::SamplerExternalOes
                | Self::ISampler2D
                | Self::ISampler3D
                | Self::ISamplerCube
                | Self::ISampler2DArray
                | Self::USampler2D
                | Self::USampler3D
                | Self::USamplerCube
                | Self::USampler2DArray
                | Self::Sampler2DShadow
                | Self::SamplerCubeShadow
                | Self::Sampler2DArrayShadow
        )
    }

    /// Returns `true` for depth-comparison samplers.
    pub fn is_shadow_sampler(self) -> bool {
        matches!(
            self,
            Self::Sampler2DShadow | Self::SamplerCubeShadow | Self::Sampler2DArrayShadow
        )
    }

    /// Returns `true` for the four numeric/boolean scalar kinds.
    pub fn is_primitive(self) -> bool {
        matches!(self, Self::Float | Self::Int | Self::UInt | Self::Bool)
    }

    /// The keyword used for this kind in source and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Float => "float",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Bool => "bool",
            Self::Sampler2D => "sampler2D",
            Self::Sampler3D => "sampler3D",
            Self::SamplerCube => "samplerCube",
            Self::Sampler2DArray => "sampler2DArray",
            Self::SamplerExternalOes => "samplerExternalOES",
            Self::ISampler2D => "isampler2D",
            Self::ISampler3D => "isampler3D",
            Self::ISamplerCube => "isamplerCube",
            Self::ISampler2DArray => "isampler2DArray",
            Self::USampler2D => "usampler2D",
            Self::USampler3D => "usampler3D",
            Self::USamplerCube => "usamplerCube",
            Self::USampler2DArray => "usampler2DArray",
            Self::Sampler2DShadow => "sampler2DShadow",
            Self::SamplerCubeShadow => "samplerCubeShadow",
            Self::Sampler2DArrayShadow => "sampler2DArrayShadow",
            Self::Struct => "structure",
            Self::InterfaceBlock => "interface block",
        }
    }
}

/// Precision qualifier. Ordered so that promotion can take the maximum.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Precision {
    #[default]
    Undefined,
    Low,
    Medium,
    High,
}

/// Storage qualifier.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub enum Qualifier {
    #[default]
    Temporary,
    Global,
    Const,
    Attribute,
    VaryingIn,
    VaryingOut,
    Uniform,
    In,
    Out,
    InOut,
    /// A function parameter that is `const in`.
    ConstReadOnly,
}

/// Matrix packing from a layout qualifier.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub enum MatrixPacking {
    #[default]
    Unspecified,
    ColumnMajor,
    RowMajor,
}

/// Block storage from a layout qualifier.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub enum BlockStorage {
    #[default]
    Unspecified,
    Shared,
    Packed,
    Std140,
}

/// `layout(...)` qualifier contents relevant to memory layout.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct LayoutQualifier {
    pub matrix_packing: MatrixPacking,
    pub block_storage: BlockStorage,
}

/// A named member of a struct or interface block.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: Name,
    pub ty: Type,
}

/// A struct type definition.
#[derive(Clone, Debug, PartialEq)]
pub struct Structure {
    /// `None` for anonymous structs.
    pub name: Option<Name>,
    pub fields: Vec<Field>,
}

impl Structure {
    /// Total number of scalar components in one instance.
    pub fn object_size(&self) -> usize {
        self.fields.iter().map(|f| f.ty.object_size()).sum()
    }
}

/// An interface (uniform) block declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceBlockType {
    pub name: Name,
    /// Instance name; members are then addressed as `name.field`.
    pub instance_name: Option<Name>,
    pub fields: Vec<Field>,
    /// 0 when the block is not an array.
    pub array_size: u32,
    pub block_storage: BlockStorage,
    pub matrix_packing: MatrixPacking,
}

impl InterfaceBlockType {
    pub fn has_instance_name(&self) -> bool {
        self.instance_name.is_some()
    }

    pub fn is_array(&self) -> bool {
        self.array_size > 0
    }
}

/// A complete type descriptor.
#[derive(Clone, Debug)]
pub struct Type {
    pub basic: BasicType,
    pub precision: Precision,
    pub qualifier: Qualifier,
    pub layout: LayoutQualifier,
    /// Vector size, or number of matrix columns.
    pub primary_size: u8,
    /// Number of matrix rows; 1 for scalars and vectors.
    pub secondary_size: u8,
    /// 0 when the type is not an array.
    pub array_size: u32,
    pub structure: Option<Arc<Structure>>,
    pub interface_block: Option<Arc<InterfaceBlockType>>,
}

impl Type {
    pub fn new(
        basic: BasicType,
        precision: Precision,
        qualifier: Qualifier,
        primary_size: u8,
        secondary_size: u8,
    ) -> Self {
        Self {
            basic,
            precision,
            qualifier,
            layout: LayoutQualifier::default(),
            primary_size,
            secondary_size,
            array_size: 0,
            structure: None,
            interface_block: None,
        }
    }

    /// A temporary scalar of undefined precision.
    pub fn scalar(basic: BasicType) -> Self {
        Self::new(basic, Precision::Undefined, Qualifier::Temporary, 1, 1)
    }

    pub fn vector(basic: BasicType, size: u8) -> Self {
        Self::new(basic, Precision::Undefined, Qualifier::Temporary, size, 1)
    }

    pub fn matrix(basic: BasicType, columns: u8, rows: u8) -> Self {
        Self::new(basic, Precision::Undefined, Qualifier::Temporary, columns, rows)
    }

    pub fn from_structure(structure: Arc<Structure>) -> Self {
        let mut ty = Self::scalar(BasicType::Struct);
        ty.structure = Some(structure);
        ty
    }

    pub fn from_interface_block(block: Arc<InterfaceBlockType>) -> Self {
        let mut ty = Self::scalar(BasicType::InterfaceBlock);
        ty.array_size = block.array_size;
        ty.layout = LayoutQualifier {
            matrix_packing: block.matrix_packing,
            block_storage: block.block_storage,
        };
        ty.interface_block = Some(block);
        ty
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn with_array_size(mut self, array_size: u32) -> Self {
        self.array_size = array_size;
        self
    }

    pub fn with_layout(mut self, layout: LayoutQualifier) -> Self {
        self.layout = layout;
        self
    }

    pub fn is_array(&self) -> bool {
        self.array_size > 0
    }

    pub fn is_matrix(&self) -> bool {
        self.primary_size > 1 && self.secondary_size > 1
    }

    pub fn is_vector(&self) -> bool {
        self.primary_size > 1 && self.secondary_size == 1
    }

    /// A single component: not a vector, matrix, struct or array.
    pub fn is_scalar(&self) -> bool {
        self.primary_size == 1
            && self.secondary_size == 1
            && self.structure.is_none()
            && !self.is_array()
    }

    pub fn is_struct(&self) -> bool {
        self.basic == BasicType::Struct
    }

    pub fn is_sampler(&self) -> bool {
        self.basic.is_sampler()
    }

    pub fn is_const(&self) -> bool {
        self.qualifier == Qualifier::Const
    }

    /// Vector size for vectors, column count for matrices, 1 otherwise.
    pub fn nominal_size(&self) -> u8 {
        self.primary_size
    }

    pub fn cols(&self) -> u8 {
        self.primary_size
    }

    pub fn rows(&self) -> u8 {
        self.secondary_size
    }

    /// Array multiplicity: `max(1, array_size)`.
    pub fn element_count(&self) -> u32 {
        self.array_size.max(1)
    }

    /// Number of scalar components across all array elements and fields.
    pub fn object_size(&self) -> usize {
        let element = match &self.structure {
            Some(structure) => structure.object_size(),
            None => self.primary_size as usize * self.secondary_size as usize,
        };
        element * self.element_count() as usize
    }

    /// Drops the array dimension, leaving the element type.
    pub fn clear_arrayness(&mut self) {
        self.array_size = 0;
    }

    /// The element type of an array type, or a copy of `self`.
    pub fn element_type(&self) -> Type {
        let mut element = self.clone();
        element.clear_arrayness();
        element
    }

    pub fn fields(&self) -> &[Field] {
        if let Some(structure) = &self.structure {
            &structure.fields
        } else if let Some(block) = &self.interface_block {
            &block.fields
        } else {
            &[]
        }
    }
}

/// Shape equality: kind, sizes, array size and struct layout.
/// Precision, qualifier and layout qualifiers do not participate.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        self.basic == other.basic
            && self.primary_size == other.primary_size
            && self.secondary_size == other.secondary_size
            && self.array_size == other.array_size
            && self.structure == other.structure
            && self.interface_block == other.interface_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intern::Interner;

    #[test]
    fn shape_predicates() {
        let f = Type::scalar(BasicType::Float);
        assert!(f.is_scalar() && !f.is_vector() && !f.is_matrix());

        let v = Type::vector(BasicType::Float, 3);
        assert!(v.is_vector() && !v.is_scalar() && !v.is_matrix());

        let m = Type::matrix(BasicType::Float, 3, 2);
        assert!(m.is_matrix() && !m.is_vector());
        assert_eq!(m.cols(), 3);
        assert_eq!(m.rows(), 2);
    }

    #[test]
    fn array_axis_is_independent() {
        let arr = Type::vector(BasicType::Float, 4).with_array_size(3);
        assert!(arr.is_array());
        assert!(arr.is_vector());
        assert!(!arr.is_scalar());
        assert_eq!(arr.element_count(), 3);
        assert_eq!(arr.object_size(), 12);
        assert_eq!(arr.element_type().object_size(), 4);
    }

    #[test]
    fn element_count_of_non_array_is_one() {
        let m = Type::matrix(BasicType::Float, 4, 4);
        assert_eq!(m.element_count(), 1);
        assert_eq!(m.object_size(), 16);
    }

    #[test]
    fn struct_object_size_sums_fields() {
        let names = Interner::new();
        let s = Arc::new(Structure {
            name: Some(names.intern("Light")),
            fields: vec![
                Field {
                    name: names.intern("pos"),
                    ty: Type::vector(BasicType::Float, 3),
                },
                Field {
                    name: names.intern("weights"),
                    ty: Type::scalar(BasicType::Float).with_array_size(2),
                },
            ],
        });
        let ty = Type::from_structure(s).with_array_size(2);
        assert!(ty.is_struct());
        assert!(!ty.is_scalar());
        assert_eq!(ty.object_size(), 10);
    }

    #[test]
    fn equality_ignores_precision_and_qualifier() {
        let a = Type::vector(BasicType::Float, 2).with_precision(Precision::High);
        let b = Type::vector(BasicType::Float, 2).with_qualifier(Qualifier::Const);
        assert_eq!(a, b);
        assert_ne!(a, Type::vector(BasicType::Int, 2));
        assert_ne!(a, a.clone().with_array_size(2));
    }

    #[test]
    fn precision_is_ordered() {
        assert!(Precision::High > Precision::Medium);
        assert_eq!(Precision::Low.max(Precision::Undefined), Precision::Low);
    }

    #[test]
    fn sampler_kinds() {
        assert!(BasicType::Sampler2D.is_sampler());
        assert!(BasicType::USampler3D.is_sampler());
        assert!(BasicType::Sampler2DShadow.is_shadow_sampler());
        assert!(!BasicType::Float.is_sampler());
    }
}
