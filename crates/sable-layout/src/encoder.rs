//! Block layout encoders.
//!
//! [`BlockLayoutEncoder`] walks block members and records one
//! [`BlockMemberInfo`] per leaf. Where each member lands is decided by a
//! [`LayoutRule`]; the walk itself is shared by every convention.
//!
//! Offsets are tracked in 4-byte components; a register holds four.

use crate::options::ShaderOutput;
use crate::variable::{BlockMemberInfo, InterfaceBlockField, VariableType};

pub const BYTES_PER_COMPONENT: u32 = 4;
pub const COMPONENTS_PER_REGISTER: u32 = 4;
pub const REGISTER_BYTES: u32 = BYTES_PER_COMPONENT * COMPONENTS_PER_REGISTER;

fn round_up(value: u32, alignment: u32) -> u32 {
    if alignment == 0 {
        value
    } else {
        value.div_ceil(alignment) * alignment
    }
}

/// Moves `offset` to the start of the next register unless already there.
pub fn next_register(offset: &mut u32) {
    *offset = round_up(*offset, COMPONENTS_PER_REGISTER);
}

/// Strides of a member, in components.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Strides {
    pub array: u32,
    pub matrix: u32,
}

/// The arithmetic of one packing convention.
pub trait LayoutRule {
    /// Aligns `offset` for a member of type `ty` and returns its strides.
    fn layout_info(&self, offset: &mut u32, ty: VariableType, array_size: u32, row_major: bool)
        -> Strides;

    /// Moves `offset` past a member placed by [`LayoutRule::layout_info`].
    fn advance(
        &self,
        offset: &mut u32,
        ty: VariableType,
        array_size: u32,
        row_major: bool,
        strides: Strides,
    );

    fn enter_aggregate(&self, offset: &mut u32);

    fn exit_aggregate(&self, offset: &mut u32);
}

/// std140: vectors align to their size (three-component ones to four),
/// arrays, matrices and structs to a whole register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Std140Rule;

impl LayoutRule for Std140Rule {
    fn layout_info(
        &self,
        offset: &mut u32,
        ty: VariableType,
        array_size: u32,
        row_major: bool,
    ) -> Strides {
        let mut strides = Strides::default();
        let alignment = if ty.is_matrix() {
            strides.matrix = COMPONENTS_PER_REGISTER;
            if array_size > 0 {
                strides.array = COMPONENTS_PER_REGISTER * ty.matrix_register_count(row_major);
            }
            COMPONENTS_PER_REGISTER
        } else if array_size > 0 {
            strides.array = COMPONENTS_PER_REGISTER;
            COMPONENTS_PER_REGISTER
        } else {
            match ty.component_count() {
                3 => 4,
                n => n,
            }
        };
        *offset = round_up(*offset, alignment);
        strides
    }

    fn advance(
        &self,
        offset: &mut u32,
        ty: VariableType,
        array_size: u32,
        row_major: bool,
        strides: Strides,
    ) {
        *offset += if array_size > 0 {
            strides.array * array_size
        } else if ty.is_matrix() {
            COMPONENTS_PER_REGISTER * ty.matrix_register_count(row_major)
        } else {
            ty.component_count()
        };
    }

    fn enter_aggregate(&self, offset: &mut u32) {
        next_register(offset);
    }

    fn exit_aggregate(&self, offset: &mut u32) {
        next_register(offset);
    }
}

/// HLSL constant-register packing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HlslRule {
    /// Members share a register while they fit in it.
    #[default]
    Packed,
    /// Every member starts a new register.
    Loose,
}

impl HlslRule {
    pub fn for_output(output: ShaderOutput) -> Self {
        match output {
            ShaderOutput::Hlsl9 => Self::Loose,
            ShaderOutput::Hlsl11 => Self::Packed,
        }
    }

    pub fn is_packed(self) -> bool {
        self == Self::Packed
    }
}

impl LayoutRule for HlslRule {
    fn layout_info(
        &self,
        offset: &mut u32,
        ty: VariableType,
        array_size: u32,
        row_major: bool,
    ) -> Strides {
        let mut strides = Strides::default();

        // Matrices and arrays always begin on a register boundary.
        if !self.is_packed() || ty.is_matrix() || array_size > 0 {
            next_register(offset);
        }

        if ty.is_matrix() {
            strides.matrix = COMPONENTS_PER_REGISTER;
            if array_size > 0 {
                strides.array = COMPONENTS_PER_REGISTER * ty.matrix_register_count(row_major);
            }
        } else if array_size > 0 {
            strides.array = COMPONENTS_PER_REGISTER;
        } else if self.is_packed()
            && ty.component_count() + *offset % COMPONENTS_PER_REGISTER > COMPONENTS_PER_REGISTER
        {
            next_register(offset);
        }
        strides
    }

    fn advance(
        &self,
        offset: &mut u32,
        ty: VariableType,
        array_size: u32,
        row_major: bool,
        strides: Strides,
    ) {
        // The last element only takes the space it uses.
        if array_size > 0 {
            *offset += strides.array * (array_size - 1);
        }
        if ty.is_matrix() {
            *offset += COMPONENTS_PER_REGISTER * (ty.matrix_register_count(row_major) - 1);
            *offset += ty.matrix_component_count(row_major);
        } else if self.is_packed() {
            *offset += ty.component_count();
        } else {
            *offset += COMPONENTS_PER_REGISTER;
        }
    }

    fn enter_aggregate(&self, offset: &mut u32) {
        next_register(offset);
    }

    fn exit_aggregate(&self, _offset: &mut u32) {}
}

/// Walks block members under a [`LayoutRule`].
#[derive(Clone, Debug, Default)]
pub struct BlockLayoutEncoder<R> {
    rule: R,
    current_offset: u32,
    block_info: Vec<BlockMemberInfo>,
}

pub type Std140BlockEncoder = BlockLayoutEncoder<Std140Rule>;
pub type HlslBlockEncoder = BlockLayoutEncoder<HlslRule>;

impl<R: LayoutRule> BlockLayoutEncoder<R> {
    pub fn new(rule: R) -> Self {
        Self {
            rule,
            current_offset: 0,
            block_info: Vec::new(),
        }
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Places one leaf member and returns where it went.
    pub fn encode_type(
        &mut self,
        ty: VariableType,
        array_size: u32,
        row_major: bool,
    ) -> BlockMemberInfo {
        let strides = self
            .rule
            .layout_info(&mut self.current_offset, ty, array_size, row_major);
        let info = BlockMemberInfo {
            offset: self.current_offset * BYTES_PER_COMPONENT,
            array_stride: strides.array * BYTES_PER_COMPONENT,
            matrix_stride: strides.matrix * BYTES_PER_COMPONENT,
            is_row_major_matrix: row_major,
        };
        self.block_info.push(info);
        self.rule
            .advance(&mut self.current_offset, ty, array_size, row_major, strides);
        log::trace!(
            "encoded {:?}{} at byte {}",
            ty.basic,
            if array_size > 0 { format!("[{array_size}]") } else { String::new() },
            info.offset
        );
        info
    }

    /// Lays out block members in order, descending into structs once per
    /// array element.
    pub fn encode_interface_block_fields(&mut self, fields: &[InterfaceBlockField]) {
        for field in fields {
            if field.is_struct() {
                for _ in 0..field.array_size.max(1) {
                    self.enter_aggregate_type();
                    self.encode_interface_block_fields(&field.fields);
                    self.exit_aggregate_type();
                }
            } else {
                self.encode_type(field.ty, field.array_size, field.is_row_major_matrix);
            }
        }
    }

    pub fn enter_aggregate_type(&mut self) {
        self.rule.enter_aggregate(&mut self.current_offset);
    }

    pub fn exit_aggregate_type(&mut self) {
        self.rule.exit_aggregate(&mut self.current_offset);
    }

    pub fn next_register(&mut self) {
        next_register(&mut self.current_offset);
    }

    pub fn skip_registers(&mut self, count: u32) {
        self.current_offset += count * COMPONENTS_PER_REGISTER;
    }

    /// Bytes consumed so far.
    pub fn block_size(&self) -> u32 {
        self.current_offset * BYTES_PER_COMPONENT
    }

    pub fn block_info(&self) -> &[BlockMemberInfo] {
        &self.block_info
    }

    pub fn into_block_info(self) -> Vec<BlockMemberInfo> {
        self.block_info
    }
}

#[cfg(test)]
mod tests {
    use sable_ir::BasicType;

    use super::*;

    fn float(n: u8) -> VariableType {
        VariableType {
            basic: BasicType::Float,
            cols: n,
            rows: 1,
        }
    }

    fn mat(cols: u8, rows: u8) -> VariableType {
        VariableType {
            basic: BasicType::Float,
            cols,
            rows,
        }
    }

    fn offsets<R: LayoutRule>(encoder: &BlockLayoutEncoder<R>) -> Vec<u32> {
        encoder.block_info().iter().map(|i| i.offset).collect()
    }

    #[test]
    fn std140_vec3_aligns_to_register() {
        let mut enc = Std140BlockEncoder::default();
        enc.encode_type(float(2), 0, false);
        enc.encode_type(float(3), 0, false);
        enc.encode_type(float(1), 0, false);
        assert_eq!(offsets(&enc), vec![0, 16, 28]);
        assert_eq!(enc.block_size(), 32);
    }

    #[test]
    fn std140_arrays_and_matrices() {
        let mut enc = Std140BlockEncoder::default();
        enc.encode_type(float(1), 0, false);
        let arr = enc.encode_type(float(1), 3, false);
        assert_eq!((arr.offset, arr.array_stride), (16, 16));

        let m = enc.encode_type(mat(3, 3), 0, false);
        assert_eq!((m.offset, m.matrix_stride, m.array_stride), (64, 16, 0));
        assert_eq!(enc.block_size(), 112);

        let ma = enc.encode_type(mat(2, 4), 2, true);
        assert_eq!((ma.offset, ma.array_stride), (112, 64));
        assert!(ma.is_row_major_matrix);
        assert_eq!(enc.block_size(), 240);
    }

    #[test]
    fn hlsl_packed_shares_registers() {
        let mut enc = HlslBlockEncoder::new(HlslRule::Packed);
        enc.encode_type(float(2), 0, false);
        enc.encode_type(float(1), 0, false);
        // Does not fit in the one remaining component.
        enc.encode_type(float(2), 0, false);
        assert_eq!(offsets(&enc), vec![0, 8, 16]);
        assert_eq!(enc.block_size(), 24);
    }

    #[test]
    fn hlsl_loose_starts_every_member_fresh() {
        let mut enc = HlslBlockEncoder::new(HlslRule::for_output(ShaderOutput::Hlsl9));
        enc.encode_type(float(1), 0, false);
        enc.encode_type(float(1), 0, false);
        assert_eq!(offsets(&enc), vec![0, 16]);
        assert_eq!(enc.block_size(), 32);

        // The last array element still fills its register.
        let mut enc = HlslBlockEncoder::new(HlslRule::Loose);
        let arr = enc.encode_type(float(2), 2, false);
        assert_eq!((arr.offset, arr.array_stride), (0, 16));
        assert_eq!(enc.block_size(), 32);
    }

    #[test]
    fn hlsl_arrays_trim_last_element() {
        let mut enc = HlslBlockEncoder::new(HlslRule::Packed);
        let arr = enc.encode_type(float(1), 3, false);
        assert_eq!(arr.array_stride, 16);
        // Two full registers plus one component.
        assert_eq!(enc.block_size(), 36);

        let m = enc.encode_type(mat(3, 2), 0, false);
        assert_eq!(m.offset, 48);
        // Two column registers, the last holding two rows.
        assert_eq!(enc.block_size(), 48 + 16 * 2 + 8);
    }

    #[test]
    fn structs_are_walked_per_element() {
        let leaf = |name: &str, n: u8| InterfaceBlockField {
            name: name.to_owned(),
            ty: float(n),
            precision: Default::default(),
            array_size: 0,
            is_row_major_matrix: false,
            fields: Vec::new(),
        };
        let s = InterfaceBlockField {
            name: "s".to_owned(),
            ty: VariableType {
                basic: BasicType::Struct,
                cols: 1,
                rows: 1,
            },
            precision: Default::default(),
            array_size: 2,
            is_row_major_matrix: false,
            fields: vec![leaf("a", 1)],
        };
        let fields = vec![leaf("x", 1), s, leaf("y", 1)];

        let mut std = Std140BlockEncoder::default();
        std.encode_interface_block_fields(&fields);
        assert_eq!(offsets(&std), vec![0, 16, 32, 48]);
        assert_eq!(std.block_size(), 52);

        let mut hlsl = HlslBlockEncoder::default();
        hlsl.encode_interface_block_fields(&fields);
        // HLSL does not pad after a struct, so `y` packs behind the last `a`.
        assert_eq!(offsets(&hlsl), vec![0, 16, 32, 36]);
    }

    #[test]
    fn skip_registers_moves_whole_registers() {
        let mut enc = HlslBlockEncoder::default();
        enc.skip_registers(2);
        let info = enc.encode_type(float(4), 0, false);
        assert_eq!(info.offset, 32);
    }
}
