//! Compile-time scalar values.
//!
//! A [`ConstantUnion`] holds exactly one scalar of one of the four primitive
//! kinds. All arithmetic is defined only between operands of the same kind;
//! mixing kinds yields `None` rather than a guessed value. Overflow and
//! division policy belongs to the folder, not to this type.

use std::cmp::Ordering;
use std::fmt;

use crate::types::BasicType;

/// One scalar component of a constant value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstantUnion {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
}

impl Default for ConstantUnion {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl ConstantUnion {
    /// The basic kind this value is tagged with.
    pub fn basic_type(self) -> BasicType {
        match self {
            Self::Bool(_) => BasicType::Bool,
            Self::Int(_) => BasicType::Int,
            Self::UInt(_) => BasicType::UInt,
            Self::Float(_) => BasicType::Float,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_uint(self) -> Option<u32> {
        match self {
            Self::UInt(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` if the value is numerically zero (or `false`).
    pub fn is_zero(self) -> bool {
        match self {
            Self::Bool(v) => !v,
            Self::Int(v) => v == 0,
            Self::UInt(v) => v == 0,
            Self::Float(v) => v == 0.0,
        }
    }

    /// Component-wise `+`. Integers wrap.
    pub fn try_add(self, rhs: Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Int(l), Self::Int(r)) => Some(Self::Int(l.wrapping_add(r))),
            (Self::UInt(l), Self::UInt(r)) => Some(Self::UInt(l.wrapping_add(r))),
            (Self::Float(l), Self::Float(r)) => Some(Self::Float(l + r)),
            _ => None,
        }
    }

    /// Component-wise `-`. Integers wrap.
    pub fn try_sub(self, rhs: Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Int(l), Self::Int(r)) => Some(Self::Int(l.wrapping_sub(r))),
            (Self::UInt(l), Self::UInt(r)) => Some(Self::UInt(l.wrapping_sub(r))),
            (Self::Float(l), Self::Float(r)) => Some(Self::Float(l - r)),
            _ => None,
        }
    }

    /// Component-wise `*`. Integers wrap.
    pub fn try_mul(self, rhs: Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Int(l), Self::Int(r)) => Some(Self::Int(l.wrapping_mul(r))),
            (Self::UInt(l), Self::UInt(r)) => Some(Self::UInt(l.wrapping_mul(r))),
            (Self::Float(l), Self::Float(r)) => Some(Self::Float(l * r)),
            _ => None,
        }
    }

    /// Component-wise `/`. Integer division by zero yields `None`; the
    /// folder applies its clamping policy before reaching this point.
    pub fn try_div(self, rhs: Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Int(l), Self::Int(r)) if r != 0 => Some(Self::Int(l.wrapping_div(r))),
            (Self::UInt(l), Self::UInt(r)) if r != 0 => Some(Self::UInt(l / r)),
            (Self::Float(l), Self::Float(r)) => Some(Self::Float(l / r)),
            _ => None,
        }
    }

    pub fn logical_and(self, rhs: Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Bool(l), Self::Bool(r)) => Some(Self::Bool(l && r)),
            _ => None,
        }
    }

    pub fn logical_or(self, rhs: Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Bool(l), Self::Bool(r)) => Some(Self::Bool(l || r)),
            _ => None,
        }
    }

    /// `^^`: true when exactly one operand is true.
    pub fn logical_xor(self, rhs: Self) -> Option<Self> {
        match (self, rhs) {
            (Self::Bool(l), Self::Bool(r)) => Some(Self::Bool(l != r)),
            _ => None,
        }
    }
}

/// Ordering exists only between numeric values of the same kind.
impl PartialOrd for ConstantUnion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(l), Self::Int(r)) => l.partial_cmp(r),
            (Self::UInt(l), Self::UInt(r)) => l.partial_cmp(r),
            (Self::Float(l), Self::Float(r)) => l.partial_cmp(r),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantUnion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}u"),
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}
