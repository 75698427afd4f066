//! Compile-time evaluation of operators on constant leaves.
//!
//! Numeric edge cases are never errors: division by zero produces a clamped
//! value and a warning. Everything the folder has no rule for fails closed
//! with [`BuildError::Unfoldable`]; the builder then keeps the unfolded node.

use std::borrow::Cow;

use sable_ir::{BasicType, Constant, ConstantUnion, InfoSink, Op, Qualifier, SourceLoc, Type};

use crate::error::BuildError;

const DIVIDE_BY_ZERO: &str = "Divide by zero error during constant folding";

fn bool_constant(value: bool) -> Constant {
    Constant {
        values: vec![ConstantUnion::Bool(value)],
        ty: Type::scalar(BasicType::Bool).with_qualifier(Qualifier::Const),
    }
}

fn floats(values: &[ConstantUnion]) -> Option<Vec<f32>> {
    values.iter().map(|v| v.as_float()).collect()
}

fn componentwise(
    op: Op,
    lhs: &[ConstantUnion],
    rhs: &[ConstantUnion],
    f: impl Fn(ConstantUnion, ConstantUnion) -> Option<ConstantUnion>,
) -> Result<Vec<ConstantUnion>, BuildError> {
    if lhs.len() != rhs.len() {
        return Err(BuildError::Unfoldable { op });
    }
    lhs.iter()
        .zip(rhs)
        .map(|(&l, &r)| f(l, r).ok_or(BuildError::Unfoldable { op }))
        .collect()
}

fn divide(
    lhs: &[ConstantUnion],
    rhs: &[ConstantUnion],
    loc: SourceLoc,
    sink: &mut InfoSink,
) -> Result<Vec<ConstantUnion>, BuildError> {
    let op = Op::Div;
    if lhs.len() != rhs.len() {
        return Err(BuildError::Unfoldable { op });
    }
    let mut out = Vec::with_capacity(lhs.len());
    for (&l, &r) in lhs.iter().zip(rhs) {
        if l.basic_type() != r.basic_type() || l.basic_type() == BasicType::Bool {
            sink.internal_error(loc, "Constant folding cannot be done for \"/\"");
            return Err(BuildError::Unfoldable { op });
        }
        if !r.is_zero() {
            out.push(l.try_div(r).ok_or(BuildError::Unfoldable { op })?);
            continue;
        }
        sink.warning(loc, DIVIDE_BY_ZERO);
        // Integer results saturate upwards regardless of the dividend's sign.
        out.push(match l {
            ConstantUnion::Float(l) if l < 0.0 => ConstantUnion::Float(-f32::MAX),
            ConstantUnion::Float(_) => ConstantUnion::Float(f32::MAX),
            ConstantUnion::Int(_) => ConstantUnion::Int(i32::MAX),
            _ => ConstantUnion::UInt(u32::MAX),
        });
    }
    Ok(out)
}

/// `left * right` for column-major matrices; element `[col * rows + row]`.
fn matrix_times_matrix(
    left: &Constant,
    right: &Constant,
    loc: SourceLoc,
    sink: &mut InfoSink,
) -> Result<Constant, BuildError> {
    let op = Op::MatrixTimesMatrix;
    let (Some(l), Some(r)) = (floats(&left.values), floats(&right.values)) else {
        sink.internal_error(loc, "Constant Folding cannot be done for matrix multiply");
        return Err(BuildError::Unfoldable { op });
    };
    let left_cols = left.ty.cols() as usize;
    let left_rows = left.ty.rows() as usize;
    let right_cols = right.ty.cols() as usize;
    let right_rows = right.ty.rows() as usize;
    if left_cols != right_rows
        || l.len() != left_cols * left_rows
        || r.len() != right_cols * right_rows
    {
        sink.internal_error(loc, "Constant Folding matrix operands do not agree");
        return Err(BuildError::Unfoldable { op });
    }

    let result_cols = right_cols;
    let result_rows = left_rows;
    let mut out = vec![0.0f32; result_cols * result_rows];
    for row in 0..result_rows {
        for col in 0..result_cols {
            out[result_rows * col + row] = (0..left_cols)
                .map(|i| l[i * left_rows + row] * r[col * right_rows + i])
                .sum();
        }
    }

    let mut ty = left.ty.clone();
    ty.primary_size = right.ty.cols();
    ty.secondary_size = left.ty.rows();
    Ok(Constant {
        values: out.into_iter().map(ConstantUnion::Float).collect(),
        ty,
    })
}

fn matrix_times_vector(
    matrix: &Constant,
    vector: &Constant,
    loc: SourceLoc,
    sink: &mut InfoSink,
) -> Result<Constant, BuildError> {
    let op = Op::MatrixTimesVector;
    let (Some(m), Some(v)) = (floats(&matrix.values), floats(&vector.values)) else {
        sink.internal_error(loc, "Constant Folding cannot be done for matrix times vector");
        return Err(BuildError::Unfoldable { op });
    };
    let cols = matrix.ty.cols() as usize;
    let rows = matrix.ty.rows() as usize;
    if m.len() != cols * rows || v.len() != cols {
        sink.internal_error(loc, "Constant Folding matrix operands do not agree");
        return Err(BuildError::Unfoldable { op });
    }

    let values = (0..rows)
        .map(|row| (0..cols).map(|col| m[col * rows + row] * v[col]).sum::<f32>())
        .map(ConstantUnion::Float)
        .collect();
    let mut ty = vector.ty.clone();
    ty.primary_size = matrix.ty.rows();
    Ok(Constant { values, ty })
}

fn vector_times_matrix(
    vector: &Constant,
    matrix: &Constant,
    loc: SourceLoc,
    sink: &mut InfoSink,
) -> Result<Constant, BuildError> {
    let op = Op::VectorTimesMatrix;
    let (Some(v), Some(m)) = (floats(&vector.values), floats(&matrix.values)) else {
        sink.internal_error(loc, "Constant Folding cannot be done for vector times matrix");
        return Err(BuildError::Unfoldable { op });
    };
    let cols = matrix.ty.cols() as usize;
    let rows = matrix.ty.rows() as usize;
    if m.len() != cols * rows || v.len() != rows {
        sink.internal_error(loc, "Constant Folding matrix operands do not agree");
        return Err(BuildError::Unfoldable { op });
    }

    let values = (0..cols)
        .map(|col| (0..rows).map(|row| v[row] * m[col * rows + row]).sum::<f32>())
        .map(ConstantUnion::Float)
        .collect();
    let mut ty = vector.ty.clone();
    ty.primary_size = matrix.ty.cols();
    Ok(Constant { values, ty })
}

/// Positional, field-by-field comparison of two flattened struct values.
///
/// Returns `None` when the value lists are too short for the type.
fn compare_structure(ty: &Type, left: &[ConstantUnion], right: &[ConstantUnion]) -> Option<bool> {
    let element = ty.element_type();
    let stride = element.object_size();
    for i in 0..ty.element_count() as usize {
        let range = i * stride..(i + 1) * stride;
        if !compare_fields(&element, left.get(range.clone())?, right.get(range)?)? {
            return Some(false);
        }
    }
    Some(true)
}

fn compare_fields(ty: &Type, left: &[ConstantUnion], right: &[ConstantUnion]) -> Option<bool> {
    let mut offset = 0;
    for field in ty.fields() {
        let size = field.ty.object_size();
        let range = offset..offset + size;
        let (l, r) = (left.get(range.clone())?, right.get(range)?);
        let equal = if field.ty.is_struct() {
            compare_structure(&field.ty, l, r)?
        } else {
            l == r
        };
        if !equal {
            return Some(false);
        }
        offset += size;
    }
    Some(true)
}

fn equal(left: &Constant, lhs: &[ConstantUnion], rhs: &[ConstantUnion]) -> Option<bool> {
    if left.ty.is_struct() {
        compare_structure(&left.ty, lhs, rhs)
    } else {
        Some(lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(l, r)| l == r))
    }
}

/// Folds `left op right`, where the operator has already been promoted.
pub fn fold_binary(
    op: Op,
    left: &Constant,
    right: &Constant,
    loc: SourceLoc,
    sink: &mut InfoSink,
) -> Result<Constant, BuildError> {
    // A size-1 operand is splatted against the other one.
    let (lhs, rhs, ty): (Cow<'_, [ConstantUnion]>, Cow<'_, [ConstantUnion]>, &Type) =
        match (left.values.len(), right.values.len()) {
            (l, 1) if l > 1 => (
                Cow::Borrowed(left.values.as_slice()),
                Cow::Owned(vec![right.values[0]; l]),
                &left.ty,
            ),
            (1, r) if r > 1 => (
                Cow::Owned(vec![left.values[0]; r]),
                Cow::Borrowed(right.values.as_slice()),
                &right.ty,
            ),
            _ => (
                Cow::Borrowed(left.values.as_slice()),
                Cow::Borrowed(right.values.as_slice()),
                &left.ty,
            ),
        };

    let values = match op {
        Op::Add => componentwise(op, &lhs, &rhs, ConstantUnion::try_add)?,
        Op::Sub => componentwise(op, &lhs, &rhs, ConstantUnion::try_sub)?,
        Op::Mul | Op::VectorTimesScalar | Op::MatrixTimesScalar => {
            componentwise(op, &lhs, &rhs, ConstantUnion::try_mul)?
        }
        Op::Div => divide(&lhs, &rhs, loc, sink)?,
        Op::MatrixTimesMatrix => return matrix_times_matrix(left, right, loc, sink),
        Op::MatrixTimesVector => return matrix_times_vector(left, right, loc, sink),
        Op::VectorTimesMatrix => return vector_times_matrix(left, right, loc, sink),
        Op::LogicalAnd => componentwise(op, &lhs, &rhs, ConstantUnion::logical_and)?,
        Op::LogicalOr => componentwise(op, &lhs, &rhs, ConstantUnion::logical_or)?,
        Op::LogicalXor => componentwise(op, &lhs, &rhs, ConstantUnion::logical_xor)?,
        Op::LessThan | Op::GreaterThan | Op::LessThanEqual | Op::GreaterThanEqual => {
            let (Some(l), Some(r)) = (lhs.first(), rhs.first()) else {
                return Err(BuildError::Unfoldable { op });
            };
            let result = match op {
                Op::LessThan => l < r,
                Op::GreaterThan => l > r,
                Op::LessThanEqual => !(l > r),
                _ => !(l < r),
            };
            return Ok(bool_constant(result));
        }
        Op::Equal | Op::NotEqual => {
            let Some(same) = equal(left, &lhs, &rhs) else {
                sink.internal_error(loc, "Constant structure does not match its type");
                return Err(BuildError::Unfoldable { op });
            };
            return Ok(bool_constant(if op == Op::Equal { same } else { !same }));
        }
        _ => {
            sink.internal_error(loc, "Invalid operator for constant folding");
            return Err(BuildError::Unfoldable { op });
        }
    };

    Ok(Constant {
        values,
        ty: ty.clone(),
    })
}

/// Folds a unary operator. Only negation and logical not have rules.
pub fn fold_unary(
    op: Op,
    operand: &Constant,
    loc: SourceLoc,
    sink: &mut InfoSink,
) -> Result<Constant, BuildError> {
    let values = operand
        .values
        .iter()
        .map(|&v| match (op, v) {
            (Op::Negative, ConstantUnion::Float(f)) => Ok(ConstantUnion::Float(-f)),
            (Op::Negative, ConstantUnion::Int(i)) => Ok(ConstantUnion::Int(i.wrapping_neg())),
            (Op::Negative, ConstantUnion::UInt(u)) => {
                Ok(ConstantUnion::UInt((u as i32).wrapping_neg() as u32))
            }
            (Op::LogicalNot, ConstantUnion::Bool(b)) => Ok(ConstantUnion::Bool(!b)),
            (Op::Negative | Op::LogicalNot, _) => {
                sink.internal_error(loc, "Unary operation not folded into constant");
                Err(BuildError::Unfoldable { op })
            }
            _ => Err(BuildError::Unfoldable { op }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Constant {
        values,
        ty: operand.ty.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sable_ir::{Field, Interner, Severity, Structure};

    use super::*;

    fn c(values: Vec<ConstantUnion>, ty: Type) -> Constant {
        Constant {
            values,
            ty: ty.with_qualifier(Qualifier::Const),
        }
    }

    fn fs(values: &[f32]) -> Vec<ConstantUnion> {
        values.iter().copied().map(ConstantUnion::Float).collect()
    }

    fn scalar_f(v: f32) -> Constant {
        c(fs(&[v]), Type::scalar(BasicType::Float))
    }

    fn scalar_i(v: i32) -> Constant {
        c(vec![ConstantUnion::Int(v)], Type::scalar(BasicType::Int))
    }

    fn fold(op: Op, l: &Constant, r: &Constant) -> (Result<Constant, BuildError>, InfoSink) {
        let mut sink = InfoSink::new();
        let out = fold_binary(op, l, r, SourceLoc::default(), &mut sink);
        (out, sink)
    }

    #[test]
    fn scalar_arithmetic_matches_primitive() {
        for (a, b) in [(3, 4), (-7, 2), (i32::MAX, 1), (0, -5)] {
            let (l, r) = (scalar_i(a), scalar_i(b));
            assert_eq!(fold(Op::Add, &l, &r).0.unwrap().values, vec![ConstantUnion::Int(a.wrapping_add(b))]);
            assert_eq!(fold(Op::Sub, &l, &r).0.unwrap().values, vec![ConstantUnion::Int(a.wrapping_sub(b))]);
            assert_eq!(fold(Op::Mul, &l, &r).0.unwrap().values, vec![ConstantUnion::Int(a.wrapping_mul(b))]);
        }
    }

    #[test]
    fn float_divide_by_zero_clamps_by_sign() {
        let (out, sink) = fold(Op::Div, &scalar_f(3.0), &scalar_f(0.0));
        assert_eq!(out.unwrap().values, fs(&[f32::MAX]));
        assert_eq!(sink.count(Severity::Warning), 1);
        assert_eq!(sink.diagnostics()[0].message, DIVIDE_BY_ZERO);

        let (out, _) = fold(Op::Div, &scalar_f(-3.0), &scalar_f(0.0));
        assert_eq!(out.unwrap().values, fs(&[-f32::MAX]));

        let (out, _) = fold(Op::Div, &scalar_f(0.0), &scalar_f(0.0));
        assert_eq!(out.unwrap().values, fs(&[f32::MAX]));
    }

    #[test]
    fn integer_divide_by_zero_saturates() {
        let (out, sink) = fold(Op::Div, &scalar_i(-9), &scalar_i(0));
        assert_eq!(out.unwrap().values, vec![ConstantUnion::Int(i32::MAX)]);
        assert_eq!(sink.count(Severity::Warning), 1);

        let u = |v| c(vec![ConstantUnion::UInt(v)], Type::scalar(BasicType::UInt));
        let (out, _) = fold(Op::Div, &u(9), &u(0));
        assert_eq!(out.unwrap().values, vec![ConstantUnion::UInt(u32::MAX)]);
    }

    #[test]
    fn vector_division_matches_primitive_lane_by_lane() {
        let ivec = |v: [i32; 3]| {
            c(
                v.into_iter().map(ConstantUnion::Int).collect(),
                Type::vector(BasicType::Int, 3),
            )
        };
        let (out, sink) = fold(Op::Div, &ivec([i32::MIN, 7, -8]), &ivec([-1, 0, 3]));
        assert_eq!(
            out.unwrap().values,
            vec![
                ConstantUnion::Int(i32::MIN),
                ConstantUnion::Int(i32::MAX),
                ConstantUnion::Int(-2),
            ]
        );
        assert_eq!(sink.count(Severity::Warning), 1);

        let (out, sink) = fold(Op::Div, &scalar_f(-1.0), &scalar_f(-0.0));
        assert_eq!(out.unwrap().values, fs(&[-f32::MAX]));
        assert_eq!(sink.count(Severity::Warning), 1);
    }

    #[test]
    fn division_of_bools_is_internal_error() {
        let b = |v| c(vec![ConstantUnion::Bool(v)], Type::scalar(BasicType::Bool));
        let (out, sink) = fold(Op::Div, &b(true), &b(false));
        assert!(matches!(out, Err(BuildError::Unfoldable { op: Op::Div })));
        assert_eq!(sink.count(Severity::InternalError), 1);
        assert_eq!(sink.count(Severity::Warning), 0);
    }

    #[test]
    fn scalar_is_splatted_against_vector() {
        let v = c(fs(&[2.0, 3.0, 4.0, 5.0]), Type::vector(BasicType::Float, 4));
        let (out, _) = fold(Op::Add, &scalar_f(1.0), &v);
        let out = out.unwrap();
        assert_eq!(out.values, fs(&[3.0, 4.0, 5.0, 6.0]));
        assert!(out.ty.is_vector());

        let (out, _) = fold(Op::VectorTimesScalar, &v, &scalar_f(2.0));
        assert_eq!(out.unwrap().values, fs(&[4.0, 6.0, 8.0, 10.0]));
    }

    #[test]
    fn matrix_products() {
        // Column-major [[1, 2], [3, 4]] i.e. columns (1,2) and (3,4).
        let m = c(fs(&[1.0, 2.0, 3.0, 4.0]), Type::matrix(BasicType::Float, 2, 2));
        let v = c(fs(&[5.0, 6.0]), Type::vector(BasicType::Float, 2));

        let (out, _) = fold(Op::MatrixTimesVector, &m, &v);
        assert_eq!(out.unwrap().values, fs(&[1.0 * 5.0 + 3.0 * 6.0, 2.0 * 5.0 + 4.0 * 6.0]));

        let (out, _) = fold(Op::VectorTimesMatrix, &v, &m);
        assert_eq!(out.unwrap().values, fs(&[5.0 * 1.0 + 6.0 * 2.0, 5.0 * 3.0 + 6.0 * 4.0]));

        let (out, _) = fold(Op::MatrixTimesMatrix, &m, &m);
        let out = out.unwrap();
        assert_eq!(out.values, fs(&[7.0, 10.0, 15.0, 22.0]));
        assert_eq!((out.ty.cols(), out.ty.rows()), (2, 2));
    }

    #[test]
    fn non_square_matrix_product_shape() {
        // 3 columns x 2 rows times 2 columns x 3 rows.
        let l = c(fs(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]), Type::matrix(BasicType::Float, 3, 2));
        let r = c(fs(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]), Type::matrix(BasicType::Float, 2, 3));
        let (out, _) = fold(Op::MatrixTimesMatrix, &l, &r);
        let out = out.unwrap();
        assert_eq!((out.ty.cols(), out.ty.rows()), (2, 2));
        assert_eq!(out.values, fs(&[4.0, 5.0, 10.0, 11.0]));
    }

    #[test]
    fn integer_matrix_multiply_is_internal_error() {
        let ints = |n| c(vec![ConstantUnion::Int(1); n], Type::matrix(BasicType::Int, 2, 2));
        let (out, sink) = fold(Op::MatrixTimesMatrix, &ints(4), &ints(4));
        assert!(matches!(out, Err(BuildError::Unfoldable { .. })));
        assert_eq!(sink.count(Severity::InternalError), 1);
        assert_eq!(
            sink.diagnostics()[0].message,
            "Constant Folding cannot be done for matrix multiply"
        );
    }

    #[test]
    fn relational_and_equality_results_are_const_bool() {
        let (out, _) = fold(Op::LessThanEqual, &scalar_i(2), &scalar_i(2));
        let out = out.unwrap();
        assert_eq!(out.values, vec![ConstantUnion::Bool(true)]);
        assert_eq!(out.ty.qualifier, Qualifier::Const);
        assert_eq!(out.ty.basic, BasicType::Bool);

        let a = c(fs(&[1.0, 2.0]), Type::vector(BasicType::Float, 2));
        let b = c(fs(&[1.0, 3.0]), Type::vector(BasicType::Float, 2));
        assert_eq!(fold(Op::Equal, &a, &b).0.unwrap().values, vec![ConstantUnion::Bool(false)]);
        // Differs in one component only; still unequal.
        assert_eq!(fold(Op::NotEqual, &a, &b).0.unwrap().values, vec![ConstantUnion::Bool(true)]);
        assert_eq!(fold(Op::NotEqual, &a, &a).0.unwrap().values, vec![ConstantUnion::Bool(false)]);
    }

    #[test]
    fn nested_struct_equality() {
        let names = Interner::new();
        let inner = Arc::new(Structure {
            name: Some(names.intern("Inner")),
            fields: vec![Field {
                name: names.intern("v"),
                ty: Type::vector(BasicType::Float, 2),
            }],
        });
        let outer = Arc::new(Structure {
            name: Some(names.intern("Outer")),
            fields: vec![
                Field {
                    name: names.intern("inner"),
                    ty: Type::from_structure(inner).with_array_size(2),
                },
                Field {
                    name: names.intern("w"),
                    ty: Type::scalar(BasicType::Float),
                },
            ],
        });
        let ty = Type::from_structure(outer);
        assert_eq!(ty.object_size(), 5);

        let a = c(fs(&[1.0, 2.0, 3.0, 4.0, 5.0]), ty.clone());
        let b = c(fs(&[1.0, 2.0, 3.0, 9.0, 5.0]), ty);
        assert_eq!(fold(Op::Equal, &a, &a).0.unwrap().values, vec![ConstantUnion::Bool(true)]);
        assert_eq!(fold(Op::Equal, &a, &b).0.unwrap().values, vec![ConstantUnion::Bool(false)]);
        assert_eq!(fold(Op::NotEqual, &a, &b).0.unwrap().values, vec![ConstantUnion::Bool(true)]);
    }

    #[test]
    fn unary_negate_and_not() {
        let mut sink = InfoSink::new();
        let loc = SourceLoc::default();
        let u = c(vec![ConstantUnion::UInt(1)], Type::scalar(BasicType::UInt));
        assert_eq!(
            fold_unary(Op::Negative, &u, loc, &mut sink).unwrap().values,
            vec![ConstantUnion::UInt(u32::MAX)]
        );
        let b = c(vec![ConstantUnion::Bool(true)], Type::scalar(BasicType::Bool));
        assert_eq!(
            fold_unary(Op::LogicalNot, &b, loc, &mut sink).unwrap().values,
            vec![ConstantUnion::Bool(false)]
        );
        assert!(sink.is_empty());

        assert!(fold_unary(Op::Negative, &b, loc, &mut sink).is_err());
        assert_eq!(sink.count(Severity::InternalError), 1);

        // No rule: fails without a diagnostic.
        assert!(fold_unary(Op::Sin, &scalar_f(0.5), loc, &mut sink).is_err());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn unknown_binary_operator_fails_closed() {
        let (out, sink) = fold(Op::Mod, &scalar_i(5), &scalar_i(3));
        assert!(out.is_err());
        assert!(sink.has_errors());
    }
}
