//! Operator resolution and result typing.
//!
//! Promotion starts from the left operand's type and only codes the
//! deviations: precision is the higher of the two, the qualifier stays
//! `const` only if both operands are `const`, comparisons yield `bool`, and
//! `*`/`*=` are rewritten into the matching vector/matrix product.

use std::cmp::max;

use sable_ir::{BasicType, Op, Precision, Qualifier, Type};

use crate::error::BuildError;

fn shaped(basic: BasicType, precision: Precision, primary: u8, secondary: u8) -> Type {
    Type::new(basic, precision, Qualifier::Temporary, primary, secondary)
}

fn invalid(op: Op, reason: &'static str) -> BuildError {
    BuildError::InvalidOperand { op, reason }
}

/// Dimensional compatibility of an already-resolved multiply operator.
pub fn validate_multiplication(op: Op, left: &Type, right: &Type) -> bool {
    match op {
        Op::Mul | Op::MulAssign => {
            left.nominal_size() == right.nominal_size()
                && left.secondary_size == right.secondary_size
        }
        Op::VectorTimesScalar | Op::VectorTimesScalarAssign => true,
        Op::VectorTimesMatrix => left.nominal_size() == right.rows(),
        Op::VectorTimesMatrixAssign => {
            left.nominal_size() == right.rows() && left.nominal_size() == right.cols()
        }
        Op::MatrixTimesVector => left.cols() == right.nominal_size(),
        Op::MatrixTimesScalar | Op::MatrixTimesScalarAssign => true,
        Op::MatrixTimesMatrix => left.cols() == right.rows(),
        Op::MatrixTimesMatrixAssign => left.cols() == right.cols() && left.rows() == right.rows(),
        _ => false,
    }
}

/// Resolves the final operator and result type of a binary node.
pub fn promote_binary(op: Op, left: &Type, right: &Type) -> Result<(Op, Type), BuildError> {
    if left.is_array() || right.is_array() {
        return Err(BuildError::ArrayOperand { op });
    }
    if left.basic != right.basic {
        return Err(BuildError::KindMismatch {
            op,
            left: left.basic,
            right: right.basic,
        });
    }

    let precision = max(left.precision, right.precision);
    let mut ty = left.clone().with_precision(precision);
    if !(left.is_const() && right.is_const()) {
        ty.qualifier = Qualifier::Temporary;
    }

    let nominal = max(left.nominal_size(), right.nominal_size());

    // Scalars and structs.
    if nominal == 1 {
        return match op {
            _ if op.is_comparison() => Ok((op, Type::scalar(BasicType::Bool))),
            Op::LogicalAnd | Op::LogicalOr => {
                if left.basic != BasicType::Bool || right.basic != BasicType::Bool {
                    return Err(invalid(op, "operands must be bool"));
                }
                Ok((op, Type::scalar(BasicType::Bool)))
            }
            _ => Ok((op, ty)),
        };
    }

    // At least one operand is a vector or a matrix.
    let basic = left.basic;
    match op {
        Op::Mul => {
            let (resolved, ty) = match (left.is_matrix(), right.is_matrix()) {
                (false, true) if left.is_vector() => (
                    Op::VectorTimesMatrix,
                    shaped(basic, precision, right.cols(), 1),
                ),
                (false, true) => (
                    Op::MatrixTimesScalar,
                    shaped(basic, precision, right.cols(), right.rows()),
                ),
                (true, false) if right.is_vector() => (
                    Op::MatrixTimesVector,
                    shaped(basic, precision, left.rows(), 1),
                ),
                (true, false) => (Op::MatrixTimesScalar, ty),
                (true, true) => (
                    Op::MatrixTimesMatrix,
                    shaped(basic, precision, right.cols(), left.rows()),
                ),
                (false, false) if left.is_vector() && right.is_vector() => (Op::Mul, ty),
                (false, false) => (
                    Op::VectorTimesScalar,
                    shaped(basic, precision, nominal, 1),
                ),
            };
            if !validate_multiplication(resolved, left, right) {
                return Err(invalid(resolved, "operand dimensions do not agree"));
            }
            Ok((resolved, ty))
        }

        Op::MulAssign => {
            let (resolved, ty) = match (left.is_matrix(), right.is_matrix()) {
                (false, true) if left.is_vector() => (Op::VectorTimesMatrixAssign, ty),
                (false, true) => return Err(invalid(op, "cannot assign a matrix product to a scalar")),
                (true, false) if right.is_vector() => {
                    return Err(invalid(op, "cannot assign a vector product to a matrix"));
                }
                (true, false) => (Op::MatrixTimesScalarAssign, ty),
                (true, true) => (
                    Op::MatrixTimesMatrixAssign,
                    shaped(basic, precision, right.cols(), left.rows()),
                ),
                (false, false) if left.is_vector() && right.is_vector() => (Op::MulAssign, ty),
                (false, false) if !left.is_vector() => {
                    return Err(invalid(op, "cannot assign a vector product to a scalar"));
                }
                (false, false) => (
                    Op::VectorTimesScalarAssign,
                    shaped(basic, precision, left.nominal_size(), 1),
                ),
            };
            if !validate_multiplication(resolved, left, right) {
                return Err(invalid(resolved, "operand dimensions do not agree"));
            }
            Ok((resolved, ty))
        }

        Op::Assign
        | Op::Initialize
        | Op::Add
        | Op::Sub
        | Op::Div
        | Op::AddAssign
        | Op::SubAssign
        | Op::DivAssign => {
            if (left.is_matrix() && right.is_vector()) || (left.is_vector() && right.is_matrix()) {
                return Err(invalid(op, "cannot combine a matrix with a vector"));
            }
            if left.nominal_size() != right.nominal_size()
                || left.secondary_size != right.secondary_size
            {
                if !left.is_scalar() && !right.is_scalar() {
                    return Err(invalid(op, "operand sizes do not agree"));
                }
                if matches!(op, Op::Assign | Op::Initialize) {
                    return Err(invalid(op, "cannot assign a scalar to a vector or matrix"));
                }
            }
            let secondary = max(left.secondary_size, right.secondary_size);
            Ok((op, shaped(basic, precision, nominal, secondary)))
        }

        _ if op.is_comparison() => {
            if left.nominal_size() != right.nominal_size()
                || left.secondary_size != right.secondary_size
            {
                return Err(invalid(op, "operand sizes do not agree"));
            }
            Ok((op, Type::scalar(BasicType::Bool)))
        }

        _ => Err(invalid(op, "no promotion rule for vector or matrix operands")),
    }
}

/// Checks a unary operator against its operand and returns the result type.
pub fn promote_unary(op: Op, operand: &Type) -> Result<Type, BuildError> {
    match op {
        Op::LogicalNot => {
            if operand.basic != BasicType::Bool {
                return Err(invalid(op, "operand must be bool"));
            }
        }
        Op::Negative
        | Op::PostIncrement
        | Op::PostDecrement
        | Op::PreIncrement
        | Op::PreDecrement => {
            if operand.basic == BasicType::Bool {
                return Err(invalid(op, "operand must be numeric"));
            }
        }
        // Built-ins already checked against their prototypes.
        Op::Any | Op::All => return Ok(Type::scalar(BasicType::Bool)),
        Op::VectorLogicalNot => {}
        _ => {
            if operand.basic != BasicType::Float {
                return Err(invalid(op, "operand must be float"));
            }
        }
    }
    Ok(operand.clone().with_qualifier(Qualifier::Temporary))
}
