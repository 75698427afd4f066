//! Operators carried by unary, binary and aggregate nodes.

/// Every operator the front-end and the builder can attach to a node.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Op {
    /// An aggregate whose role has not been decided yet.
    Null,
    Sequence,
    Comma,
    FunctionCall,
    Function,
    Parameters,
    Declaration,
    Prototype,

    // Unary
    Negative,
    LogicalNot,
    VectorLogicalNot,
    PostIncrement,
    PostDecrement,
    PreIncrement,
    PreDecrement,

    // Binary arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    VectorTimesScalar,
    VectorTimesMatrix,
    MatrixTimesVector,
    MatrixTimesScalar,
    MatrixTimesMatrix,

    // Comparison and logic
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
    LogicalOr,
    LogicalXor,
    LogicalAnd,

    // Access
    IndexDirect,
    IndexIndirect,
    IndexDirectStruct,
    IndexDirectInterfaceBlock,
    VectorSwizzle,

    // Built-in functions
    Radians,
    Degrees,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Exp,
    Log,
    Exp2,
    Log2,
    Sqrt,
    InverseSqrt,
    Abs,
    Sign,
    Floor,
    Ceil,
    Fract,
    Length,
    Normalize,
    DFdx,
    DFdy,
    Fwidth,
    Any,
    All,

    // Constructors
    ConstructInt,
    ConstructUInt,
    ConstructBool,
    ConstructFloat,
    ConstructVec2,
    ConstructVec3,
    ConstructVec4,
    ConstructBVec2,
    ConstructBVec3,
    ConstructBVec4,
    ConstructIVec2,
    ConstructIVec3,
    ConstructIVec4,
    ConstructUVec2,
    ConstructUVec3,
    ConstructUVec4,
    ConstructMat2,
    ConstructMat3,
    ConstructMat4,
    ConstructStruct,

    // Assignment
    Assign,
    Initialize,
    AddAssign,
    SubAssign,
    MulAssign,
    VectorTimesMatrixAssign,
    VectorTimesScalarAssign,
    MatrixTimesScalarAssign,
    MatrixTimesMatrixAssign,
    DivAssign,

    // Branches
    Kill,
    Return,
    Break,
    Continue,
}

impl Op {
    /// Source spelling, or `""` for operators with none.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initialize | Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::DivAssign => "/=",
            Self::MulAssign
            | Self::VectorTimesMatrixAssign
            | Self::VectorTimesScalarAssign
            | Self::MatrixTimesScalarAssign
            | Self::MatrixTimesMatrixAssign => "*=",
            Self::IndexDirect | Self::IndexIndirect => "[]",
            Self::IndexDirectStruct | Self::IndexDirectInterfaceBlock | Self::VectorSwizzle => ".",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul
            | Self::VectorTimesScalar
            | Self::VectorTimesMatrix
            | Self::MatrixTimesVector
            | Self::MatrixTimesScalar
            | Self::MatrixTimesMatrix => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessThanEqual => "<=",
            Self::GreaterThanEqual => ">=",
            Self::LogicalOr => "||",
            Self::LogicalXor => "^^",
            Self::LogicalAnd => "&&",
            Self::Negative => "-",
            Self::VectorLogicalNot => "not",
            Self::LogicalNot => "!",
            Self::PostIncrement | Self::PreIncrement => "++",
            Self::PostDecrement | Self::PreDecrement => "--",
            Self::Radians => "radians",
            Self::Degrees => "degrees",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Exp2 => "exp2",
            Self::Log2 => "log2",
            Self::Sqrt => "sqrt",
            Self::InverseSqrt => "inversesqrt",
            Self::Abs => "abs",
            Self::Sign => "sign",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Fract => "fract",
            Self::Length => "length",
            Self::Normalize => "normalize",
            Self::DFdx => "dFdx",
            Self::DFdy => "dFdy",
            Self::Fwidth => "fwidth",
            Self::Any => "any",
            Self::All => "all",
            Self::Kill => "discard",
            Self::Return => "return",
            Self::Break => "break",
            Self::Continue => "continue",
            _ => "",
        }
    }

    /// Returns `true` if the operator writes to its left operand.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::PostIncrement
                | Self::PostDecrement
                | Self::PreIncrement
                | Self::PreDecrement
                | Self::Assign
                | Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::VectorTimesMatrixAssign
                | Self::VectorTimesScalarAssign
                | Self::MatrixTimesScalarAssign
                | Self::MatrixTimesMatrixAssign
                | Self::DivAssign
        )
    }

    pub fn is_constructor(self) -> bool {
        matches!(
            self,
            Self::ConstructInt
                | Self::ConstructUInt
                | Self::ConstructBool
                | Self::ConstructFloat
                | Self::ConstructVec2
                | Self::ConstructVec3
                | Self::ConstructVec4
                | Self::ConstructBVec2
                | Self::ConstructBVec3
                | Self::ConstructBVec4
                | Self::ConstructIVec2
                | Self::ConstructIVec3
                | Self::ConstructIVec4
                | Self::ConstructUVec2
                | Self::ConstructUVec3
                | Self::ConstructUVec4
                | Self::ConstructMat2
                | Self::ConstructMat3
                | Self::ConstructMat4
                | Self::ConstructStruct
        )
    }

    /// `==`, `!=`, `<`, `>`, `<=`, `>=`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::GreaterThan
                | Self::LessThanEqual
                | Self::GreaterThanEqual
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::GreaterThan | Self::LessThanEqual | Self::GreaterThanEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::LogicalOr | Self::LogicalXor | Self::LogicalAnd)
    }

    pub fn is_branch(self) -> bool {
        matches!(self, Self::Kill | Self::Return | Self::Break | Self::Continue)
    }
}

/// The three loop forms of the language.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum LoopKind {
    For,
    While,
    DoWhile,
}
