//! Display implementations and text dump for debugging.

use std::fmt;

use crate::node::{Aggregate, Binary, Branch, Constant, Loop, NodeId, Selection, Symbol, Unary};
use crate::ops::{LoopKind, Op};
use crate::traverse::{Traverser, Visit};
use crate::tree::Tree;
use crate::types::{BasicType, Precision, Qualifier, Type};

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => Ok(()),
            Self::Low => write!(f, "lowp"),
            Self::Medium => write!(f, "mediump"),
            Self::High => write!(f, "highp"),
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Temporary => "temporary",
            Self::Global => "global",
            Self::Const => "const",
            Self::Attribute => "attribute",
            Self::VaryingIn => "varying in",
            Self::VaryingOut => "varying out",
            Self::Uniform => "uniform",
            Self::In => "in",
            Self::Out => "out",
            Self::InOut => "inout",
            Self::ConstReadOnly => "const in",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            "" => write!(f, "{self:?}"),
            s => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for LoopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::For => write!(f, "for"),
            Self::While => write!(f, "while"),
            Self::DoWhile => write!(f, "do-while"),
        }
    }
}

fn vector_prefix(basic: BasicType) -> &'static str {
    match basic {
        BasicType::Int => "i",
        BasicType::UInt => "u",
        BasicType::Bool => "b",
        _ => "",
    }
}

/// Shape-only spelling: `float`, `ivec3`, `mat3x2`, `struct Light`.
pub fn format_shape(ty: &Type) -> String {
    let base = if let Some(s) = &ty.structure {
        match &s.name {
            Some(name) => format!("struct {name}"),
            None => "struct".to_string(),
        }
    } else if let Some(block) = &ty.interface_block {
        format!("block {}", block.name)
    } else if ty.is_matrix() {
        if ty.cols() == ty.rows() {
            format!("mat{}", ty.cols())
        } else {
            format!("mat{}x{}", ty.cols(), ty.rows())
        }
    } else if ty.is_vector() {
        format!("{}vec{}", vector_prefix(ty.basic), ty.nominal_size())
    } else {
        ty.basic.as_str().to_string()
    };
    if ty.is_array() {
        format!("{base}[{}]", ty.array_size)
    } else {
        base
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.precision != Precision::Undefined {
            write!(f, "{} ", self.precision)?;
        }
        if self.qualifier != Qualifier::Temporary {
            write!(f, "{} ", self.qualifier)?;
        }
        write!(f, "{}", format_shape(self))
    }
}

struct Dumper {
    out: String,
}

impl Dumper {
    fn line(&mut self, depth: usize, text: fmt::Arguments<'_>) {
        for _ in 0..depth {
            self.out.push_str("  ");
        }
        self.out.push_str(&text.to_string());
        self.out.push('\n');
    }
}

impl Traverser for Dumper {
    fn visit_symbol(&mut self, depth: usize, _: NodeId, node: &Symbol) {
        self.line(depth, format_args!("'{}' (symbol {}) ({})", node.name, node.id, node.ty));
    }

    fn visit_constant(&mut self, depth: usize, _: NodeId, node: &Constant) {
        let values: Vec<_> = node.values.iter().map(|v| v.to_string()).collect();
        self.line(depth, format_args!("Constant [{}] ({})", values.join(", "), node.ty));
    }

    fn visit_unary(&mut self, visit: Visit, depth: usize, _: NodeId, node: &Unary) -> bool {
        if visit == Visit::Pre {
            self.line(depth, format_args!("{:?} ({})", node.op, node.ty));
        }
        true
    }

    fn visit_binary(&mut self, visit: Visit, depth: usize, _: NodeId, node: &Binary) -> bool {
        if visit == Visit::Pre {
            self.line(depth, format_args!("{:?} ({})", node.op, node.ty));
        }
        true
    }

    fn visit_aggregate(&mut self, visit: Visit, depth: usize, _: NodeId, node: &Aggregate) -> bool {
        if visit == Visit::Pre {
            let name = node.name.as_ref().map(|n| format!(" {n}")).unwrap_or_default();
            match &node.ty {
                Some(ty) => self.line(depth, format_args!("{:?}{name} ({ty})", node.op)),
                None => self.line(depth, format_args!("{:?}{name}", node.op)),
            }
        }
        true
    }

    fn visit_selection(&mut self, visit: Visit, depth: usize, _: NodeId, node: &Selection) -> bool {
        if visit == Visit::Pre {
            match &node.ty {
                Some(ty) => self.line(depth, format_args!("Ternary ({ty})")),
                None => self.line(depth, format_args!("If")),
            }
        }
        true
    }

    fn visit_loop(&mut self, visit: Visit, depth: usize, _: NodeId, node: &Loop) -> bool {
        if visit == Visit::Pre {
            self.line(depth, format_args!("Loop {}", node.kind));
        }
        true
    }

    fn visit_branch(&mut self, visit: Visit, depth: usize, _: NodeId, node: &Branch) -> bool {
        if visit == Visit::Pre {
            self.line(depth, format_args!("Branch {}", node.op));
        }
        true
    }
}

/// Produces an indented, human-readable dump of the subtree at `root`.
pub fn dump_tree(tree: &Tree, root: NodeId) -> String {
    let mut dumper = Dumper { out: String::new() };
    tree.traverse(root, &mut dumper);
    dumper.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ConstantUnion;
    use crate::info_sink::SourceLoc;
    use crate::intern::Interner;
    use crate::node::NodeKind;

    #[test]
    fn type_spelling() {
        let v = Type::vector(BasicType::Int, 3).with_precision(Precision::High);
        assert_eq!(v.to_string(), "highp ivec3");

        let m = Type::matrix(BasicType::Float, 3, 2).with_qualifier(Qualifier::Const);
        assert_eq!(m.to_string(), "const mat3x2");

        let arr = Type::matrix(BasicType::Float, 4, 4).with_array_size(2);
        assert_eq!(arr.to_string(), "mat4[2]");
        assert_eq!(Type::scalar(BasicType::Bool).to_string(), "bool");
    }

    #[test]
    fn op_display_falls_back_to_name() {
        assert_eq!(Op::Add.to_string(), "+");
        assert_eq!(Op::Sequence.to_string(), "Sequence");
    }

    #[test]
    fn dump_indents_children() {
        let names = Interner::new();
        let mut tree = Tree::new();
        let x = tree.add(
            SourceLoc::default(),
            NodeKind::Symbol(Symbol {
                id: 7,
                name: names.intern("x"),
                ty: Type::scalar(BasicType::Float),
            }),
        );
        let one = tree.add(
            SourceLoc::default(),
            NodeKind::Constant(Constant {
                values: vec![ConstantUnion::Float(1.0)],
                ty: Type::scalar(BasicType::Float).with_qualifier(Qualifier::Const),
            }),
        );
        let sum = tree.add(
            SourceLoc::default(),
            NodeKind::Binary(Binary {
                op: Op::Add,
                left: x,
                right: one,
                ty: Type::scalar(BasicType::Float),
            }),
        );
        let mut seq = Aggregate::new(Op::Sequence);
        seq.sequence.push(sum);
        let root = tree.add(SourceLoc::default(), NodeKind::Aggregate(seq));

        assert_eq!(
            dump_tree(&tree, root),
            "Sequence\n  Add (float)\n    'x' (symbol 7) (float)\n    Constant [1.0] (const float)\n"
        );
    }
}
