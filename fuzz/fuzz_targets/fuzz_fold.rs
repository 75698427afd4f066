#![no_main]

use libfuzzer_sys::fuzz_target;
use sable_builder::Builder;
use sable_ir::{BasicType, ConstantUnion, NodeId, Op, Qualifier, SourceLoc, Type};

const BINARY: &[Op] = &[
    Op::Add,
    Op::Sub,
    Op::Mul,
    Op::Div,
    Op::Equal,
    Op::NotEqual,
    Op::LessThan,
    Op::GreaterThan,
    Op::LessThanEqual,
    Op::GreaterThanEqual,
    Op::LogicalAnd,
    Op::LogicalOr,
    Op::LogicalXor,
];

const UNARY: &[Op] = &[
    Op::Negative,
    Op::LogicalNot,
    Op::VectorLogicalNot,
    Op::Any,
    Op::All,
    Op::Sin,
    Op::Sqrt,
    Op::Abs,
    Op::Normalize,
];

struct Bytes<'a>(&'a [u8]);

impl Bytes<'_> {
    fn byte(&mut self) -> Option<u8> {
        let (&first, rest) = self.0.split_first()?;
        self.0 = rest;
        Some(first)
    }

    fn word(&mut self) -> Option<u32> {
        let mut buf = [0; 4];
        for b in &mut buf {
            *b = self.byte()?;
        }
        Some(u32::from_le_bytes(buf))
    }

    fn pick<'t, T>(&mut self, table: &'t [T]) -> Option<&'t T> {
        let i = usize::from(self.byte()?) % table.len();
        table.get(i)
    }
}

fn constant(bytes: &mut Bytes<'_>, builder: &mut Builder, loc: SourceLoc) -> Option<NodeId> {
    let basic = *bytes.pick(&[
        BasicType::Float,
        BasicType::Int,
        BasicType::UInt,
        BasicType::Bool,
    ])?;
    let shape = bytes.byte()?;
    let size = shape % 3 + 2;
    let ty = match shape % 4 {
        0 => Type::scalar(basic),
        1 | 2 => Type::vector(basic, size),
        _ => Type::matrix(basic, size, size),
    };
    let mut values = Vec::with_capacity(ty.object_size());
    for _ in 0..ty.object_size() {
        let w = bytes.word()?;
        values.push(match basic {
            BasicType::Float => ConstantUnion::Float(f32::from_bits(w)),
            BasicType::Int => ConstantUnion::Int(w as i32),
            BasicType::UInt => ConstantUnion::UInt(w),
            _ => ConstantUnion::Bool(w & 1 == 1),
        });
    }
    builder
        .add_constant(values, ty.with_qualifier(Qualifier::Const), loc)
        .ok()
}

fuzz_target!(|data: &[u8]| {
    // Building and folding arbitrary well-formed constant expressions must
    // never panic; rejections surface as errors or sink diagnostics.
    let mut bytes = Bytes(data);
    let mut builder = Builder::new();
    let mut pool: Vec<NodeId> = Vec::new();
    let mut line = 0;

    while let Some(step) = bytes.byte() {
        line += 1;
        let loc = SourceLoc::new(0, line);
        let made = match step % 5 {
            0 => constant(&mut bytes, &mut builder, loc),
            _ if pool.is_empty() => None,
            1 => {
                let (Some(&op), Some(&l), Some(&r)) =
                    (bytes.pick(BINARY), bytes.pick(&pool), bytes.pick(&pool))
                else {
                    break;
                };
                builder.add_binary_math(op, l, r, loc).ok()
            }
            2 => {
                let (Some(&op), Some(&x)) = (bytes.pick(UNARY), bytes.pick(&pool)) else {
                    break;
                };
                builder.add_unary_math(op, x, loc).ok()
            }
            3 => {
                let (Some(&c), Some(&t), Some(&f)) =
                    (bytes.pick(&pool), bytes.pick(&pool), bytes.pick(&pool))
                else {
                    break;
                };
                builder.add_ternary(c, t, f, loc).ok()
            }
            _ => {
                let (Some(&l), Some(&r)) = (bytes.pick(&pool), bytes.pick(&pool)) else {
                    break;
                };
                builder.add_comma(l, r, loc).ok()
            }
        };
        pool.extend(made);
    }

    let root = builder.make_aggregate(pool.last().copied(), SourceLoc::default());
    if builder.post_process(root)
        && let Some(root) = root
    {
        let _ = sable_ir::dump_tree(builder.tree(), root);
    }
});
