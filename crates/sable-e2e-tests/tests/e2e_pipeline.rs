mod common;

use sable_builder::Builder;
use sable_ir::{BasicType, ConstantUnion, LoopKind, Op, Type};
use sable_layout::ShaderOutput;

/// ```glsl
/// uniform vec4 tint;
/// uniform mat4 mvp;
/// uniform sampler2D tex;
/// void main() {
///     vec4 color = tint * (2.0 * 0.5);
///     if (true) color = color * mvp; else discard;
///     texture2D(tex);
/// }
/// ```
#[test]
fn fragment_shader_folds_prunes_and_declares() {
    let mut b = Builder::new();
    let vec4 = Type::vector(BasicType::Float, 4);
    let mat4 = Type::matrix(BasicType::Float, 4, 4);

    // vec4 color = tint * (2.0 * 0.5);
    let tint = common::uniform(&mut b, 1, "tint", vec4.clone());
    let two = common::float(&mut b, 2.0);
    let half = common::float(&mut b, 0.5);
    let k = b.add_binary_math(Op::Mul, two, half, common::line(5)).unwrap();
    assert_eq!(common::folded(b.tree(), k), vec![ConstantUnion::Float(1.0)]);
    let scaled = b.add_binary_math(Op::Mul, tint, k, common::line(5)).unwrap();
    assert_eq!(b.tree()[scaled].as_binary().map(|n| n.op), Some(Op::VectorTimesScalar));
    let color = common::symbol(&mut b, 4, "color", vec4.clone());
    let init = b.add_assign(Op::Initialize, color, scaled, common::line(5)).unwrap();

    // if (true) color = color * mvp; else discard;
    let color_rhs = common::symbol(&mut b, 4, "color", vec4.clone());
    let mvp = common::uniform(&mut b, 2, "mvp", mat4);
    let product = b.add_binary_math(Op::Mul, color_rhs, mvp, common::line(6)).unwrap();
    assert_eq!(b.tree()[product].as_binary().map(|n| n.op), Some(Op::VectorTimesMatrix));
    let color_lhs = common::symbol(&mut b, 4, "color", vec4.clone());
    let assign = b.add_assign(Op::Assign, color_lhs, product, common::line(6)).unwrap();
    let discard = b.add_branch(Op::Kill, None, common::line(6)).unwrap();
    let cond = common::boolean(&mut b, true);
    let live_branch = b
        .add_selection(cond, Some(assign), Some(discard), common::line(6))
        .unwrap();

    // texture2D(tex);
    let tex = common::uniform(&mut b, 3, "tex", Type::scalar(BasicType::Sampler2D));
    let args = b.grow_aggregate(Some(tex), None, common::line(7));
    let call = b.set_aggregate_operator(args, Op::FunctionCall, common::line(7));
    b.set_aggregate_type(call, vec4).unwrap();

    let body = b.grow_aggregate(Some(init), Some(live_branch), common::line(4));
    let body = b.grow_aggregate(body, Some(call), common::line(4));
    assert!(b.post_process(body));
    let body = body.unwrap();

    let tree = b.tree();
    assert_eq!(tree[body].as_aggregate().map(|a| a.op), Some(Op::Sequence));
    assert_eq!(tree[body].children(), vec![init, live_branch, call]);
    assert_eq!(tree[live_branch].children(), vec![assign]);
    assert_eq!(tree.find_parent(body, discard), None);
    assert!(b.sink().is_empty());

    let (uniforms, blocks, layout) = common::headers(tree, body, ShaderOutput::Hlsl11);
    let expected = "\
// Uniforms

uniform float4 _tint : register(c0);
uniform float4x4 _mvp : register(c1);
uniform SamplerState sampler__tex : register(s0);
uniform Texture2D texture__tex : register(t0);
";
    assert_eq!(uniforms, expected);
    assert_eq!(blocks, "");
    let registers: Vec<_> = layout
        .uniforms()
        .iter()
        .map(|u| (u.name.as_str(), u.register_index))
        .collect();
    assert_eq!(
        registers,
        vec![("tint", Some(0)), ("mvp", Some(1)), ("tex", Some(0))]
    );

    // Folding and pruning left the operands and the dead branch detached.
    let freed = b.remove(Some(body));
    assert_eq!(freed, 14);
    assert_eq!(b.tree().live_count(), 4);
    for detached in [two, half, cond, discard] {
        assert!(b.tree().contains(detached));
    }
}

#[test]
fn constant_ternary_and_comma_collapse() {
    let mut b = Builder::new();
    let cond = common::boolean(&mut b, false);
    let one = common::float(&mut b, 1.0);
    let two = common::float(&mut b, 2.0);
    assert_eq!(b.add_ternary(cond, one, two, common::line(1)).unwrap(), two);
    assert_eq!(b.add_comma(one, two, common::line(1)).unwrap(), two);

    let x = common::symbol(&mut b, 1, "x", Type::scalar(BasicType::Float));
    let sel = b.add_ternary(x, one, two, common::line(1));
    // A non-bool condition is the parser's to reject; the builder only
    // checks the branches.
    assert!(sel.is_ok());
}

/// ```glsl
/// for (int i = 0; i < 4; ++i) { if (i == 2) continue; }
/// ```
#[test]
fn loop_body_is_rewritten_in_place() {
    let mut b = Builder::new();
    let int = Type::scalar(BasicType::Int);
    let zero = b
        .add_constant(vec![ConstantUnion::Int(0)], int.clone(), common::line(1))
        .unwrap();
    let i = common::symbol(&mut b, 1, "i", int.clone());
    let init = b.add_assign(Op::Initialize, i, zero, common::line(1)).unwrap();

    let four = b
        .add_constant(vec![ConstantUnion::Int(4)], int.clone(), common::line(1))
        .unwrap();
    let i_cond = common::symbol(&mut b, 1, "i", int.clone());
    let cond = b.add_binary_math(Op::LessThan, i_cond, four, common::line(1)).unwrap();

    let i_inc = common::symbol(&mut b, 1, "i", int.clone());
    let step = b.add_unary_math(Op::PreIncrement, i_inc, common::line(1)).unwrap();

    let two = b
        .add_constant(vec![ConstantUnion::Int(2)], int.clone(), common::line(1))
        .unwrap();
    let i_eq = common::symbol(&mut b, 1, "i", int);
    let test = b.add_binary_math(Op::Equal, i_eq, two, common::line(1)).unwrap();
    let cont = b.add_branch(Op::Continue, None, common::line(1)).unwrap();
    let sel = b.add_selection(test, Some(cont), None, common::line(1)).unwrap();
    let body = b.make_aggregate(Some(sel), common::line(1));
    let lp = b.add_loop(LoopKind::For, Some(init), Some(cond), Some(step), body, common::line(1));

    let order: Vec<_> = b.tree().breadth_first(lp).take(5).collect();
    assert_eq!(order[0], lp);
    assert_eq!(&order[1..], &[init, cond, step, body.unwrap()]);

    // Swap `continue` for `break` through the selection that owns it.
    let brk = b.add_branch(Op::Break, None, common::line(1)).unwrap();
    assert_eq!(b.tree().find_parent(lp, cont), Some(sel));
    assert!(b.tree_mut().replace_in_subtree(lp, cont, brk));
    assert_eq!(
        b.tree()[sel].as_selection().and_then(|s| s.true_block),
        Some(brk)
    );
}
