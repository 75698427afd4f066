use sable_builder::Builder;
#[allow(unused_imports)]
use sable_ir::{
    BasicType, ConstantUnion, Interner, NodeId, Qualifier, SourceLoc, Tree, Type,
};
use sable_layout::{LayoutOptions, ReferencedSymbols, ShaderOutput, UniformLayout};

/// Location of line `n` in the single source string of a test shader.
#[allow(dead_code)]
pub fn line(n: u32) -> SourceLoc {
    SourceLoc::new(0, n)
}

/// Declares a symbol the way the parser does after a symbol-table lookup.
#[allow(dead_code)]
pub fn symbol(builder: &mut Builder, id: i32, name: &str, ty: Type) -> NodeId {
    let name = Interner::global().intern(name);
    builder.add_symbol(id, name, ty, line(1))
}

#[allow(dead_code)]
pub fn uniform(builder: &mut Builder, id: i32, name: &str, ty: Type) -> NodeId {
    symbol(builder, id, name, ty.with_qualifier(Qualifier::Uniform))
}

#[allow(dead_code)]
pub fn float(builder: &mut Builder, value: f32) -> NodeId {
    builder
        .add_constant(
            vec![ConstantUnion::Float(value)],
            Type::scalar(BasicType::Float).with_qualifier(Qualifier::Const),
            line(1),
        )
        .expect("scalar constant")
}

#[allow(dead_code)]
pub fn boolean(builder: &mut Builder, value: bool) -> NodeId {
    builder
        .add_constant(
            vec![ConstantUnion::Bool(value)],
            Type::scalar(BasicType::Bool).with_qualifier(Qualifier::Const),
            line(1),
        )
        .expect("scalar constant")
}

/// The constant values of `id`, panicking if it was not folded.
#[allow(dead_code)]
pub fn folded(tree: &Tree, id: NodeId) -> Vec<ConstantUnion> {
    tree[id]
        .as_constant()
        .unwrap_or_else(|| panic!("node {id:?} was not folded"))
        .values
        .clone()
}

/// Collects uniforms from `root` and renders both HLSL headers.
#[allow(dead_code)]
pub fn headers(
    tree: &Tree,
    root: NodeId,
    output: ShaderOutput,
) -> (String, String, UniformLayout) {
    let ReferencedSymbols {
        uniforms,
        interface_blocks,
    } = sable_layout::collect_referenced(tree, root);
    let mut layout = UniformLayout::new(LayoutOptions::new(output));
    let uniforms = layout
        .uniforms_header(&uniforms)
        .expect("uniform header failed");
    let blocks = layout
        .interface_blocks_header(&interface_blocks)
        .expect("interface block header failed");
    (uniforms, blocks, layout)
}
