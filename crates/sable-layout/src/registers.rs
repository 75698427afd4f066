//! Register math for uniforms in the HLSL constant register file.

use crate::encoder::{BYTES_PER_COMPONENT, HlslBlockEncoder, HlslRule, REGISTER_BYTES};
use crate::options::ShaderOutput;
use crate::variable::Uniform;

fn encode_variable(variable: &Uniform, encoder: &mut HlslBlockEncoder) {
    if variable.is_struct() {
        for _ in 0..variable.element_count() {
            encoder.enter_aggregate_type();
            for field in &variable.fields {
                encode_variable(field, encoder);
            }
            encoder.exit_aggregate_type();
        }
    } else {
        // Plain uniforms carry no matrix layout qualifier.
        encoder.encode_type(variable.ty, variable.array_size, false);
    }
}

/// Number of whole registers `variable` occupies, array elements included.
pub fn variable_register_count(variable: &Uniform, output: ShaderOutput) -> u32 {
    let mut encoder = HlslBlockEncoder::new(HlslRule::for_output(output));
    encode_variable(variable, &mut encoder);
    encoder.block_size().div_ceil(REGISTER_BYTES)
}

fn register_info(
    base: u32,
    variable: &mut Uniform,
    encoder: &mut HlslBlockEncoder,
    output: ShaderOutput,
) {
    if variable.is_struct() {
        encoder.enter_aggregate_type();
        variable.register_index = Some(base);
        // Only the first element is walked; members of later elements are
        // addressed through the array stride.
        for field in &mut variable.fields {
            register_info(base, field, encoder, output);
        }
        if variable.is_array() {
            let per_element = variable_register_count(variable, output) / variable.array_size;
            encoder.skip_registers(per_element * (variable.array_size - 1));
        }
        encoder.exit_aggregate_type();
    } else {
        let info = encoder.encode_type(variable.ty, variable.array_size, false);
        variable.register_index = Some(base + info.offset / REGISTER_BYTES);
        variable.element_index = Some(info.offset % REGISTER_BYTES / BYTES_PER_COMPONENT);
    }
}

/// Assigns `register_index`/`element_index` to `variable` and every leaf
/// beneath it, starting at register `base`.
pub fn assign_register_info(base: u32, variable: &mut Uniform, output: ShaderOutput) {
    let mut encoder = HlslBlockEncoder::new(HlslRule::for_output(output));
    register_info(base, variable, &mut encoder, output);
}
