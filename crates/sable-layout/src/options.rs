//! Compile-time knobs for the layout engine.

use std::fmt;

/// The HLSL dialect the backend emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShaderOutput {
    /// Shader model 3: every variable starts on a fresh register and
    /// samplers are declared as combined `sampler2D` objects.
    Hlsl9,
    /// Shader model 4+: variables are packed into registers and each
    /// sampler is split into a sampler state and a texture.
    #[default]
    Hlsl11,
}

impl fmt::Display for ShaderOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hlsl9 => "hlsl9",
            Self::Hlsl11 => "hlsl11",
        })
    }
}

/// Options for one [`UniformLayout`](crate::UniformLayout).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    pub output: ShaderOutput,
    /// Uniform registers already claimed by the backend; allocation starts here.
    pub reserved_uniform_registers: u32,
    /// Constant-buffer slots already claimed by the backend.
    pub reserved_interface_block_registers: u32,
}

impl LayoutOptions {
    pub fn new(output: ShaderOutput) -> Self {
        Self {
            output,
            ..Self::default()
        }
    }
}

impl fmt::Display for LayoutOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LayoutOptions {{ output: {}, reserved_uniform_registers: {}, reserved_interface_block_registers: {} }}",
            self.output, self.reserved_uniform_registers, self.reserved_interface_block_registers
        )
    }
}
