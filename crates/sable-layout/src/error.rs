/// Errors raised while laying out uniforms and interface blocks.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A symbol handed to the uniform tables is not a uniform.
    #[error("'{0}' is not a uniform")]
    NotUniform(String),

    #[error("'{0}' is not an interface block")]
    NotInterfaceBlock(String),

    /// Interface blocks must declare at least one member.
    #[error("interface block '{0}' has no fields")]
    EmptyBlock(String),

    /// The type has no representation in a register file.
    #[error("'{name}' has type '{ty}', which cannot be placed in a register")]
    UnsupportedType { name: String, ty: String },

    #[error(transparent)]
    Format(#[from] std::fmt::Error),
}

#[cfg(test)]
mod tests {
    use std::fmt::{self, Write};

    use super::*;

    struct Rejecting;

    impl Write for Rejecting {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    fn declare(out: &mut impl Write, name: &str) -> Result<(), LayoutError> {
        writeln!(out, "uniform float {name} : register(c0);")?;
        Ok(())
    }

    #[test]
    fn formatter_failure_surfaces_as_layout_error() {
        assert!(matches!(
            declare(&mut Rejecting, "_scale"),
            Err(LayoutError::Format(_))
        ));
        let mut out = String::new();
        declare(&mut out, "_scale").unwrap();
        assert_eq!(out, "uniform float _scale : register(c0);\n");
    }
}
