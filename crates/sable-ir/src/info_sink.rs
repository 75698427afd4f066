//! Diagnostic sink shared by the builder and the layout engine.
//!
//! Nothing in the core raises: problems are appended here and the failing
//! operation returns an error value. Every entry is also forwarded to the
//! `log` facade.

use std::fmt;

/// An opaque source position supplied by the parser.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct SourceLoc {
    pub file: u32,
    pub line: u32,
}

impl SourceLoc {
    pub fn new(file: u32, line: u32) -> Self {
        Self { file, line }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Severity of a sink entry.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Severity {
    /// An invariant of the core was violated by its caller.
    InternalError,
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InternalError => "INTERNAL ERROR",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        })
    }
}

/// A single message written to the sink.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub loc: SourceLoc,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.severity, self.loc, self.message)
    }
}

/// Append-only diagnostic channel for one compile.
#[derive(Clone, Debug, Default)]
pub struct InfoSink {
    diagnostics: Vec<Diagnostic>,
}

impl InfoSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&mut self, severity: Severity, loc: SourceLoc, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            severity,
            loc,
            message: message.into(),
        };
        match severity {
            Severity::InternalError | Severity::Error => log::error!("{diagnostic}"),
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Info => log::debug!("{diagnostic}"),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn internal_error(&mut self, loc: SourceLoc, message: impl Into<String>) {
        self.message(Severity::InternalError, loc, message);
    }

    pub fn warning(&mut self, loc: SourceLoc, message: impl Into<String>) {
        self.message(Severity::Warning, loc, message);
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| matches!(d.severity, Severity::InternalError | Severity::Error))
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}
