mod directives;
mod kind;
mod less;
mod media;
mod registry;
mod sass;
mod typescript;

pub use directives::{Directives, OutTarget};
pub use kind::CompileKind;
pub use less::LessCompiler;
pub use media::group_media_queries;
pub use registry::CompilerRegistry;
pub use sass::SassCompiler;
pub use typescript::TypescriptCompiler;

use crate::diagnostics::{Diagnostic, Range};
use oxc_diagnostics::OxcDiagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for compiler operations.
///
/// Syntax errors in the compiled source are not errors here; they are
/// reported as [`Diagnostic`]s in the [`CompilerOutput`].
#[derive(Error, Debug)]
pub enum CompilerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("`{0}` was not found; install it or add it to PATH")]
    ToolMissing(String),

    #[error("Compilation failed: {0}")]
    CompileFailed(String),

    #[error("Failed to write output: {0}")]
    Output(String),
}

/// A file produced by a compiler or minifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

/// Result of running one compiler over one file
#[derive(Debug, Default)]
pub struct CompilerOutput {
    /// Files to write; empty when compilation failed or output is disabled
    pub artifacts: Vec<Artifact>,

    /// Replaces the diagnostics of the compiled file
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilerOutput {
    pub fn artifact(path: PathBuf, contents: String) -> Self {
        Self { artifacts: vec![Artifact { path, contents }], diagnostics: Vec::new() }
    }

    pub fn diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        Self { artifacts: Vec::new(), diagnostics }
    }
}

/// A compiler or minifier turning one source file into output files
pub trait Compiler: Send + Sync {
    /// Tool name, used as the diagnostic source
    fn name(&self) -> &str;

    /// Compile `content`, read from `file_path`
    fn compile(&self, content: &str, file_path: &Path) -> Result<CompilerOutput, CompilerError>;
}

pub(crate) fn oxc_diagnostic(tool: &str, source: &str, error: &OxcDiagnostic) -> Diagnostic {
    let range = error
        .labels
        .as_ref()
        .and_then(|labels| labels.first())
        .map(|label| Range::from_span(source, label.offset(), label.offset() + label.len()))
        .unwrap_or_default();

    let message = match &error.help {
        Some(help) => format!("{}\n{help}", error.message),
        None => error.message.to_string(),
    };

    Diagnostic::error(tool, message, range)
}
