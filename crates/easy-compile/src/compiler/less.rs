use super::{group_media_queries, Compiler, CompilerError, CompilerOutput, Directives};
use crate::diagnostics::{Diagnostic, Position, Range};
use crate::minify::minify_css;
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

const DEFAULT_PROGRAM: &str = "lessc";

/// LESS compiler backed by the `lessc` executable
pub struct LessCompiler {
    program: PathBuf,
}

impl LessCompiler {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_PROGRAM)
    }

    /// Use a specific `lessc` executable
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    fn run(&self, file_path: &Path) -> Result<std::process::Output, CompilerError> {
        let mut command = Command::new(&self.program);
        command.arg("--no-color").arg(file_path);
        if let Some(dir) = file_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        tracing::debug!(program = %self.program.display(), path = %file_path.display(), "running lessc");
        command.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => CompilerError::ToolMissing(self.program.display().to_string()),
            _ => CompilerError::Io(e),
        })
    }
}

impl Default for LessCompiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches `lessc` errors such as
/// `ParseError: Unrecognised input in /p/site.less on line 3, column 5:`
fn less_error_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"(?m)^(?:\w*Error: )?(.+?) in (.+?) on line (\d+), column (\d+):").ok())
        .as_ref()
}

/// Turn `lessc` stderr into a diagnostic for `file_path`
pub(crate) fn parse_less_error(stderr: &str, file_path: &Path) -> Diagnostic {
    let Some(caps) = less_error_regex().and_then(|re| re.captures(stderr)) else {
        let message = stderr.trim();
        let message = if message.is_empty() { "lessc failed" } else { message };
        return Diagnostic::error("less", message, Range::default());
    };

    let message = caps[1].trim();
    let file = &caps[2];
    let line: u32 = caps[3].parse().unwrap_or(1);
    let column: u32 = caps[4].parse().unwrap_or(1);

    // Errors inside an imported file are pinned to the top of the compiled file
    if Path::new(file) != file_path {
        return Diagnostic::error("less", format!("{message} (in {file}:{line}:{column})"), Range::default());
    }

    let position = Position::new(line.saturating_sub(1), column.saturating_sub(1));
    Diagnostic::error("less", message, Range::at(position))
}

impl Compiler for LessCompiler {
    fn name(&self) -> &str {
        "less"
    }

    fn compile(&self, content: &str, file_path: &Path) -> Result<CompilerOutput, CompilerError> {
        let output = self.run(file_path)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Ok(CompilerOutput::diagnostics(vec![parse_less_error(&stderr, file_path)]));
        }

        let directives = Directives::parse(content);
        let Some(out_path) = directives.output_path(file_path, "css") else {
            return Ok(CompilerOutput::default());
        };

        let mut css = String::from_utf8(output.stdout)
            .map_err(|e| CompilerError::CompileFailed(format!("lessc produced invalid UTF-8: {e}")))?;
        if directives.group_media {
            css = group_media_queries(&css, directives.compress)?;
        } else if directives.compress {
            css = minify_css(&css, &file_path.to_string_lossy())
                .map_err(|e| CompilerError::CompileFailed(e.to_string()))?;
        }

        Ok(CompilerOutput::artifact(out_path, css))
    }
}
