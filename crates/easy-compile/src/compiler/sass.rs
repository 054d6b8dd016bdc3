use super::{group_media_queries, Compiler, CompilerError, CompilerOutput, Directives};
use crate::diagnostics::{Diagnostic, Position, Range};
use crate::types::SASS_EXT;
use grass::{InputSyntax, Options, OutputStyle};
use std::path::Path;

/// SASS/SCSS compiler backed by `grass`.
///
/// Partials (file names starting with `_`) are compiled for diagnostics only.
pub struct SassCompiler;

impl SassCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SassCompiler {
    fn default() -> Self {
        Self::new()
    }
}

fn is_partial(file_path: &Path) -> bool {
    file_path.file_name().and_then(|name| name.to_str()).is_some_and(|name| name.starts_with('_'))
}

fn sass_diagnostic(error: Box<grass::Error>) -> Diagnostic {
    let display = error.to_string();
    match (*error).kind() {
        grass::ErrorKind::ParseError { message, loc, .. } => {
            let start = Position::new(loc.begin.line as u32, loc.begin.column as u32);
            let end = Position::new(loc.end.line as u32, loc.end.column as u32);
            Diagnostic::error("sass", message, Range::new(start, end))
        }
        _ => Diagnostic::error("sass", display, Range::default()),
    }
}

impl Compiler for SassCompiler {
    fn name(&self) -> &str {
        "sass"
    }

    fn compile(&self, content: &str, file_path: &Path) -> Result<CompilerOutput, CompilerError> {
        let directives = Directives::parse(content);

        let syntax = match file_path.extension().and_then(|ext| ext.to_str()) {
            Some(SASS_EXT) => InputSyntax::Sass,
            _ => InputSyntax::Scss,
        };
        let style = if directives.compress { OutputStyle::Compressed } else { OutputStyle::Expanded };

        let mut options = Options::default().style(style).input_syntax(syntax);
        if let Some(dir) = file_path.parent() {
            options = options.load_path(dir);
        }

        let css = match grass::from_string(content.to_owned(), &options) {
            Ok(css) => css,
            Err(error) => return Ok(CompilerOutput::diagnostics(vec![sass_diagnostic(error)])),
        };

        if is_partial(file_path) {
            return Ok(CompilerOutput::default());
        }
        let Some(out_path) = directives.output_path(file_path, "css") else {
            return Ok(CompilerOutput::default());
        };

        let css = if directives.group_media { group_media_queries(&css, directives.compress)? } else { css };
        Ok(CompilerOutput::artifact(out_path, css))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_compile_scss_to_sibling_css() {
        let compiler = SassCompiler::new();
        let content = r#"
$brand: red;
.button {
    .icon { color: $brand; }
}
"#;

        let output = compiler.compile(content, Path::new("/project/styles/site.scss")).unwrap();

        assert!(output.diagnostics.is_empty());
        assert_eq!(output.artifacts.len(), 1);
        assert_eq!(output.artifacts[0].path, PathBuf::from("/project/styles/site.css"));
        assert!(output.artifacts[0].contents.contains(".button .icon"));
        assert!(output.artifacts[0].contents.contains("color: red"));
    }

    #[test]
    fn test_compile_indented_syntax() {
        let compiler = SassCompiler::new();
        let content = ".nav\n  margin: 0\n";

        let output = compiler.compile(content, Path::new("/project/nav.sass")).unwrap();

        assert!(output.diagnostics.is_empty());
        assert!(output.artifacts[0].contents.contains("margin: 0"));
    }

    #[test]
    fn test_compress_directive() {
        let compiler = SassCompiler::new();
        let content = "// compress: true\n.a { .b { color: red; } }\n";

        let output = compiler.compile(content, Path::new("/project/a.scss")).unwrap();

        assert_eq!(output.artifacts[0].contents.trim(), ".a .b{color:red}");
    }

    #[test]
    fn test_syntax_error_becomes_diagnostic() {
        let compiler = SassCompiler::new();
        let content = ".a {\n  color: $undefined;\n}\n";

        let output = compiler.compile(content, Path::new("/project/a.scss")).unwrap();

        assert!(output.artifacts.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].range.start.line, 1);
        assert!(output.diagnostics[0].message.contains("Undefined variable"));
    }

    #[test]
    fn test_partials_produce_no_output() {
        let compiler = SassCompiler::new();
        let output = compiler.compile("$x: 1px;", Path::new("/project/_vars.scss")).unwrap();

        assert!(output.artifacts.is_empty());
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_out_false_skips_output() {
        let compiler = SassCompiler::new();
        let output = compiler.compile("// out: false\n.a { b: c }", Path::new("/project/a.scss")).unwrap();
        assert!(output.artifacts.is_empty());
    }
}
