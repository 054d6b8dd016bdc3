use crate::compiler::{Compiler, CompilerError, CompilerOutput};
use crate::diagnostics::{Diagnostic, Position, Range};
use lightningcss::error::ErrorLocation;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use std::path::Path;
use thiserror::Error;

/// A stylesheet that failed to minify, with the location lightningcss reported
#[derive(Error, Debug)]
#[error("{message}{}", location_suffix(.location))]
pub struct CssError {
    pub message: String,
    pub location: Option<ErrorLocation>,
}

fn location_suffix(location: &Option<ErrorLocation>) -> String {
    match location {
        Some(loc) => format!(" at {}:{}:{}", loc.filename, loc.line + 1, loc.column),
        None => String::new(),
    }
}

/// Parse, minify and print `css`
pub fn minify_css(css: &str, filename: &str) -> Result<String, CssError> {
    let options = ParserOptions { filename: filename.to_string(), ..ParserOptions::default() };
    let mut sheet = StyleSheet::parse(css, options)
        .map_err(|e| CssError { message: e.kind.to_string(), location: e.loc })?;

    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| CssError { message: e.kind.to_string(), location: e.loc })?;

    let printed = sheet
        .to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
        .map_err(|e| CssError { message: e.kind.to_string(), location: e.loc })?;
    Ok(printed.code)
}

/// CSS minifier writing `name.min.css` next to `name.css`
pub struct CssMinifier;

impl CssMinifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CssMinifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler for CssMinifier {
    fn name(&self) -> &str {
        "css-minify"
    }

    fn compile(&self, content: &str, file_path: &Path) -> Result<CompilerOutput, CompilerError> {
        match minify_css(content, &file_path.to_string_lossy()) {
            Ok(css) => Ok(CompilerOutput::artifact(file_path.with_extension("min.css"), css)),
            Err(error) => {
                // lightningcss lines are zero-based, columns one-based
                let range = error
                    .location
                    .map(|loc| Range::at(Position::new(loc.line, loc.column.saturating_sub(1))))
                    .unwrap_or_default();
                Ok(CompilerOutput::diagnostics(vec![Diagnostic::error(self.name(), error.message, range)]))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_minify_css() {
        let css = ".a {\n  color: red;\n  margin: 0px 0px 0px 0px;\n}\n";
        assert_eq!(minify_css(css, "a.css").unwrap(), ".a{color:red;margin:0}");
    }

    #[test]
    fn test_minifier_writes_min_css() {
        let output = CssMinifier::new().compile(".a { color: red; }", Path::new("/p/site.css")).unwrap();

        assert!(output.diagnostics.is_empty());
        assert_eq!(output.artifacts[0].path, PathBuf::from("/p/site.min.css"));
        assert_eq!(output.artifacts[0].contents, ".a{color:red}");
    }

    #[test]
    fn test_parse_error_becomes_diagnostic() {
        let output = CssMinifier::new().compile(".a {}\n..b { color: red; }", Path::new("/p/site.css")).unwrap();

        assert!(output.artifacts.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].range.start.line, 1);
        assert_eq!(output.diagnostics[0].source, "css-minify");
    }

    #[test]
    fn test_error_display_includes_location() {
        let error = minify_css(".a {}\n..b { color: red; }", "site.css").unwrap_err();
        let location = error.location.as_ref().unwrap();
        assert_eq!(location.line, 1);

        let displayed = error.to_string();
        assert!(displayed.starts_with(&error.message));
        assert!(displayed.contains(" at site.css:2:"));

        let bare = CssError { message: "boom".to_string(), location: None };
        assert_eq!(bare.to_string(), "boom");
    }
}
