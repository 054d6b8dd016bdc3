use crate::types::{CompileOptions, CSS_EXT, JS_EXT, LESS_EXT, SASS_EXT, SCSS_EXT, TS_EXT};
use std::fmt;
use std::path::Path;

/// The closed set of tools this crate dispatches to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompileKind {
    Less,
    /// `.sass` and `.scss`
    Sass,
    TypeScript,
    /// CSS minification
    Css,
    /// JavaScript minification
    Js,
}

impl CompileKind {
    pub const ALL: [CompileKind; 5] =
        [CompileKind::Less, CompileKind::Sass, CompileKind::TypeScript, CompileKind::Css, CompileKind::Js];

    /// Kind used by the compile command and compile-on-save
    pub fn for_compile(path: &Path) -> Option<Self> {
        match extension(path)? {
            LESS_EXT => Some(CompileKind::Less),
            TS_EXT => Some(CompileKind::TypeScript),
            SASS_EXT | SCSS_EXT => Some(CompileKind::Sass),
            _ => None,
        }
    }

    /// Kind used by the minify command and minify-on-save
    pub fn for_minify(path: &Path) -> Option<Self> {
        match extension(path)? {
            JS_EXT => Some(CompileKind::Js),
            CSS_EXT => Some(CompileKind::Css),
            _ => None,
        }
    }

    /// Whether this kind is enabled under `options`.
    ///
    /// Compilers default to on, minifiers default to off.
    pub fn is_enabled(self, options: &CompileOptions) -> bool {
        match self {
            CompileKind::Less => options.less_enabled(),
            CompileKind::Sass => options.sass_enabled(),
            CompileKind::TypeScript => options.typescript_enabled(),
            CompileKind::Css => options.minify_css_on_save(),
            CompileKind::Js => options.minify_js_on_save(),
        }
    }

    /// Whether diagnostics for this kind are dropped when the source is closed
    pub fn clears_on_close(self) -> bool {
        matches!(self, CompileKind::Less | CompileKind::Sass)
    }

    pub fn name(self) -> &'static str {
        match self {
            CompileKind::Less => "less",
            CompileKind::Sass => "sass",
            CompileKind::TypeScript => "typescript",
            CompileKind::Css => "css",
            CompileKind::Js => "js",
        }
    }
}

impl fmt::Display for CompileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension()?.to_str()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_kinds() {
        assert_eq!(CompileKind::for_compile(Path::new("a.less")), Some(CompileKind::Less));
        assert_eq!(CompileKind::for_compile(Path::new("a.sass")), Some(CompileKind::Sass));
        assert_eq!(CompileKind::for_compile(Path::new("a.scss")), Some(CompileKind::Sass));
        assert_eq!(CompileKind::for_compile(Path::new("a.ts")), Some(CompileKind::TypeScript));
        assert_eq!(CompileKind::for_compile(Path::new("a.css")), None);
        assert_eq!(CompileKind::for_compile(Path::new("a.js")), None);
        assert_eq!(CompileKind::for_compile(Path::new("Makefile")), None);
    }

    #[test]
    fn test_minify_kinds() {
        assert_eq!(CompileKind::for_minify(Path::new("a.js")), Some(CompileKind::Js));
        assert_eq!(CompileKind::for_minify(Path::new("a.css")), Some(CompileKind::Css));
        assert_eq!(CompileKind::for_minify(Path::new("a.less")), None);
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        assert_eq!(CompileKind::for_compile(Path::new("A.LESS")), None);
    }

    #[test]
    fn test_is_enabled_defaults() {
        let options = CompileOptions::default();
        assert!(CompileKind::Less.is_enabled(&options));
        assert!(CompileKind::Sass.is_enabled(&options));
        assert!(CompileKind::TypeScript.is_enabled(&options));
        assert!(!CompileKind::Css.is_enabled(&options));
        assert!(!CompileKind::Js.is_enabled(&options));
    }

    #[test]
    fn test_is_enabled_explicit_flags() {
        let options = CompileOptions {
            sass: Some(false),
            minify_js_on_save: Some(true),
            ..Default::default()
        };
        assert!(!CompileKind::Sass.is_enabled(&options));
        assert!(CompileKind::Js.is_enabled(&options));
    }

    #[test]
    fn test_typescript_keeps_diagnostics_on_close() {
        assert!(CompileKind::Less.clears_on_close());
        assert!(CompileKind::Sass.clears_on_close());
        assert!(!CompileKind::TypeScript.clears_on_close());
    }
}
