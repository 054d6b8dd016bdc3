use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

pub const LESS_EXT: &str = "less";
pub const SASS_EXT: &str = "sass";
pub const SCSS_EXT: &str = "scss";
pub const TS_EXT: &str = "ts";
pub const CSS_EXT: &str = "css";
pub const JS_EXT: &str = "js";

pub const COMPILE_COMMAND: &str = "easyCompile.compile";
pub const MINIFY_COMMAND: &str = "easyCompile.minify";
pub const MINIFYDIR_COMMAND: &str = "easyCompile.minifydir";

/// Per-path configuration snapshot.
///
/// Every field is tri-state: `None` means the key was not set anywhere. Compile
/// flags treat `None` as enabled, minify-on-save flags treat it as disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    #[serde(default)]
    pub less: Option<bool>,

    #[serde(default)]
    pub typescript: Option<bool>,

    #[serde(default)]
    pub sass: Option<bool>,

    /// Gitignore-style patterns excluding paths from on-save processing
    #[serde(default)]
    pub ignore: Option<Vec<String>>,

    #[serde(default)]
    pub minify_js_on_save: Option<bool>,

    #[serde(default)]
    pub minify_css_on_save: Option<bool>,

    /// Directory the workspace settings were loaded from
    #[serde(skip)]
    pub root: Option<PathBuf>,
}

impl CompileOptions {
    pub fn less_enabled(&self) -> bool {
        self.less.unwrap_or(true)
    }

    pub fn typescript_enabled(&self) -> bool {
        self.typescript.unwrap_or(true)
    }

    pub fn sass_enabled(&self) -> bool {
        self.sass.unwrap_or(true)
    }

    pub fn minify_js_on_save(&self) -> bool {
        self.minify_js_on_save.unwrap_or(false)
    }

    pub fn minify_css_on_save(&self) -> bool {
        self.minify_css_on_save.unwrap_or(false)
    }

    /// Fill every unset field of `self` from `fallback`
    pub fn or(self, fallback: CompileOptions) -> CompileOptions {
        CompileOptions {
            less: self.less.or(fallback.less),
            typescript: self.typescript.or(fallback.typescript),
            sass: self.sass.or(fallback.sass),
            ignore: self.ignore.or(fallback.ignore),
            minify_js_on_save: self.minify_js_on_save.or(fallback.minify_js_on_save),
            minify_css_on_save: self.minify_css_on_save.or(fallback.minify_css_on_save),
            root: self.root.or(fallback.root),
        }
    }
}

/// Error types for easy-compile operations
#[derive(Error, Debug)]
pub enum EasyCompileError {
    #[error("Compile task failed: {0}")]
    TaskFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_flag_direction() {
        let options = CompileOptions::default();
        assert!(options.less_enabled());
        assert!(options.typescript_enabled());
        assert!(options.sass_enabled());
        assert!(!options.minify_js_on_save());
        assert!(!options.minify_css_on_save());
    }

    #[test]
    fn test_deserialize_camel_case_keys() {
        let options: CompileOptions = serde_json::from_str(
            r#"{ "less": false, "minifyJsOnSave": true, "ignore": ["dist/**"] }"#,
        )
        .unwrap();

        assert_eq!(options.less, Some(false));
        assert_eq!(options.minify_js_on_save, Some(true));
        assert_eq!(options.ignore, Some(vec!["dist/**".to_string()]));
        assert_eq!(options.sass, None);
    }

    #[test]
    fn test_or_prefers_self() {
        let workspace = CompileOptions { sass: Some(false), ..Default::default() };
        let user = CompileOptions { sass: Some(true), less: Some(false), ..Default::default() };

        let merged = workspace.or(user);
        assert_eq!(merged.sass, Some(false));
        assert_eq!(merged.less, Some(false));
        assert_eq!(merged.typescript, None);
    }

    #[test]
    fn test_task_failed_message() {
        let error = EasyCompileError::TaskFailed("task 7 panicked".to_string());
        assert_eq!(error.to_string(), "Compile task failed: task 7 panicked");
    }
}
