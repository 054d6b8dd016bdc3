use crate::types::CompileOptions;
use path_clean::PathClean;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Dedicated settings files, checked in order within each directory
const SETTINGS_FILES: &[&str] = &["easycompile.json", "easycompile.jsonc"];

/// Editor settings file holding the options under [`SETTINGS_SECTION`]
const EDITOR_SETTINGS_FILE: &str = ".vscode/settings.json";

pub const SETTINGS_SECTION: &str = "easycompile.compile";

/// Keys of a bare options object
const OPTION_KEYS: &[&str] = &["less", "typescript", "sass", "ignore", "minifyJsOnSave", "minifyCssOnSave"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Normalize a path into the absolute, lexically clean form used as file identity
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    absolute.clean()
}

/// Read a JSON or JSONC file into a value
fn read_jsonc(path: &Path) -> Result<Value, ConfigError> {
    let mut content = fs::read_to_string(path)?;
    json_strip_comments::strip(&mut content)?;
    Ok(serde_json::from_str(&content)?)
}

/// Extract options from an editor settings object.
///
/// Accepts both the flat `"easycompile.compile": {..}` key and the nested
/// `"easycompile": { "compile": {..} }` form.
pub fn options_from_settings(settings: &Value) -> Option<CompileOptions> {
    let section = settings.get(SETTINGS_SECTION).or_else(|| {
        let (outer, inner) = SETTINGS_SECTION.split_once('.')?;
        settings.get(outer)?.get(inner)
    })?;

    match serde_json::from_value(section.clone()) {
        Ok(options) => Some(options),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed {SETTINGS_SECTION} settings");
            None
        }
    }
}

/// Extract options from an editor payload holding either the settings
/// section or a bare options object. Payloads with neither yield `None`.
pub fn options_from_payload(payload: &Value) -> Option<CompileOptions> {
    if let Some(options) = options_from_settings(payload) {
        return Some(options);
    }

    let object = payload.as_object()?;
    if !OPTION_KEYS.iter().any(|key| object.contains_key(*key)) {
        return None;
    }
    match serde_json::from_value(payload.clone()) {
        Ok(options) => Some(options),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring malformed options payload");
            None
        }
    }
}

/// Load user-level options from a JSON/JSONC file holding the options object
pub fn load_user_options(path: &Path) -> Result<CompileOptions, ConfigError> {
    let value = read_jsonc(path)?;
    match options_from_settings(&value) {
        Some(options) => Ok(options),
        None => Ok(serde_json::from_value(value)?),
    }
}

/// Resolves the effective [`CompileOptions`] for a file.
///
/// Workspace settings are found by walking up from the file's directory; the
/// nearest directory holding a settings file wins. Its values override the
/// user-level options field by field. Resolution never fails: unreadable or
/// malformed settings are logged and treated as unset.
#[derive(Debug, Default)]
pub struct ConfigResolver {
    user: RwLock<CompileOptions>,
}

impl ConfigResolver {
    pub fn new(user: CompileOptions) -> Self {
        Self { user: RwLock::new(user) }
    }

    /// Replace the user-level options, e.g. after the editor's settings changed
    pub fn set_user_options(&self, options: CompileOptions) {
        match self.user.write() {
            Ok(mut user) => *user = options,
            Err(poisoned) => *poisoned.into_inner() = options,
        }
    }

    pub fn user_options(&self) -> CompileOptions {
        match self.user.read() {
            Ok(user) => user.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn resolve(&self, path: &Path) -> CompileOptions {
        let path = normalize_path(path);
        let workspace = path.parent().and_then(find_workspace_options).unwrap_or_default();
        workspace.or(self.user_options())
    }
}

/// Find the nearest workspace settings at or above `dir`
fn find_workspace_options(dir: &Path) -> Option<CompileOptions> {
    for ancestor in dir.ancestors() {
        if let Some(mut options) = load_workspace_options(ancestor) {
            options.root = Some(ancestor.to_path_buf());
            return Some(options);
        }
    }
    None
}

fn load_workspace_options(dir: &Path) -> Option<CompileOptions> {
    for name in SETTINGS_FILES {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match read_jsonc(&path).and_then(|v| Ok(serde_json::from_value(v)?)) {
            Ok(options) => return Some(options),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to read settings"),
        }
    }

    let editor_settings = dir.join(EDITOR_SETTINGS_FILE);
    if editor_settings.is_file() {
        match read_jsonc(&editor_settings) {
            Ok(value) => return options_from_settings(&value),
            Err(e) => {
                tracing::warn!(path = %editor_settings.display(), error = %e, "failed to read settings")
            }
        }
    }

    None
}
