use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Component, Path, PathBuf};

/// Gitignore-style matcher over the `ignore` option.
///
/// Patterns are matched against the path relative to `root` (the workspace
/// settings directory) when the path lies under it, otherwise against the path
/// with its root component stripped. Later patterns override earlier ones, so
/// `!keep.less` after `*.less` re-includes that file.
pub struct IgnoreFilter {
    root: Option<PathBuf>,
    matcher: Gitignore,
}

impl IgnoreFilter {
    pub fn new(patterns: &[String], root: Option<&Path>) -> Self {
        let mut builder = GitignoreBuilder::new(root.unwrap_or(Path::new("")));
        for pattern in patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                tracing::warn!(pattern = %pattern, error = %e, "skipping invalid ignore pattern");
            }
        }

        let matcher = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build ignore matcher");
            Gitignore::empty()
        });

        Self { root: root.map(Path::to_path_buf), matcher }
    }

    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.matcher.is_empty() {
            return false;
        }
        let relative = relative_path(path, self.root.as_deref());
        if relative.as_os_str().is_empty() {
            return false;
        }
        self.matcher.matched_path_or_any_parents(&relative, false).is_ignore()
    }
}

/// Whether `path` matches any of `patterns`; unset or empty patterns never match
pub fn is_ignored(path: &Path, patterns: Option<&[String]>, root: Option<&Path>) -> bool {
    match patterns {
        Some(patterns) if !patterns.is_empty() => IgnoreFilter::new(patterns, root).is_ignored(path),
        _ => false,
    }
}

fn relative_path(path: &Path, root: Option<&Path>) -> PathBuf {
    if let Some(relative) = root.and_then(|root| path.strip_prefix(root).ok()) {
        return relative.to_path_buf();
    }
    path.components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect()
}
