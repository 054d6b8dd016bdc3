use dashmap::DashMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the change channel; slow subscribers skip ahead rather than block writers
const CHANGE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

/// Zero-based line and character offset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Convert a byte offset into `source` to a line/character position.
    /// Offsets past the end clamp to the last position.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &source[..offset];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let character = source[line_start..offset].chars().count();

        Self { line: line as u32, character: character as u32 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn at(position: Position) -> Self {
        Self { start: position, end: position }
    }

    pub fn from_span(source: &str, start: usize, end: usize) -> Self {
        Self { start: Position::from_offset(source, start), end: Position::from_offset(source, end) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub range: Range,
    /// Name of the tool that produced this diagnostic
    pub source: String,
}

impl Diagnostic {
    pub fn error(source: &str, message: impl Into<String>, range: Range) -> Self {
        Self { severity: Severity::Error, message: message.into(), range, source: source.to_string() }
    }

    pub fn warning(source: &str, message: impl Into<String>, range: Range) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            range,
            source: source.to_string(),
        }
    }
}

struct Inner {
    entries: DashMap<PathBuf, Vec<Diagnostic>>,
    changes: broadcast::Sender<PathBuf>,
}

/// Process-wide diagnostics keyed by file path.
///
/// Cloning is cheap and every clone shares the same entries. Each entry is
/// replaced wholesale by the compiler that produced it; there is no merging.
#[derive(Clone)]
pub struct DiagnosticCollection {
    inner: Arc<Inner>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { inner: Arc::new(Inner { entries: DashMap::new(), changes }) }
    }

    /// Replace the diagnostics for `path`
    pub fn set(&self, path: &Path, diagnostics: Vec<Diagnostic>) {
        self.inner.entries.insert(path.to_path_buf(), diagnostics);
        self.notify(path);
    }

    /// Remove the entry for `path`. Returns whether an entry existed.
    pub fn delete(&self, path: &Path) -> bool {
        let removed = self.inner.entries.remove(path).is_some();
        if removed {
            self.notify(path);
        }
        removed
    }

    pub fn get(&self, path: &Path) -> Option<Vec<Diagnostic>> {
        self.inner.entries.get(path).map(|entry| entry.clone())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.inner.entries.contains_key(path)
    }

    /// Paths that currently hold an entry, sorted
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self.inner.entries.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Drop every entry, notifying subscribers for each removed path
    pub fn clear(&self) {
        for path in self.paths() {
            self.delete(&path);
        }
    }

    /// Subscribe to the paths whose entry was replaced or deleted
    pub fn subscribe(&self) -> broadcast::Receiver<PathBuf> {
        self.inner.changes.subscribe()
    }

    fn notify(&self, path: &Path) {
        // No subscribers is the normal case outside the language server
        let _ = self.inner.changes.send(path.to_path_buf());
    }
}

impl Default for DiagnosticCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticCollection").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(message: &str) -> Diagnostic {
        Diagnostic::error("test", message, Range::default())
    }

    #[test]
    fn test_position_from_offset() {
        let source = "a {\n  color: red\n}\n";
        assert_eq!(Position::from_offset(source, 0), Position::new(0, 0));
        assert_eq!(Position::from_offset(source, 6), Position::new(1, 2));
        assert_eq!(Position::from_offset(source, 1000), Position::new(3, 0));
    }

    #[test]
    fn test_position_counts_characters_not_bytes() {
        let source = "é = 1;";
        assert_eq!(Position::from_offset(source, 2), Position::new(0, 1));
        // Offset inside a multi-byte char snaps back to its start
        assert_eq!(Position::from_offset(source, 1), Position::new(0, 0));
    }

    #[test]
    fn test_set_replaces_previous_entry() {
        let sink = DiagnosticCollection::new();
        let path = Path::new("/project/site.less");

        sink.set(path, vec![sample("first"), sample("second")]);
        sink.set(path, vec![sample("third")]);

        assert_eq!(sink.get(path), Some(vec![sample("third")]));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_delete_only_touches_one_path() {
        let sink = DiagnosticCollection::new();
        sink.set(Path::new("/a.less"), vec![sample("a")]);
        sink.set(Path::new("/b.less"), vec![sample("b")]);

        assert!(sink.delete(Path::new("/a.less")));
        assert!(!sink.delete(Path::new("/a.less")));
        assert!(!sink.contains(Path::new("/a.less")));
        assert!(sink.contains(Path::new("/b.less")));
    }

    #[test]
    fn test_clones_share_entries() {
        let sink = DiagnosticCollection::new();
        let handle = sink.clone();
        handle.set(Path::new("/a.ts"), Vec::new());
        assert!(sink.contains(Path::new("/a.ts")));
    }

    #[test]
    fn test_subscribers_see_changes() {
        let sink = DiagnosticCollection::new();
        let mut changes = sink.subscribe();

        sink.set(Path::new("/a.scss"), vec![sample("a")]);
        sink.clear();

        assert_eq!(changes.try_recv().unwrap(), PathBuf::from("/a.scss"));
        assert_eq!(changes.try_recv().unwrap(), PathBuf::from("/a.scss"));
        assert!(sink.is_empty());
    }
}
