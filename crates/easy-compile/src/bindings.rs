use crate::compiler::CompileKind;
use crate::config::{normalize_path, ConfigResolver};
use crate::dispatch::Dispatcher;
use crate::filter::is_ignored;
use crate::host::{Host, NOT_IMPLEMENTED_MESSAGE, NO_ACTIVE_FILE_MESSAGE, UNSUPPORTED_FILE_MESSAGE};
use crate::types::CompileOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The commands and document events, wired to one host.
///
/// Every entry point returns immediately; user mistakes become host
/// notifications and compiler results land in the dispatcher's sink.
pub struct EasyCompile<H> {
    host: H,
    resolver: Arc<ConfigResolver>,
    dispatcher: Dispatcher,
}

impl<H: Host> EasyCompile<H> {
    pub fn new(host: H, resolver: Arc<ConfigResolver>, dispatcher: Dispatcher) -> Self {
        Self { host, resolver, dispatcher }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn resolver(&self) -> &ConfigResolver {
        &self.resolver
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The explicit file if given, else the focused document
    fn target_path(&self, file: Option<&Path>) -> Option<PathBuf> {
        file.map(Path::to_path_buf).or_else(|| self.host.active_document()).map(|p| normalize_path(&p))
    }

    /// `easyCompile.compile`
    pub fn compile_command(&self, file: Option<&Path>) {
        match self.target_path(file) {
            Some(path) => {
                let options = self.resolver.resolve(&path);
                self.run_compile(&path, &options);
            }
            None => self.host.show_information(NO_ACTIVE_FILE_MESSAGE),
        }
    }

    /// `easyCompile.minify`; not gated by the minify-on-save flags
    pub fn minify_command(&self, file: Option<&Path>) {
        let Some(path) = self.target_path(file) else {
            self.host.show_information(NO_ACTIVE_FILE_MESSAGE);
            return;
        };

        match CompileKind::for_minify(&path) {
            Some(kind) => self.dispatcher.dispatch(kind, &path),
            None => self.host.show_warning(UNSUPPORTED_FILE_MESSAGE),
        }
    }

    /// `easyCompile.minifydir`
    pub fn minify_dir_command(&self) {
        self.host.show_information(NOT_IMPLEMENTED_MESSAGE);
    }

    /// A document was saved. Only saves of the focused document are processed.
    pub fn did_save(&self, saved: &Path) {
        let saved = normalize_path(saved);
        let active = self.host.active_document().map(|p| normalize_path(&p));
        if active.as_deref() != Some(saved.as_path()) {
            tracing::debug!(path = %saved.display(), "ignoring save of unfocused document");
            return;
        }

        let options = self.resolver.resolve(&saved);
        if is_ignored(&saved, options.ignore.as_deref(), options.root.as_deref()) {
            tracing::debug!(path = %saved.display(), "path is ignored");
            return;
        }

        if CompileKind::for_compile(&saved).is_some() {
            self.run_compile(&saved, &options);
        } else if let Some(kind) = CompileKind::for_minify(&saved) {
            if kind.is_enabled(&options) {
                self.dispatcher.dispatch(kind, &saved);
            }
        }
    }

    /// A document was closed; stylesheet diagnostics go with it
    pub fn did_close(&self, closed: &Path) {
        let closed = normalize_path(closed);
        let clears = CompileKind::for_compile(&closed).is_some_and(CompileKind::clears_on_close);
        if clears && self.dispatcher.sink().delete(&closed) {
            tracing::debug!(path = %closed.display(), "cleared diagnostics");
        }
    }

    /// Drop all diagnostics, as on shutdown
    pub fn deactivate(&self) {
        self.dispatcher.sink().clear();
    }

    fn run_compile(&self, path: &Path, options: &CompileOptions) {
        match CompileKind::for_compile(path) {
            Some(kind) if kind.is_enabled(options) => self.dispatcher.dispatch(kind, path),
            Some(kind) => tracing::debug!(kind = %kind, path = %path.display(), "compilation disabled"),
            None => self.host.show_warning(UNSUPPORTED_FILE_MESSAGE),
        }
    }
}
