use crate::compiler::{CompileKind, CompilerRegistry};
use crate::diagnostics::DiagnosticCollection;
use crate::task::CompileTask;
use crate::types::EasyCompileError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Selects the compiler for a [`CompileKind`] and starts it.
///
/// Dispatch is fire-and-forget: [`dispatch`](Dispatcher::dispatch) returns as
/// soon as the task is spawned and results arrive later through the shared
/// [`DiagnosticCollection`]. Spawned tasks are tracked only so that one-shot
/// callers can [`wait_idle`](Dispatcher::wait_idle) before exiting.
pub struct Dispatcher {
    registry: Arc<CompilerRegistry>,
    sink: DiagnosticCollection,
    pending: Mutex<Vec<JoinHandle<Vec<PathBuf>>>>,
}

impl Dispatcher {
    pub fn new(registry: Arc<CompilerRegistry>, sink: DiagnosticCollection) -> Self {
        Self { registry, sink, pending: Mutex::new(Vec::new()) }
    }

    pub fn sink(&self) -> &DiagnosticCollection {
        &self.sink
    }

    pub fn dispatch(&self, kind: CompileKind, path: &Path) {
        let Some(compiler) = self.registry.get(kind) else {
            tracing::warn!(kind = %kind, "no compiler registered");
            return;
        };
        if tokio::runtime::Handle::try_current().is_err() {
            tracing::error!(kind = %kind, path = %path.display(), "dispatch outside of a tokio runtime");
            return;
        }

        let compiler = Arc::clone(compiler);
        let sink = self.sink.clone();
        let path = path.to_path_buf();
        let task = match kind {
            CompileKind::Js => CompileTask::minify_js(path, sink, compiler, None, None),
            CompileKind::Less | CompileKind::Sass | CompileKind::TypeScript | CompileKind::Css => {
                CompileTask::new(kind, path, sink, compiler)
            }
        };

        tracing::debug!(kind = %kind, path = %task.path().display(), "dispatching");
        let handle = task.execute();
        let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    /// Wait for every task dispatched so far and return the output files
    /// they wrote
    pub async fn wait_idle(&self) -> Result<Vec<PathBuf>, EasyCompileError> {
        let handles = {
            let mut pending = self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *pending)
        };

        let mut written = Vec::new();
        let mut failure = None;
        for handle in handles {
            match handle.await {
                Ok(paths) => written.extend(paths),
                Err(e) => {
                    tracing::error!(error = %e, "compile task panicked");
                    failure = Some(EasyCompileError::TaskFailed(e.to_string()));
                }
            }
        }
        failure.map_or(Ok(written), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::{Compiler, CompilerError, CompilerOutput};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct Counting(AtomicUsize);

    impl Compiler for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn compile(&self, _content: &str, _file_path: &Path) -> Result<CompilerOutput, CompilerError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(CompilerOutput::default())
        }
    }

    #[tokio::test]
    async fn test_dispatch_runs_registered_compiler() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.scss");
        fs::write(&path, ".a {}").unwrap();

        let counting = Arc::new(Counting(AtomicUsize::new(0)));
        let mut registry = CompilerRegistry::new();
        registry.register(CompileKind::Sass, counting.clone());

        let dispatcher = Dispatcher::new(Arc::new(registry), DiagnosticCollection::new());
        dispatcher.dispatch(CompileKind::Sass, &path);
        dispatcher.wait_idle().await.unwrap();

        assert_eq!(counting.0.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.sink().get(&path), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_wait_idle_returns_written_outputs() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("site.css");
        fs::write(&path, ".a { color: red; }").unwrap();

        let dispatcher = Dispatcher::new(Arc::new(CompilerRegistry::with_builtins()), DiagnosticCollection::new());
        dispatcher.dispatch(CompileKind::Css, &path);

        let written = dispatcher.wait_idle().await.unwrap();
        assert_eq!(written, vec![temp.path().join("site.min.css")]);
        assert!(dispatcher.wait_idle().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unregistered_kind_is_a_no_op() {
        let dispatcher = Dispatcher::new(Arc::new(CompilerRegistry::new()), DiagnosticCollection::new());
        dispatcher.dispatch(CompileKind::Less, &PathBuf::from("/p/a.less"));
        dispatcher.wait_idle().await.unwrap();
        assert!(dispatcher.sink().is_empty());
    }

    #[test]
    fn test_dispatch_without_runtime_is_skipped() {
        let dispatcher = Dispatcher::new(Arc::new(CompilerRegistry::with_builtins()), DiagnosticCollection::new());
        dispatcher.dispatch(CompileKind::Css, Path::new("/p/a.css"));
        assert!(dispatcher.sink().is_empty());
    }
}
