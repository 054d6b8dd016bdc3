use crate::compiler::{Artifact, CompileKind, Compiler, CompilerError};
use crate::diagnostics::{Diagnostic, DiagnosticCollection, Range};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Extra inputs only the JS minifier takes
#[derive(Debug, Clone, Default)]
pub struct JsMinifyExtras {
    /// Further sources appended after the main file before minifying
    pub files: Option<Vec<PathBuf>>,
    /// Destination overriding `name.min.js`
    pub output: Option<PathBuf>,
}

/// One run of one compiler over one file.
///
/// The task owns a handle to the shared diagnostics sink and replaces the
/// file's entry once the compiler finishes. It is consumed by [`execute`].
///
/// [`execute`]: CompileTask::execute
pub struct CompileTask {
    kind: CompileKind,
    path: PathBuf,
    sink: DiagnosticCollection,
    compiler: Arc<dyn Compiler>,
    extras: JsMinifyExtras,
}

impl CompileTask {
    pub fn new(
        kind: CompileKind,
        path: PathBuf,
        sink: DiagnosticCollection,
        compiler: Arc<dyn Compiler>,
    ) -> Self {
        Self { kind, path, sink, compiler, extras: JsMinifyExtras::default() }
    }

    /// A JS minification task with the optional extras
    pub fn minify_js(
        path: PathBuf,
        sink: DiagnosticCollection,
        compiler: Arc<dyn Compiler>,
        files: Option<Vec<PathBuf>>,
        output: Option<PathBuf>,
    ) -> Self {
        Self { kind: CompileKind::Js, path, sink, compiler, extras: JsMinifyExtras { files, output } }
    }

    pub fn kind(&self) -> CompileKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start the task on the current tokio runtime without waiting for it.
    /// The handle resolves to the output files the task wrote.
    pub fn execute(self) -> JoinHandle<Vec<PathBuf>> {
        let span = tracing::info_span!("compile", kind = %self.kind, path = %self.path.display());
        tokio::spawn(self.run().instrument(span))
    }

    /// Run the compiler to completion, record its diagnostics and return
    /// the output files written
    pub async fn run(self) -> Vec<PathBuf> {
        let started = Instant::now();
        let mut written = Vec::new();
        let diagnostics = match self.compile(&mut written).await {
            Ok(diagnostics) => diagnostics,
            Err(e) => {
                tracing::warn!(error = %e, "compiler failed");
                vec![Diagnostic::error(self.compiler.name(), e.to_string(), Range::default())]
            }
        };

        tracing::info!(
            diagnostics = diagnostics.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "compiled"
        );
        self.sink.set(&self.path, diagnostics);
        written
    }

    async fn compile(&self, written: &mut Vec<PathBuf>) -> Result<Vec<Diagnostic>, CompilerError> {
        let mut content = tokio::fs::read_to_string(&self.path).await?;
        for file in self.extras.files.iter().flatten() {
            content.push('\n');
            content.push_str(&tokio::fs::read_to_string(file).await?);
        }

        let compiler = Arc::clone(&self.compiler);
        let path = self.path.clone();
        let mut output = tokio::task::spawn_blocking(move || compiler.compile(&content, &path))
            .await
            .map_err(|e| CompilerError::CompileFailed(format!("compiler task aborted: {e}")))??;

        if let (Some(output_path), Some(first)) = (&self.extras.output, output.artifacts.first_mut()) {
            first.path = output_path.clone();
        }
        for artifact in &output.artifacts {
            write_artifact(artifact).await?;
            written.push(artifact.path.clone());
        }

        Ok(output.diagnostics)
    }
}

async fn write_artifact(artifact: &Artifact) -> Result<(), CompilerError> {
    if let Some(dir) = artifact.path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| CompilerError::Output(format!("{}: {e}", dir.display())))?;
    }
    tokio::fs::write(&artifact.path, &artifact.contents)
        .await
        .map_err(|e| CompilerError::Output(format!("{}: {e}", artifact.path.display())))?;
    tracing::debug!(output = %artifact.path.display(), bytes = artifact.contents.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompilerOutput;
    use crate::diagnostics::Severity;
    use std::fs;
    use tempfile::tempdir;

    /// Upper-cases the source into `name.out`
    struct Shout;

    impl Compiler for Shout {
        fn name(&self) -> &str {
            "shout"
        }

        fn compile(&self, content: &str, file_path: &Path) -> Result<CompilerOutput, CompilerError> {
            Ok(CompilerOutput::artifact(file_path.with_extension("out"), content.to_uppercase()))
        }
    }

    #[tokio::test]
    async fn test_run_writes_output_and_clears_diagnostics() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("a.less");
        fs::write(&path, "abc").unwrap();

        let sink = DiagnosticCollection::new();
        sink.set(&path, vec![Diagnostic::error("old", "stale", Range::default())]);

        let written = CompileTask::new(CompileKind::Less, path.clone(), sink.clone(), Arc::new(Shout)).run().await;

        assert_eq!(written, vec![temp.path().join("a.out")]);
        assert_eq!(fs::read_to_string(temp.path().join("a.out")).unwrap(), "ABC");
        assert_eq!(sink.get(&path), Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_missing_source_is_recorded_as_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing.ts");
        let sink = DiagnosticCollection::new();

        let written =
            CompileTask::new(CompileKind::TypeScript, path.clone(), sink.clone(), Arc::new(Shout)).run().await;

        assert!(written.is_empty());
        let diagnostics = sink.get(&path).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].source, "shout");
    }

    #[tokio::test]
    async fn test_js_extras_concatenate_and_redirect() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("a.js");
        let extra = temp.path().join("b.js");
        let output = temp.path().join("dist/bundle.js");
        fs::write(&main, "a").unwrap();
        fs::write(&extra, "b").unwrap();

        let sink = DiagnosticCollection::new();
        CompileTask::minify_js(main, sink, Arc::new(Shout), Some(vec![extra]), Some(output.clone()))
            .run()
            .await;

        assert_eq!(fs::read_to_string(output).unwrap(), "A\nB");
        assert!(!temp.path().join("a.out").exists());
    }
}
