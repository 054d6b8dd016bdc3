use crate::diagnostics::{Diagnostic, DiagnosticCollection, Severity};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Serialize)]
pub struct Report {
    pub files: Vec<FileReport>,
    pub error_count: usize,
    pub warning_count: usize,
}

impl Report {
    /// Snapshot the current contents of `sink`
    pub fn new(sink: &DiagnosticCollection) -> Self {
        let files: Vec<FileReport> = sink
            .paths()
            .into_iter()
            .filter_map(|path| {
                let diagnostics = sink.get(&path)?;
                Some(FileReport { path, diagnostics })
            })
            .collect();

        let count = |severity: Severity| {
            files
                .iter()
                .flat_map(|file| &file.diagnostics)
                .filter(|d| d.severity == severity)
                .count()
        };
        let error_count = count(Severity::Error);
        let warning_count = count(Severity::Warning);

        Self { files, error_count, warning_count }
    }
}

pub fn report_text(report: &Report, cwd: &Path) {
    if report.error_count == 0 && report.warning_count == 0 {
        println!("No problems found.");
        return;
    }

    for file in &report.files {
        let relative = file.path.strip_prefix(cwd).unwrap_or(&file.path);
        for diagnostic in &file.diagnostics {
            let label = match diagnostic.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Information => "info",
                Severity::Hint => "hint",
            };
            println!(
                "{}:{}:{}: {label}: {} [{}]",
                relative.display(),
                diagnostic.range.start.line + 1,
                diagnostic.range.start.character + 1,
                diagnostic.message,
                diagnostic.source,
            );
        }
    }
    println!("\n{} errors, {} warnings", report.error_count, report.warning_count);
}

pub fn report_json(report: &Report) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: failed to serialize report: {e}"),
    }
}
