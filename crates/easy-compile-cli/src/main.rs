use clap::Parser;
use notify::{Event, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use easy_compile::cli::{Cli, Command, OutputFormat};
use easy_compile::config::{load_user_options, normalize_path};
use easy_compile::reporter::{report_json, report_text};
use easy_compile::{activate, CompileOptions, EasyCompile, Host, Report};

/// Terminal host. The focused document is the file named on the command
/// line, or the last saved file in watch mode.
#[derive(Default)]
struct CliHost {
    active: RwLock<Option<PathBuf>>,
}

impl CliHost {
    fn focus(&self, path: PathBuf) {
        match self.active.write() {
            Ok(mut active) => *active = Some(path),
            Err(poisoned) => *poisoned.into_inner() = Some(path),
        }
    }
}

impl Host for CliHost {
    fn active_document(&self) -> Option<PathBuf> {
        match self.active.read() {
            Ok(active) => active.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn show_information(&self, message: &str) {
        eprintln!("{message}");
    }

    fn show_warning(&self, message: &str) {
        eprintln!("Warning: {message}");
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,easy_compile=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Minified outputs, skipped by name so minify-on-save does not retrigger itself
fn is_generated(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".min.css") || name.ends_with(".min.js"))
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|meta| meta.modified()).ok()
}

/// Files written by the compilers, keyed to their modification time right
/// after the write. Events for them are dropped until the file changes again.
#[derive(Default)]
struct OwnOutputs {
    written: HashMap<PathBuf, SystemTime>,
}

impl OwnOutputs {
    fn record(&mut self, paths: Vec<PathBuf>) {
        for path in paths {
            match modified(&path) {
                Some(time) => {
                    self.written.insert(path, time);
                }
                None => {
                    self.written.remove(&path);
                }
            }
        }
    }

    /// Whether `path` is unchanged since a compiler wrote it
    fn is_own(&self, path: &Path) -> bool {
        self.written.get(path).is_some_and(|time| modified(path).as_ref() == Some(time))
    }
}

async fn watch(easy: &EasyCompile<CliHost>, dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let dir = normalize_path(dir);
    tracing::info!(dir = %dir.display(), "watching for changes");

    let (tx, mut rx) = mpsc::channel(100);
    let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| match res {
        Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
            let _ = tx.blocking_send(event);
        }
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "watch error"),
    })?;
    watcher.watch(&dir, RecursiveMode::Recursive)?;

    let mut outputs = OwnOutputs::default();
    let mut reported = 0;
    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                // Editors emit several events per save
                tokio::time::sleep(Duration::from_millis(50)).await;
                let mut paths = event.paths;
                while let Ok(more) = rx.try_recv() {
                    paths.extend(more.paths);
                }
                paths.sort();
                paths.dedup();

                let saved = paths.into_iter().filter(|p| p.is_file() && !is_generated(p) && !outputs.is_own(p));
                for path in saved {
                    easy.host().focus(path.clone());
                    easy.did_save(&path);
                }
                outputs.record(easy.dispatcher().wait_idle().await?);

                let report = Report::new(easy.dispatcher().sink());
                let count = report.error_count + report.warning_count;
                if count > 0 || reported > 0 {
                    report_text(&report, &dir);
                }
                reported = count;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    easy.deactivate();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let user_options = match &cli.user_config {
        Some(path) => {
            if !path.exists() {
                eprintln!("Error: Config file not found: {}", path.display());
                std::process::exit(1);
            }
            load_user_options(path)?
        }
        None => CompileOptions::default(),
    };

    let easy = activate(CliHost::default(), user_options);
    let cwd = std::env::current_dir()?;

    match &cli.command {
        Command::Compile { file } => {
            easy.host().focus(normalize_path(file));
            easy.compile_command(None);
        }
        Command::Minify { file } => {
            easy.host().focus(normalize_path(file));
            easy.minify_command(None);
        }
        Command::Minifydir => easy.minify_dir_command(),
        Command::Watch { dir } => return watch(&easy, dir).await,
    }

    easy.dispatcher().wait_idle().await?;
    let report = Report::new(easy.dispatcher().sink());
    match cli.format {
        OutputFormat::Text => report_text(&report, &cwd),
        OutputFormat::Json => report_json(&report),
    }

    // Exit with error code if any tool reported errors
    if report.error_count > 0 {
        std::process::exit(1);
    }

    Ok(())
}
