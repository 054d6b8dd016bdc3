pub mod bindings;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod diagnostics;
pub mod dispatch;
pub mod filter;
pub mod host;
pub mod minify;
pub mod reporter;
pub mod task;
pub mod types;

use std::sync::Arc;

pub use bindings::EasyCompile;
pub use compiler::{CompileKind, Compiler, CompilerRegistry};
pub use config::ConfigResolver;
pub use diagnostics::{Diagnostic, DiagnosticCollection, Severity};
pub use dispatch::Dispatcher;
pub use host::Host;
pub use reporter::Report;
pub use types::{CompileOptions, EasyCompileError};

/// Wire the commands to `host` with the built-in compilers
///
/// # Arguments
/// * `host` - The editor hosting the commands
/// * `user_options` - User-level settings; workspace settings override them per file
///
/// # Example
/// ```no_run
/// use easy_compile::{activate, CompileOptions, Host};
/// use std::path::{Path, PathBuf};
///
/// struct Terminal;
///
/// impl Host for Terminal {
///     fn active_document(&self) -> Option<PathBuf> {
///         None
///     }
///     fn show_information(&self, message: &str) {
///         println!("{message}");
///     }
///     fn show_warning(&self, message: &str) {
///         eprintln!("{message}");
///     }
/// }
///
/// # async fn run() {
/// let easy = activate(Terminal, CompileOptions::default());
/// easy.compile_command(Some(Path::new("styles/site.scss")));
/// easy.dispatcher().wait_idle().await.unwrap();
/// # }
/// ```
pub fn activate<H: Host>(host: H, user_options: CompileOptions) -> EasyCompile<H> {
    activate_with(host, user_options, CompilerRegistry::with_builtins())
}

/// Like [`activate`], with a caller-supplied compiler registry
pub fn activate_with<H: Host>(
    host: H,
    user_options: CompileOptions,
    registry: CompilerRegistry,
) -> EasyCompile<H> {
    let sink = DiagnosticCollection::new();
    let dispatcher = Dispatcher::new(Arc::new(registry), sink);
    EasyCompile::new(host, Arc::new(ConfigResolver::new(user_options)), dispatcher)
}
