use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "easy-compile")]
#[command(about = "Compile LESS/SASS/TypeScript and minify CSS/JS")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to user-level settings (JSON or JSONC)
    #[arg(long, global = true)]
    pub user_config: Option<PathBuf>,

    /// Output format for diagnostics
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Log debug output
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a .less, .sass, .scss or .ts file
    Compile { file: PathBuf },

    /// Minify a .css or .js file
    Minify { file: PathBuf },

    /// Minify every file in a directory
    Minifydir,

    /// Compile and minify files as they are saved
    Watch {
        /// Directory to watch
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
