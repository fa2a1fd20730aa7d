//! Command-line interface for assetfs bundles.
//!
//! # Architecture
//!
//! The CLI is organized around subcommands:
//! - `build` - Walk asset directories and write a bundle file
//! - `ls` - List a directory (or stat a file) inside a bundle
//! - `cat` - Copy a file out of a bundle to stdout
//! - `completions` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Embed two directories
//! assetfs build static templates --out assets.json
//!
//! # Inspect the result
//! assetfs ls assets.json static /css --format json
//! assetfs cat assets.json static /css/site.css
//! ```

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

/// Build and inspect embedded asset bundles.
#[derive(Parser, Debug)]
#[command(name = "assetfs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a bundle from one or more asset directories.
    ///
    /// Each directory is walked depth-first in name order and stored under
    /// its cleaned path. The output is replaced atomically.
    ///
    /// # Examples
    ///
    /// ```bash
    /// assetfs build static --out assets.json
    /// ASSETFS_MAX_FILE_SIZE=1048576 assetfs build static templates
    /// ```
    Build {
        /// Asset directories to embed
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Bundle file to write
        #[arg(short, long, env = "ASSETFS_OUT", default_value = "assets.json")]
        out: PathBuf,

        /// Largest accepted file in bytes
        #[arg(long, env = "ASSETFS_MAX_FILE_SIZE", default_value_t = assetfs::MAX_FILE_SIZE)]
        max_file_size: u64,

        /// Follow symbolic links instead of skipping them
        #[arg(long)]
        follow_links: bool,
    },

    /// List a directory inside a bundle.
    ///
    /// When PATH names a file, its metadata is printed instead.
    Ls {
        /// Bundle file to read
        bundle: PathBuf,

        /// Bundle name (the cleaned directory path it was built from)
        name: String,

        /// Path inside the bundle
        #[arg(default_value = "/")]
        path: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Copy a file from a bundle to stdout.
    Cat {
        /// Bundle file to read
        bundle: PathBuf,

        /// Bundle name (the cleaned directory path it was built from)
        name: String,

        /// Path inside the bundle
        path: String,
    },

    /// Generate shell completions.
    ///
    /// # Examples
    ///
    /// ```bash
    /// assetfs completions bash > /etc/bash_completion.d/assetfs
    /// ```
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One line per entry
    #[default]
    Text,
    /// Pretty-printed JSON array
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let mut out = stdout.lock();
    execute_command(cli.command, color, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Initializes logging infrastructure.
///
/// Sets up tracing with appropriate log levels based on verbosity flag.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    Ok(())
}

/// Routes a parsed command to its handler.
///
/// `color` enables highlighting in human-readable output.
fn execute_command(command: Commands, color: bool, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Build {
            dirs,
            out: output,
            max_file_size,
            follow_links,
        } => {
            let options = assetfs::BuildOptions::new()
                .with_max_file_size(max_file_size)
                .with_follow_links(follow_links);
            commands::build::run(&dirs, &output, &options)
        }
        Commands::Ls {
            bundle,
            name,
            path,
            format,
        } => commands::ls::run(&bundle, &name, &path, format, color, out),
        Commands::Cat { bundle, name, path } => commands::cat::run(&bundle, &name, &path, out),
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command(), out)
        }
    }
}
