//! Binary entry point for the shade CLI.
//!
//! ```bash
//! # Obfuscate a directory in place, stripping whitespace
//! shade build/app
//!
//! # Copy to an output directory first, keep formatting, skip bad files
//! shade src/app build/app --leave-whitespace --ignore-errors
//!
//! # Use a config file and verbose logging
//! shade build/app --config shade.json --log-level debug
//! ```

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use walkdir::WalkDir;

use shade::{Config, ObfuscateOptions, Obfuscator};
use shade_core::ObfuscateEvent;

// ============================================================================
// CLI Structure
// ============================================================================

/// Obfuscate a directory of PHP files.
///
/// Scrambles private methods, private properties, and local variables
/// into opaque names without changing program behavior.
#[derive(Parser, Debug)]
#[command(name = "shade", version, about = "Obfuscate a directory of PHP files")]
struct Cli {
    /// Directory of source files; overwritten in place unless an output
    /// directory is given.
    input_directory: PathBuf,

    /// Output directory; the input tree is copied here first.
    output_directory: Option<PathBuf>,

    /// Leave whitespace and comments in the output.
    #[arg(long)]
    leave_whitespace: bool,

    /// Continue with the next file when a file fails to parse.
    #[arg(long)]
    ignore_errors: bool,

    /// Configuration file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level for tracing output.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Initialize tracing to stderr, honoring `RUST_LOG` when set.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

// ============================================================================
// Errors
// ============================================================================

/// Top-level CLI error: everything the run can fail with.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] shade::ConfigError),

    #[error(transparent)]
    Obfuscate(#[from] shade::ObfuscateError),

    #[error("could not copy directory: {0}")]
    Copy(#[from] io::Error),
}

// ============================================================================
// Entry point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    // With an output directory, obfuscate a copy and leave the input
    // tree untouched.
    let directory = match &cli.output_directory {
        Some(output) => {
            println!(
                "Copying {} to {}",
                cli.input_directory.display(),
                output.display()
            );
            copy_dir(&cli.input_directory, output)?;
            output.clone()
        }
        None => cli.input_directory.clone(),
    };

    let mut obfuscator = Obfuscator::new().with_ignored_variables(config.ignore_variables);
    if let Some(pattern) = &config.file_regex {
        obfuscator = obfuscator.with_file_regex(pattern)?;
    }

    let options = ObfuscateOptions {
        strip_whitespace: !cli.leave_whitespace,
        ignore_errors: cli.ignore_errors,
    };

    let root = directory.clone();
    let mut sink = |event: ObfuscateEvent<'_>| match event {
        ObfuscateEvent::FileStarted { path } => {
            println!("Obfuscating {}", relative(path, &root).display());
        }
        ObfuscateEvent::FileError { path, message } => {
            eprintln!("Error obfuscating {}", relative(path, &root).display());
            eprintln!("Parsing error: {message}");
        }
    };
    let summary = obfuscator.obfuscate(&directory, options, &mut sink)?;

    println!(
        "Obfuscated {} file(s), {} skipped",
        summary.processed, summary.skipped
    );
    Ok(())
}

fn relative<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Copy a directory tree, skipping `.git`.
fn copy_dir(from: &Path, to: &Path) -> io::Result<()> {
    for entry in WalkDir::new(from)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != OsStr::new(".git"))
    {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
