//! The obfuscation pipeline: walks a directory and rewrites each file.
//!
//! For every matching file: read, parse, apply the property, method, and
//! variable passes (they touch disjoint node kinds, so this order is
//! safe), print, overwrite, and optionally strip whitespace as a
//! separate post-step. All rename state is constructed fresh per file;
//! nothing leaks into the next file.
//!
//! Error policy: a parse failure is recoverable per file when
//! `ignore_errors` is set - the file is left untouched, a
//! [`ObfuscateEvent::FileError`] is emitted, and the run continues.
//! Every other failure aborts the run. A file is only ever written after
//! its transform fully succeeded.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use shade_core::{EventSink, ObfuscateEvent, StringScrambler};
use shade_cst::{parse_program, print_program, strip_whitespace, ParserError, TokenizerError};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::visitor::{
    RenameError, ScramblePrivateMethod, ScramblePrivateProperty, ScrambleVariable,
};

/// Default file filter: PHP sources.
const DEFAULT_FILE_REGEX: &str = r"\.php$";

/// Error type for obfuscation runs.
#[derive(Debug, Error)]
pub enum ObfuscateError {
    /// A file failed to parse. The only recoverable kind, governed by
    /// [`ObfuscateOptions::ignore_errors`].
    #[error("could not parse file \"{path}\": {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParserError,
    },

    /// A renaming pass hit a malformed tree or broke an internal
    /// contract. Always fatal.
    #[error("renaming failed in \"{path}\": {source}")]
    Rename {
        path: PathBuf,
        #[source]
        source: RenameError,
    },

    /// The whitespace-stripping post-step failed on our own output.
    /// Always fatal.
    #[error("whitespace stripping failed on \"{path}\": {source}")]
    Strip {
        path: PathBuf,
        #[source]
        source: TokenizerError,
    },

    /// Reading or writing a file failed. Always fatal.
    #[error("IO error on \"{path}\": {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The configured file regex does not compile.
    #[error("invalid file regex \"{pattern}\": {source}")]
    InvalidFileRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for obfuscation runs.
pub type ObfuscateResult<T> = Result<T, ObfuscateError>;

/// Per-run options for [`Obfuscator::obfuscate`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ObfuscateOptions {
    /// Strip comments and insignificant whitespace from written files.
    pub strip_whitespace: bool,
    /// Skip files that fail to parse instead of aborting the run.
    pub ignore_errors: bool,
}

/// Counts for one obfuscation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObfuscateSummary {
    /// Files transformed and written.
    pub processed: usize,
    /// Files skipped after a parse failure (ignore-errors mode).
    pub skipped: usize,
}

/// Obfuscates a directory of files.
///
/// # Example
///
/// ```ignore
/// use shade::{ObfuscateOptions, Obfuscator};
/// use shade_core::NullSink;
///
/// let obfuscator = Obfuscator::new();
/// let summary = obfuscator.obfuscate(
///     std::path::Path::new("build/app"),
///     ObfuscateOptions { strip_whitespace: true, ignore_errors: false },
///     &mut NullSink,
/// )?;
/// println!("{} files obfuscated", summary.processed);
/// ```
pub struct Obfuscator {
    scrambler: StringScrambler,
    file_regex: Regex,
    ignore_variables: Vec<String>,
}

impl Default for Obfuscator {
    fn default() -> Self {
        Self::new()
    }
}

impl Obfuscator {
    /// Create an obfuscator with the default `.php` file filter.
    pub fn new() -> Self {
        Self {
            scrambler: StringScrambler::new(),
            // The default pattern is a known-good literal.
            file_regex: Regex::new(DEFAULT_FILE_REGEX).expect("default file regex is valid"),
            ignore_variables: Vec::new(),
        }
    }

    /// Replace the regex deciding which files are obfuscated.
    pub fn with_file_regex(mut self, pattern: &str) -> ObfuscateResult<Self> {
        self.file_regex = Regex::new(pattern).map_err(|source| ObfuscateError::InvalidFileRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self)
    }

    /// Exempt additional variable names from renaming.
    pub fn with_ignored_variables(mut self, names: Vec<String>) -> Self {
        self.ignore_variables = names;
        self
    }

    /// The current file filter pattern.
    pub fn file_regex(&self) -> &str {
        self.file_regex.as_str()
    }

    /// Obfuscate every matching file under `directory`, in place.
    ///
    /// Emits [`ObfuscateEvent::FileStarted`] before each file and
    /// [`ObfuscateEvent::FileError`] for files skipped under
    /// `ignore_errors`.
    ///
    /// # Errors
    ///
    /// Propagates the first fatal error; with `ignore_errors` set, parse
    /// failures are reported through the sink instead and the run
    /// continues.
    pub fn obfuscate(
        &self,
        directory: &Path,
        options: ObfuscateOptions,
        sink: &mut dyn EventSink,
    ) -> ObfuscateResult<ObfuscateSummary> {
        let mut summary = ObfuscateSummary::default();
        for file in self.collect_files(directory) {
            sink.emit(ObfuscateEvent::FileStarted { path: &file });
            match self.obfuscate_file(&file, options) {
                Ok(()) => summary.processed += 1,
                Err(ObfuscateError::Parse { path, source }) if options.ignore_errors => {
                    sink.emit(ObfuscateEvent::FileError {
                        path: &path,
                        message: source.to_string(),
                    });
                    summary.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(summary)
    }

    /// Matching files under `directory`, in deterministic name order.
    fn collect_files(&self, directory: &Path) -> Vec<PathBuf> {
        WalkDir::new(directory)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.file_regex.is_match(&path.to_string_lossy()))
            .collect()
    }

    /// Transform one file, all or nothing.
    fn obfuscate_file(&self, path: &Path, options: ObfuscateOptions) -> ObfuscateResult<()> {
        debug!(path = %path.display(), "obfuscating file");
        let io_err = |source| ObfuscateError::Io {
            path: path.to_path_buf(),
            source,
        };

        let source = fs::read_to_string(path).map_err(io_err)?;
        let mut program = parse_program(&source).map_err(|source| ObfuscateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let rename_err = |source| ObfuscateError::Rename {
            path: path.to_path_buf(),
            source,
        };
        ScramblePrivateProperty::new(self.scrambler)
            .apply(&mut program)
            .map_err(rename_err)?;
        ScramblePrivateMethod::new(self.scrambler)
            .apply(&mut program)
            .map_err(rename_err)?;
        ScrambleVariable::with_extra_ignores(self.scrambler, &self.ignore_variables)
            .apply(&mut program)
            .map_err(rename_err)?;

        let printed = print_program(&program);
        fs::write(path, &printed).map_err(io_err)?;

        if options.strip_whitespace {
            // Separate post-step over the written output, mirroring a
            // strip pass on the file just written.
            let stripped =
                strip_whitespace(&printed).map_err(|source| ObfuscateError::Strip {
                    path: path.to_path_buf(),
                    source,
                })?;
            fs::write(path, stripped).map_err(io_err)?;
        }
        Ok(())
    }
}
