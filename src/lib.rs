//! shade: a source-level PHP obfuscator.
//!
//! Rewrites a tree of PHP files so that privately-scoped identifiers
//! (private methods, private properties, local variables) are replaced
//! by opaque names, leaving program behavior unchanged. Names are
//! scrambled deterministically, so every reference to one declaration
//! ends up consistent.
//!
//! The pipeline parses each file with [`shade_cst`], runs the three
//! renaming passes in [`visitor`], prints the tree back, and overwrites
//! the file. See [`Obfuscator`] for the entry point and
//! [`shade_core::event`] for the progress events it emits.

/// Obfuscator configuration loaded from a JSON file.
pub mod config;

/// The obfuscation pipeline.
pub mod obfuscator;

/// Renaming passes over the syntax tree.
pub mod visitor;

// Shared infrastructure, re-exported from shade-core.
pub use shade_core::event;
pub use shade_core::scramble;

pub use config::{Config, ConfigError};
pub use obfuscator::{
    ObfuscateError, ObfuscateOptions, ObfuscateResult, ObfuscateSummary, Obfuscator,
};
