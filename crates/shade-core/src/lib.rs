//! Core infrastructure for shade.
//!
//! This crate holds the pieces of the obfuscator that are independent of
//! the syntax tree: the deterministic string scrambler that turns
//! human-meaningful identifiers into opaque ones, identifier validation
//! for generated names, and the event types the pipeline uses to report
//! progress without performing output itself.

/// Progress and error events emitted by the obfuscation pipeline.
pub mod event;

/// Identifier validation for generated names.
pub mod ident;

/// Deterministic identifier scrambling.
pub mod scramble;

pub use event::{EventSink, NullSink, ObfuscateEvent};
pub use ident::is_valid_identifier;
pub use scramble::StringScrambler;
