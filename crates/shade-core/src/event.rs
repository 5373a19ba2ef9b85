//! Progress and error events emitted by the obfuscation pipeline.
//!
//! The pipeline never performs output itself: it emits events into an
//! [`EventSink`] supplied by the caller. This is write-only
//! observability, not control flow - sinks cannot influence processing.

use std::path::Path;

/// An event emitted while obfuscating a directory.
#[derive(Debug)]
pub enum ObfuscateEvent<'a> {
    /// Processing of a file is about to start.
    FileStarted {
        /// Path of the file being obfuscated.
        path: &'a Path,
    },
    /// A file failed to parse and was skipped (ignore-errors mode only).
    FileError {
        /// Path of the failing file.
        path: &'a Path,
        /// Underlying parse error message.
        message: String,
    },
}

/// Receiver for pipeline events.
pub trait EventSink {
    /// Handle one event.
    fn emit(&mut self, event: ObfuscateEvent<'_>);
}

/// Closures are sinks.
impl<F> EventSink for F
where
    F: FnMut(ObfuscateEvent<'_>),
{
    fn emit(&mut self, event: ObfuscateEvent<'_>) {
        self(event)
    }
}

/// Sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: ObfuscateEvent<'_>) {}
}
