//! Deterministic identifier scrambling.
//!
//! [`StringScrambler`] maps an identifier to an opaque, stable token: a
//! truncated hex digest of the input. The mapping is a pure function of
//! the input string, so every occurrence of a name scrambles to the same
//! output within a run, and renaming passes can rely on it for
//! cross-occurrence consistency without tracking state.
//!
//! The output consists of hex characters only and may start with a
//! digit; callers that need a full identifier prepend their own prefix
//! (the renamer primitive uses `"s"`).

use sha2::{Digest, Sha256};
use tracing::trace;

/// Number of hex characters kept from the digest.
///
/// 40 bits of digest: a collision would need on the order of a million
/// distinct identifiers in a single run.
const SCRAMBLE_LEN: usize = 10;

/// Deterministic string scrambler.
///
/// # Example
///
/// ```
/// use shade_core::StringScrambler;
///
/// let scrambler = StringScrambler::new();
/// let a = scrambler.scramble("calc");
/// let b = scrambler.scramble("calc");
/// assert_eq!(a, b);
/// assert_ne!(a, scrambler.scramble("count"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StringScrambler;

impl StringScrambler {
    /// Create a new scrambler.
    pub fn new() -> Self {
        Self
    }

    /// Scramble an identifier into an opaque, deterministic token.
    pub fn scramble(&self, input: &str) -> String {
        let digest = Sha256::digest(input.as_bytes());
        let mut out = hex::encode(digest);
        out.truncate(SCRAMBLE_LEN);
        trace!(input, output = %out, "scrambled string");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scramble_is_deterministic() {
        let scrambler = StringScrambler::new();
        assert_eq!(scrambler.scramble("foo"), scrambler.scramble("foo"));
    }

    #[test]
    fn scramble_distinguishes_inputs() {
        let scrambler = StringScrambler::new();
        assert_ne!(scrambler.scramble("foo"), scrambler.scramble("bar"));
        // Case matters: PHP variables are case-sensitive.
        assert_ne!(scrambler.scramble("foo"), scrambler.scramble("Foo"));
    }

    #[test]
    fn scramble_output_is_fixed_length_hex() {
        let scrambler = StringScrambler::new();
        let out = scrambler.scramble("anything");
        assert_eq!(out.len(), 10);
        assert!(out.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn scramble_with_prefix_is_a_valid_identifier() {
        let scrambler = StringScrambler::new();
        let name = format!("s{}", scrambler.scramble("calc"));
        assert!(crate::ident::is_valid_identifier(&name));
    }
}
