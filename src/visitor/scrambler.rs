//! Shared renaming primitives for the scrambling passes.
//!
//! [`Scrambler`] rewrites a single identifier field in place, honoring a
//! per-component ignore set and refusing computed member names.
//! [`RenameTracker`] records original -> scrambled pairs so every
//! reference to one declaration stays consistent within a file.

use std::collections::HashMap;

use shade_core::StringScrambler;
use shade_cst::MemberName;
use thiserror::Error;
use tracing::trace;

/// Errors raised by the renaming passes.
///
/// Both variants indicate a malformed tree or a broken internal
/// contract; they are never caught, since continuing would risk emitting
/// an incorrect program.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenameError {
    /// An identifier field resolved to the empty string.
    #[error("cannot scramble an empty identifier")]
    InvalidName,

    /// A name was looked up that was never recorded as renamed.
    #[error("\"{name}\" was not renamed")]
    UnresolvedRename { name: String },
}

/// Result type for the renaming passes.
pub type RenameResult<T> = Result<T, RenameError>;

/// Outcome of a single scramble attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrambleOutcome {
    /// The identifier was rewritten in place.
    Renamed {
        original: String,
        new_name: String,
    },
    /// The name is in the ignore set and was left unchanged.
    Ignored,
    /// The name is computed at runtime and cannot be rewritten.
    NotStatic,
}

/// In-place identifier scrambler with a per-component ignore set.
#[derive(Debug, Clone)]
pub struct Scrambler {
    scrambler: StringScrambler,
    ignore: Vec<String>,
}

impl Scrambler {
    /// Create a scrambler with an empty ignore set.
    pub fn new(scrambler: StringScrambler) -> Self {
        Self {
            scrambler,
            ignore: Vec::new(),
        }
    }

    /// Add a name to the ignore set.
    pub fn add_ignore(&mut self, name: impl Into<String>) {
        self.ignore.push(name.into());
    }

    /// Whether a name is exempt from renaming.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|ignored| ignored == name)
    }

    /// Scramble a plain identifier field in place.
    ///
    /// # Errors
    ///
    /// Fails with [`RenameError::InvalidName`] if the field is empty,
    /// which indicates a malformed tree.
    pub fn scramble_name(&self, name: &mut String) -> RenameResult<ScrambleOutcome> {
        if name.is_empty() {
            return Err(RenameError::InvalidName);
        }
        if self.is_ignored(name) {
            return Ok(ScrambleOutcome::Ignored);
        }
        let original = std::mem::take(name);
        let new_name = self.scrambled(&original);
        trace!(%original, %new_name, "scrambled identifier");
        name.push_str(&new_name);
        Ok(ScrambleOutcome::Renamed { original, new_name })
    }

    /// Scramble a member name in place, if it is statically known.
    ///
    /// Computed names (`$obj->$name`, `$obj->{expr}`) are left untouched
    /// and reported as [`ScrambleOutcome::NotStatic`].
    pub fn scramble_member(&self, name: &mut MemberName) -> RenameResult<ScrambleOutcome> {
        match name {
            MemberName::Identifier(ident) => self.scramble_name(ident),
            MemberName::Variable(_) | MemberName::Expr(_) => Ok(ScrambleOutcome::NotStatic),
        }
    }

    /// The scrambled form of a name: `"s"` plus the deterministic digest.
    pub fn scrambled(&self, name: &str) -> String {
        format!("s{}", self.scrambler.scramble(name))
    }
}

/// Records names renamed within one file.
///
/// One tracker per pass per file; never shared across files.
#[derive(Debug, Clone, Default)]
pub struct RenameTracker {
    renamed: HashMap<String, String>,
}

impl RenameTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the renaming of `original` to `new_name`.
    pub fn record(&mut self, original: impl Into<String>, new_name: impl Into<String>) {
        self.renamed.insert(original.into(), new_name.into());
    }

    /// Whether `name` has been renamed.
    pub fn is_renamed(&self, name: &str) -> bool {
        self.renamed.contains_key(name)
    }

    /// New name for `name`.
    ///
    /// # Errors
    ///
    /// Looking up a name that was never recorded is a contract
    /// violation and fails with [`RenameError::UnresolvedRename`].
    pub fn new_name(&self, name: &str) -> RenameResult<&str> {
        self.renamed
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| RenameError::UnresolvedRename {
                name: name.to_string(),
            })
    }

    /// Forget all recorded renames.
    pub fn reset(&mut self) {
        self.renamed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_cst::Variable;

    fn scrambler() -> Scrambler {
        Scrambler::new(StringScrambler::new())
    }

    #[test]
    fn scrambles_names_in_place_with_prefix() {
        let scrambler = scrambler();
        let mut name = "calc".to_string();
        let outcome = scrambler.scramble_name(&mut name).expect("scramble");
        assert!(name.starts_with('s'));
        assert_eq!(name, scrambler.scrambled("calc"));
        assert!(matches!(outcome, ScrambleOutcome::Renamed { ref original, .. } if original == "calc"));
    }

    #[test]
    fn ignored_names_are_left_unchanged() {
        let mut scrambler = scrambler();
        scrambler.add_ignore("this");
        let mut name = "this".to_string();
        let outcome = scrambler.scramble_name(&mut name).expect("scramble");
        assert_eq!(name, "this");
        assert_eq!(outcome, ScrambleOutcome::Ignored);
    }

    #[test]
    fn empty_names_are_fatal() {
        let scrambler = scrambler();
        let mut name = String::new();
        assert_eq!(
            scrambler.scramble_name(&mut name),
            Err(RenameError::InvalidName)
        );
    }

    #[test]
    fn computed_member_names_are_not_renamed() {
        let scrambler = scrambler();
        let mut name = MemberName::Variable(Variable::new("m"));
        let outcome = scrambler.scramble_member(&mut name).expect("scramble");
        assert_eq!(outcome, ScrambleOutcome::NotStatic);
        assert!(matches!(name, MemberName::Variable(ref v) if v.name == "m"));
    }

    #[test]
    fn tracker_round_trips_recorded_names() {
        let mut tracker = RenameTracker::new();
        tracker.record("calc", "s1234");
        assert!(tracker.is_renamed("calc"));
        assert_eq!(tracker.new_name("calc").expect("recorded"), "s1234");
    }

    #[test]
    fn tracker_rejects_unrecorded_lookups() {
        let tracker = RenameTracker::new();
        assert_eq!(
            tracker.new_name("ghost"),
            Err(RenameError::UnresolvedRename {
                name: "ghost".to_string()
            })
        );
    }

    #[test]
    fn tracker_reset_forgets_everything() {
        let mut tracker = RenameTracker::new();
        tracker.record("calc", "s1234");
        tracker.reset();
        assert!(!tracker.is_renamed("calc"));
    }
}
