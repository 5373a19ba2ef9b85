//! Renaming passes over the syntax tree.
//!
//! Three passes rewrite identifiers in place, each with its own rename
//! state so a method and a property may share a source name:
//!
//! - [`ScramblePrivateMethod`] - private method declarations and their
//!   self-referential call sites, guarded by a file-wide safety scan for
//!   computed method calls.
//! - [`ScramblePrivateProperty`] - private property declarations and
//!   statically-named fetches through the self reference.
//! - [`ScrambleVariable`] - every variable node, minus the self
//!   reference and the superglobals.
//!
//! All pass state lives for one file: the pipeline constructs fresh
//! passes per file, and each pass resets its rename map on entry.

mod scramble_private_method;
mod scramble_private_property;
mod scramble_variable;
mod scrambler;

pub use scramble_private_method::ScramblePrivateMethod;
pub use scramble_private_property::ScramblePrivateProperty;
pub use scramble_variable::ScrambleVariable;
pub use scrambler::{RenameError, RenameResult, RenameTracker, ScrambleOutcome, Scrambler};

use shade_cst::Expr;

/// Name of the instance self-reference variable.
pub(crate) const SELF_REFERENCE: &str = "this";

/// Class token that resolves to the enclosing class in static position.
pub(crate) const CURRENT_CLASS: &str = "self";

/// Whether an expression is the instance self reference (`$this`).
pub(crate) fn is_self_reference(expr: &Expr) -> bool {
    matches!(expr, Expr::Variable(var) if var.name == SELF_REFERENCE)
}
