//! Local variable renaming pass.
//!
//! Renames every variable node - references, parameters, foreach
//! bindings, and variables in computed member-name position - except the
//! self reference and the superglobals. There is no discovery phase and
//! no rename map: consistency across occurrences of one name rests
//! entirely on the scramble function being pure, so `$m` and a computed
//! `$this->$m()` keep referring to the same runtime value.

use shade_core::StringScrambler;
use shade_cst::{walk_program, Program, Variable};
use shade_cst::{MutVisitor, VisitResult};

use super::scrambler::{RenameResult, Scrambler};
use super::SELF_REFERENCE;

/// Variable names with runtime-assigned meaning, never renamed.
const SUPERGLOBALS: &[&str] = &[
    "GLOBALS", "_SERVER", "_POST", "_GET", "_REQUEST", "_COOKIE", "_SESSION", "_ENV", "_FILES",
];

/// Renames local variables and parameters.
pub struct ScrambleVariable {
    scrambler: Scrambler,
}

impl ScrambleVariable {
    /// Create the pass with the fixed ignore set.
    pub fn new(scrambler: StringScrambler) -> Self {
        Self::with_extra_ignores(scrambler, &[])
    }

    /// Create the pass, exempting additional names from renaming.
    pub fn with_extra_ignores(scrambler: StringScrambler, extra: &[String]) -> Self {
        let mut scrambler = Scrambler::new(scrambler);
        scrambler.add_ignore(SELF_REFERENCE);
        for name in SUPERGLOBALS {
            scrambler.add_ignore(*name);
        }
        for name in extra {
            scrambler.add_ignore(name.clone());
        }
        Self { scrambler }
    }

    /// Apply the pass to one file's tree.
    pub fn apply(&mut self, program: &mut Program) -> RenameResult<()> {
        walk_program(self, program)?;
        Ok(())
    }
}

impl MutVisitor for ScrambleVariable {
    type Error = super::RenameError;

    fn visit_variable(&mut self, var: &mut Variable) -> RenameResult<()> {
        self.scrambler.scramble_name(&mut var.name)?;
        Ok(())
    }
}
