//! Private property renaming pass.
//!
//! Scrambles every `private` property declaration - one declaration
//! statement may list several names, each renamed independently - and
//! rewrites statically-named fetches through `$this` and `self::`.
//!
//! Unlike the method pass there is no safety scan: a computed fetch
//! (`$this->$name`) simply fails to match and is left untouched, without
//! disabling renaming for any other property in the file. The rename
//! map is distinct from the method pass's, so a method and a property
//! may share a source name.

use shade_core::StringScrambler;
use shade_cst::{walk_program, ClassMember, Expr, MemberName, Program, Visibility};
use shade_cst::{MutVisitor, VisitResult};
use tracing::debug;

use super::scrambler::{RenameResult, RenameTracker, ScrambleOutcome, Scrambler};
use super::{is_self_reference, CURRENT_CLASS};

/// Renames private properties and their self-referential fetches.
pub struct ScramblePrivateProperty {
    scrambler: Scrambler,
    renamed: RenameTracker,
}

impl ScramblePrivateProperty {
    /// Create the pass.
    pub fn new(scrambler: StringScrambler) -> Self {
        Self {
            scrambler: Scrambler::new(scrambler),
            renamed: RenameTracker::new(),
        }
    }

    /// Apply the pass to one file's tree.
    pub fn apply(&mut self, program: &mut Program) -> RenameResult<()> {
        self.renamed.reset();
        let mut scan = DefinitionScan {
            scrambler: &self.scrambler,
            renamed: &mut self.renamed,
        };
        walk_program(&mut scan, program)?;
        let mut rewriter = FetchRewriter {
            renamed: &self.renamed,
        };
        walk_program(&mut rewriter, program)?;
        Ok(())
    }
}

/// Scrambles private property declarations and records the mapping.
struct DefinitionScan<'a> {
    scrambler: &'a Scrambler,
    renamed: &'a mut RenameTracker,
}

impl MutVisitor for DefinitionScan<'_> {
    type Error = super::RenameError;

    fn enter_member(&mut self, member: &mut ClassMember) -> RenameResult<VisitResult> {
        if let ClassMember::Property(prop) = member {
            if prop.flags.visibility == Visibility::Private {
                for item in &mut prop.items {
                    let original = item.name.clone();
                    if let ScrambleOutcome::Renamed { new_name, .. } =
                        self.scrambler.scramble_name(&mut item.name)?
                    {
                        debug!(%original, %new_name, "renamed private property");
                        self.renamed.record(original, new_name);
                    }
                }
            }
        }
        Ok(VisitResult::Continue)
    }
}

/// Rewrites statically-named fetches of renamed properties.
struct FetchRewriter<'a> {
    renamed: &'a RenameTracker,
}

impl MutVisitor for FetchRewriter<'_> {
    type Error = super::RenameError;

    fn enter_expr(&mut self, expr: &mut Expr) -> RenameResult<VisitResult> {
        match expr {
            Expr::PropertyFetch(fetch) if is_self_reference(&fetch.target) => {
                if let MemberName::Identifier(ident) = &mut fetch.name {
                    if self.renamed.is_renamed(ident) {
                        *ident = self.renamed.new_name(ident)?.to_string();
                    }
                }
            }
            Expr::StaticPropertyFetch(fetch) if fetch.class == CURRENT_CLASS => {
                if self.renamed.is_renamed(&fetch.name) {
                    fetch.name = self.renamed.new_name(&fetch.name)?.to_string();
                }
            }
            _ => {}
        }
        Ok(VisitResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_cst::{parse_program, print_program};

    fn apply(source: &str) -> String {
        let mut program = parse_program(source).expect("parse error");
        let mut pass = ScramblePrivateProperty::new(StringScrambler::new());
        pass.apply(&mut program).expect("apply error");
        print_program(&program)
    }

    fn scrambled(name: &str) -> String {
        Scrambler::new(StringScrambler::new()).scrambled(name)
    }

    #[test]
    fn renames_declaration_and_increment_consistently() {
        let out = apply(
            "<?php
class Counter {
    private $count;
    public function inc() { $this->count++; }
}
",
        );
        let new_name = scrambled("count");
        assert!(out.contains(&format!("private ${new_name};")));
        assert!(out.contains(&format!("$this->{new_name}++")));
        assert!(!out.contains("count"));
    }

    #[test]
    fn renames_each_name_of_a_multi_property_declaration() {
        let out = apply(
            "<?php
class Pair {
    private $first = 1, $second = 2;
    public function sum() { return $this->first + $this->second; }
}
",
        );
        let first = scrambled("first");
        let second = scrambled("second");
        assert!(out.contains(&format!("private ${first} = 1, ${second} = 2;")));
        assert!(out.contains(&format!("$this->{first} + $this->{second}")));
    }

    #[test]
    fn rewrites_static_fetches_through_self_only() {
        let out = apply(
            "<?php
class Registry {
    private static $entries;
    public function a() { return self::$entries; }
    public function b() { return Registry::$entries; }
}
",
        );
        let new_name = scrambled("entries");
        assert!(out.contains(&format!("self::${new_name}")));
        // Fetches through the literal class name are left alone.
        assert!(out.contains("Registry::$entries"));
    }

    #[test]
    fn computed_fetches_do_not_disable_other_renames() {
        let out = apply(
            "<?php
class Mixed {
    private $known;
    public function get($name) { return $this->$name; }
    public function direct() { return $this->known; }
}
",
        );
        let new_name = scrambled("known");
        // The computed fetch stays, the static one is renamed anyway.
        assert!(out.contains("$this->$name"));
        assert!(out.contains(&format!("$this->{new_name}")));
        assert!(out.contains(&format!("private ${new_name};")));
    }

    #[test]
    fn public_properties_are_untouched() {
        let out = apply(
            "<?php
class Config {
    public $visible = 1;
    protected $shared = 2;
    public function get() { return $this->visible + $this->shared; }
}
",
        );
        assert!(out.contains("public $visible = 1;"));
        assert!(out.contains("$this->visible"));
        assert!(out.contains("$this->shared"));
    }

    #[test]
    fn fetches_of_undeclared_properties_are_left_alone() {
        let out = apply(
            "<?php
class Late {
    public function get() { return $this->dynamic; }
}
",
        );
        assert!(out.contains("$this->dynamic"));
    }
}
