//! Private method renaming pass.
//!
//! Runs in phases over one file's tree:
//!
//! 1. **Safety scan** - look anywhere in the file, expression positions
//!    included, for an instance method call through `$this` whose method
//!    name is computed (`$this->$m()`, `$this->{expr}()`). Such a call
//!    could target any renamed method at runtime, so a single hit
//!    disables this pass for the whole file.
//! 2. **Definition discovery** - scramble every `private` method
//!    declaration (magic `__`-prefixed names excluded) and record the
//!    mapping.
//! 3. **Call-site rewrite** - rewrite instance calls through `$this` and
//!    static calls through `self` or the literal enclosing class name
//!    when the called name was recorded; anything else is left alone.
//!
//! Renaming is not foolproof across classes: a call on *another* object
//! whose method happens to share a renamed name is left alone here, but
//! `self`/`$this` calls are matched by name only, with no type analysis.
//! Private visibility keeps the file the unit of correctness.

use std::convert::Infallible;

use shade_core::StringScrambler;
use shade_cst::{walk_program, ClassMember, Expr, MemberName, Program, Stmt, Visibility};
use shade_cst::{MutVisitor, VisitResult};
use tracing::debug;

use super::scrambler::{RenameResult, RenameTracker, ScrambleOutcome, Scrambler};
use super::{is_self_reference, CURRENT_CLASS};

/// Prefix reserved for magic methods, which the runtime invokes by name.
const MAGIC_PREFIX: &str = "__";

/// Renames private methods and their self-referential call sites.
pub struct ScramblePrivateMethod {
    scrambler: Scrambler,
    renamed: RenameTracker,
    skip: bool,
}

impl ScramblePrivateMethod {
    /// Create the pass.
    pub fn new(scrambler: StringScrambler) -> Self {
        Self {
            scrambler: Scrambler::new(scrambler),
            renamed: RenameTracker::new(),
            skip: false,
        }
    }

    /// Apply the pass to one file's tree.
    pub fn apply(&mut self, program: &mut Program) -> RenameResult<()> {
        self.renamed.reset();
        self.skip = computed_method_calls_used(program);
        if self.skip {
            debug!("computed method call found; method renaming disabled for this file");
            return Ok(());
        }
        let mut scan = DefinitionScan {
            scrambler: &self.scrambler,
            renamed: &mut self.renamed,
        };
        walk_program(&mut scan, program)?;
        let mut rewriter = CallSiteRewriter {
            renamed: &self.renamed,
            class_stack: Vec::new(),
        };
        walk_program(&mut rewriter, program)?;
        Ok(())
    }

    /// Whether the last applied file was skipped entirely.
    pub fn skipped(&self) -> bool {
        self.skip
    }
}

/// Detects `$this->$name()` / `$this->{expr}()` anywhere in the file.
fn computed_method_calls_used(program: &mut Program) -> bool {
    struct ComputedCallScan {
        found: bool,
    }

    impl MutVisitor for ComputedCallScan {
        type Error = Infallible;

        fn enter_expr(&mut self, expr: &mut Expr) -> Result<VisitResult, Infallible> {
            if let Expr::MethodCall(call) = expr {
                if is_self_reference(&call.target) && call.name.is_computed() {
                    self.found = true;
                    return Ok(VisitResult::Stop);
                }
            }
            Ok(VisitResult::Continue)
        }
    }

    let mut scan = ComputedCallScan { found: false };
    let _ = walk_program(&mut scan, program);
    scan.found
}

/// Scrambles private method declarations and records the mapping.
struct DefinitionScan<'a> {
    scrambler: &'a Scrambler,
    renamed: &'a mut RenameTracker,
}

impl MutVisitor for DefinitionScan<'_> {
    type Error = super::RenameError;

    fn enter_member(&mut self, member: &mut ClassMember) -> RenameResult<VisitResult> {
        if let ClassMember::Method(method) = member {
            if method.flags.visibility == Visibility::Private
                && !method.name.starts_with(MAGIC_PREFIX)
            {
                let original = method.name.clone();
                if let ScrambleOutcome::Renamed { new_name, .. } =
                    self.scrambler.scramble_name(&mut method.name)?
                {
                    debug!(%original, %new_name, "renamed private method");
                    self.renamed.record(original, new_name);
                }
            }
        }
        Ok(VisitResult::Continue)
    }
}

/// Rewrites self-referential call sites of renamed methods.
struct CallSiteRewriter<'a> {
    renamed: &'a RenameTracker,
    /// Enclosing class names, innermost last. A lookup aid only: pushed
    /// on class entry, popped on exit, so nested classes cannot leak
    /// context.
    class_stack: Vec<String>,
}

impl CallSiteRewriter<'_> {
    fn is_current_class(&self, class: &str) -> bool {
        class == CURRENT_CLASS || self.class_stack.last().is_some_and(|current| current == class)
    }
}

impl MutVisitor for CallSiteRewriter<'_> {
    type Error = super::RenameError;

    fn enter_stmt(&mut self, stmt: &mut Stmt) -> RenameResult<VisitResult> {
        if let Stmt::Class(class) = stmt {
            self.class_stack.push(class.name.clone());
        }
        Ok(VisitResult::Continue)
    }

    fn leave_stmt(&mut self, stmt: &mut Stmt) -> RenameResult<()> {
        if matches!(stmt, Stmt::Class(_)) {
            self.class_stack.pop();
        }
        Ok(())
    }

    fn enter_expr(&mut self, expr: &mut Expr) -> RenameResult<VisitResult> {
        let name = match expr {
            Expr::MethodCall(call) if is_self_reference(&call.target) => &mut call.name,
            Expr::StaticCall(call) if self.is_current_class(&call.class) => &mut call.name,
            _ => return Ok(VisitResult::Continue),
        };
        if let MemberName::Identifier(ident) = name {
            if self.renamed.is_renamed(ident) {
                *ident = self.renamed.new_name(ident)?.to_string();
            }
        }
        Ok(VisitResult::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shade_cst::{parse_program, print_program};

    fn apply(source: &str) -> (String, bool) {
        let mut program = parse_program(source).expect("parse error");
        let mut pass = ScramblePrivateMethod::new(StringScrambler::new());
        pass.apply(&mut program).expect("apply error");
        (print_program(&program), pass.skipped())
    }

    fn scrambled(name: &str) -> String {
        Scrambler::new(StringScrambler::new()).scrambled(name)
    }

    #[test]
    fn renames_declaration_and_instance_call_consistently() {
        let (out, skipped) = apply(
            "<?php
class Calculator {
    private function calc() { return 1; }
    public function run() { return $this->calc(); }
}
",
        );
        assert!(!skipped);
        let new_name = scrambled("calc");
        assert!(!out.contains("calc("), "original name must be gone: {out}");
        assert!(out.contains(&format!("private function {new_name}()")));
        assert!(out.contains(&format!("$this->{new_name}()")));
    }

    #[test]
    fn renames_static_calls_through_self_and_class_name() {
        let (out, _) = apply(
            "<?php
class Helper {
    private static function calc() { return 1; }
    public function a() { return self::calc(); }
    public function b() { return Helper::calc(); }
    public function c() { return Other::calc(); }
    public function d() { return parent::calc(); }
}
",
        );
        let new_name = scrambled("calc");
        assert!(out.contains(&format!("self::{new_name}()")));
        assert!(out.contains(&format!("Helper::{new_name}()")));
        // Unrelated and parent static calls are left alone.
        assert!(out.contains("Other::calc()"));
        assert!(out.contains("parent::calc()"));
    }

    #[test]
    fn computed_call_skips_the_whole_file() {
        let (out, skipped) = apply(
            "<?php
class Calculator {
    private function calc() { return 1; }
    private function other() { return 2; }
    public function run($m) { return $this->$m(); }
    public function direct() { return $this->calc(); }
}
",
        );
        assert!(skipped);
        assert!(out.contains("private function calc()"));
        assert!(out.contains("private function other()"));
        assert!(out.contains("$this->calc()"));
    }

    #[test]
    fn computed_call_nested_in_an_expression_also_skips() {
        let (_, skipped) = apply(
            "<?php
class Calculator {
    private function calc() { return 1; }
    public function run($m) { return 1 + $this->{$m}(); }
}
",
        );
        assert!(skipped);
    }

    #[test]
    fn computed_call_on_another_object_does_not_skip() {
        let (out, skipped) = apply(
            "<?php
class Calculator {
    private function calc() { return 1; }
    public function run($obj, $m) { return $obj->$m(); }
}
",
        );
        assert!(!skipped);
        assert!(!out.contains("function calc()"));
    }

    #[test]
    fn magic_methods_are_never_renamed() {
        let (out, _) = apply(
            "<?php
class Widget {
    private function __construct() { }
    private function setup() { }
}
",
        );
        assert!(out.contains("private function __construct()"));
        assert!(!out.contains("private function setup()"));
    }

    #[test]
    fn public_and_protected_methods_are_untouched() {
        let (out, _) = apply(
            "<?php
class Widget {
    public function visible() { }
    protected function shared() { }
}
",
        );
        assert!(out.contains("function visible()"));
        assert!(out.contains("function shared()"));
    }

    #[test]
    fn calls_to_unrenamed_methods_are_left_alone() {
        let (out, _) = apply(
            "<?php
class Widget {
    public function run() { return $this->inherited(); }
}
",
        );
        assert!(out.contains("$this->inherited()"));
    }

    #[test]
    fn class_context_is_restored_after_nested_classes() {
        let (out, _) = apply(
            "<?php
class Outer {
    private function helper() { return 1; }
    public function make() {
        class Inner {
            public function noise() { return Inner::stay(); }
        }
        return Outer::helper();
    }
}
",
        );
        let new_name = scrambled("helper");
        // After leaving Inner, Outer is the current class again.
        assert!(out.contains(&format!("Outer::{new_name}()")));
        // Inner has no renamed methods; its self-call stays.
        assert!(out.contains("Inner::stay()"));
    }
}
