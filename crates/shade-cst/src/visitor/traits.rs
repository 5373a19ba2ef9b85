//! Visitor trait definitions for tree traversal.

use crate::ast::{ClassMember, Expr, Stmt, Variable};

/// Result of entering a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children; `leave_*` fires afterwards.
    #[default]
    Continue,
    /// Skip children but still call `leave_*` for this node.
    SkipChildren,
    /// Stop traversal entirely; no further hooks are called.
    Stop,
}

/// A visitor over a mutable syntax tree.
///
/// All hooks have default no-op implementations; a visitor overrides the
/// ones it cares about. Hooks return `Result` so a rename failure can
/// abort the walk.
pub trait MutVisitor {
    /// Error type produced by this visitor's hooks.
    type Error;

    /// Called before a statement's children are walked.
    fn enter_stmt(&mut self, _node: &mut Stmt) -> Result<VisitResult, Self::Error> {
        Ok(VisitResult::Continue)
    }

    /// Called after a statement's children have been walked.
    fn leave_stmt(&mut self, _node: &mut Stmt) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called before a class member's children are walked.
    fn enter_member(&mut self, _node: &mut ClassMember) -> Result<VisitResult, Self::Error> {
        Ok(VisitResult::Continue)
    }

    /// Called after a class member's children have been walked.
    fn leave_member(&mut self, _node: &mut ClassMember) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called before an expression's children are walked.
    fn enter_expr(&mut self, _node: &mut Expr) -> Result<VisitResult, Self::Error> {
        Ok(VisitResult::Continue)
    }

    /// Called after an expression's children have been walked.
    fn leave_expr(&mut self, _node: &mut Expr) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called for every variable node: references, parameters, foreach
    /// bindings, and variables in computed member-name position.
    fn visit_variable(&mut self, _node: &mut Variable) -> Result<(), Self::Error> {
        Ok(())
    }
}
