//! Walk functions for tree traversal.
//!
//! Walk functions traverse nodes and call visitor hooks:
//!
//! - `enter_*` fires pre-order, before a node's children
//! - `leave_*` fires post-order, after all children
//! - children are walked in source order
//!
//! Control flow follows the [`VisitResult`] returned from `enter_*`:
//! `Continue` descends into children, `SkipChildren` skips them but
//! still calls `leave_*`, and `Stop` halts the walk immediately with no
//! further hooks.

use super::traits::{MutVisitor, VisitResult};
use crate::ast::{ClassMember, Expr, MemberName, Param, Program, Stmt};

/// Propagate `Stop` out of a child walk.
macro_rules! walk_child {
    ($e:expr) => {
        if $e? == VisitResult::Stop {
            return Ok(VisitResult::Stop);
        }
    };
}

/// Walk a [`Program`] and all of its statements.
pub fn walk_program<V: MutVisitor>(
    visitor: &mut V,
    program: &mut Program,
) -> Result<VisitResult, V::Error> {
    walk_stmts(visitor, &mut program.body)
}

fn walk_stmts<V: MutVisitor>(
    visitor: &mut V,
    stmts: &mut [Stmt],
) -> Result<VisitResult, V::Error> {
    for stmt in stmts {
        walk_child!(walk_stmt(visitor, stmt));
    }
    Ok(VisitResult::Continue)
}

/// Walk a [`Stmt`] node and its children.
pub fn walk_stmt<V: MutVisitor>(visitor: &mut V, stmt: &mut Stmt) -> Result<VisitResult, V::Error> {
    match visitor.enter_stmt(stmt)? {
        VisitResult::Stop => return Ok(VisitResult::Stop),
        VisitResult::SkipChildren => {}
        VisitResult::Continue => match stmt {
            Stmt::Class(class) => {
                for member in &mut class.members {
                    walk_child!(walk_member(visitor, member));
                }
            }
            Stmt::Function(func) => {
                walk_child!(walk_params(visitor, &mut func.params));
                walk_child!(walk_stmts(visitor, &mut func.body));
            }
            Stmt::If(stmt) => {
                walk_child!(walk_expr(visitor, &mut stmt.cond));
                walk_child!(walk_stmts(visitor, &mut stmt.then_branch));
                if let Some(else_branch) = &mut stmt.else_branch {
                    walk_child!(walk_stmts(visitor, else_branch));
                }
            }
            Stmt::While(stmt) => {
                walk_child!(walk_expr(visitor, &mut stmt.cond));
                walk_child!(walk_stmts(visitor, &mut stmt.body));
            }
            Stmt::Foreach(stmt) => {
                walk_child!(walk_expr(visitor, &mut stmt.subject));
                if let Some(key) = &mut stmt.key {
                    visitor.visit_variable(key)?;
                }
                visitor.visit_variable(&mut stmt.value)?;
                walk_child!(walk_stmts(visitor, &mut stmt.body));
            }
            Stmt::Echo(stmt) => {
                for value in &mut stmt.values {
                    walk_child!(walk_expr(visitor, value));
                }
            }
            Stmt::Return(stmt) => {
                if let Some(value) = &mut stmt.value {
                    walk_child!(walk_expr(visitor, value));
                }
            }
            Stmt::Block(stmts) => {
                walk_child!(walk_stmts(visitor, stmts));
            }
            Stmt::Expression(expr) => {
                walk_child!(walk_expr(visitor, expr));
            }
            Stmt::Break | Stmt::Continue => {}
        },
    }
    visitor.leave_stmt(stmt)?;
    Ok(VisitResult::Continue)
}

fn walk_member<V: MutVisitor>(
    visitor: &mut V,
    member: &mut ClassMember,
) -> Result<VisitResult, V::Error> {
    match visitor.enter_member(member)? {
        VisitResult::Stop => return Ok(VisitResult::Stop),
        VisitResult::SkipChildren => {}
        VisitResult::Continue => match member {
            ClassMember::Property(prop) => {
                for item in &mut prop.items {
                    if let Some(default) = &mut item.default {
                        walk_child!(walk_expr(visitor, default));
                    }
                }
            }
            ClassMember::Method(method) => {
                walk_child!(walk_params(visitor, &mut method.params));
                walk_child!(walk_stmts(visitor, &mut method.body));
            }
        },
    }
    visitor.leave_member(member)?;
    Ok(VisitResult::Continue)
}

fn walk_params<V: MutVisitor>(
    visitor: &mut V,
    params: &mut [Param],
) -> Result<VisitResult, V::Error> {
    for param in params {
        visitor.visit_variable(&mut param.var)?;
        if let Some(default) = &mut param.default {
            walk_child!(walk_expr(visitor, default));
        }
    }
    Ok(VisitResult::Continue)
}

/// Walk an [`Expr`] node and its children.
pub fn walk_expr<V: MutVisitor>(visitor: &mut V, expr: &mut Expr) -> Result<VisitResult, V::Error> {
    match visitor.enter_expr(expr)? {
        VisitResult::Stop => return Ok(VisitResult::Stop),
        VisitResult::SkipChildren => {}
        VisitResult::Continue => match expr {
            Expr::Variable(var) => visitor.visit_variable(var)?,
            Expr::Int(_) | Expr::Float(_) | Expr::String(_) | Expr::ConstFetch(_) => {}
            Expr::Array(items) => {
                for item in items {
                    if let Some(key) = &mut item.key {
                        walk_child!(walk_expr(visitor, key));
                    }
                    walk_child!(walk_expr(visitor, &mut item.value));
                }
            }
            Expr::Index(index) => {
                walk_child!(walk_expr(visitor, &mut index.target));
                if let Some(inner) = &mut index.index {
                    walk_child!(walk_expr(visitor, inner));
                }
            }
            Expr::Unary(unary) => {
                walk_child!(walk_expr(visitor, &mut unary.operand));
            }
            Expr::Binary(binary) => {
                walk_child!(walk_expr(visitor, &mut binary.left));
                walk_child!(walk_expr(visitor, &mut binary.right));
            }
            Expr::Assign(assign) => {
                walk_child!(walk_expr(visitor, &mut assign.target));
                walk_child!(walk_expr(visitor, &mut assign.value));
            }
            Expr::IncDec(incdec) => {
                walk_child!(walk_expr(visitor, &mut incdec.target));
            }
            Expr::FunctionCall(call) => {
                if let crate::ast::Callee::Variable(var) = &mut call.callee {
                    visitor.visit_variable(var)?;
                }
                for arg in &mut call.args {
                    walk_child!(walk_expr(visitor, arg));
                }
            }
            Expr::MethodCall(call) => {
                walk_child!(walk_expr(visitor, &mut call.target));
                walk_child!(walk_member_name(visitor, &mut call.name));
                for arg in &mut call.args {
                    walk_child!(walk_expr(visitor, arg));
                }
            }
            Expr::StaticCall(call) => {
                walk_child!(walk_member_name(visitor, &mut call.name));
                for arg in &mut call.args {
                    walk_child!(walk_expr(visitor, arg));
                }
            }
            Expr::PropertyFetch(fetch) => {
                walk_child!(walk_expr(visitor, &mut fetch.target));
                walk_child!(walk_member_name(visitor, &mut fetch.name));
            }
            // The name of a static property fetch is a property name,
            // not a variable node.
            Expr::StaticPropertyFetch(_) => {}
            Expr::New(new) => {
                for arg in &mut new.args {
                    walk_child!(walk_expr(visitor, arg));
                }
            }
        },
    }
    visitor.leave_expr(expr)?;
    Ok(VisitResult::Continue)
}

fn walk_member_name<V: MutVisitor>(
    visitor: &mut V,
    name: &mut MemberName,
) -> Result<VisitResult, V::Error> {
    match name {
        MemberName::Identifier(_) => {}
        MemberName::Variable(var) => visitor.visit_variable(var)?,
        MemberName::Expr(expr) => {
            walk_child!(walk_expr(visitor, expr));
        }
    }
    Ok(VisitResult::Continue)
}
