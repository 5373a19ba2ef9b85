//! Code generation: convert a syntax tree back to PHP source text.
//!
//! Output is normalized - four-space indent, braces on the opening line,
//! one statement per line. It preserves program semantics, not the
//! original formatting: grouping parentheses are re-derived from operator
//! precedence, `elseif` chains print as nested `else` blocks, and every
//! control-structure body is braced.

use crate::ast::{
    AssignOp, BinaryOp, Callee, ClassMember, Expr, IncDecOp, MemberName, Param, Program, Stmt,
    TypeHint, UnaryOp,
};

// Precedence levels, higher binds tighter. Matches the parser's grammar.
const PREC_NONE: u8 = 0;
const PREC_ASSIGN: u8 = 1;
const PREC_COALESCE: u8 = 2;
const PREC_OR: u8 = 3;
const PREC_AND: u8 = 4;
const PREC_EQUALITY: u8 = 5;
const PREC_COMPARISON: u8 = 6;
const PREC_ADDITIVE: u8 = 7;
const PREC_MULTIPLICATIVE: u8 = 8;
const PREC_UNARY: u8 = 9;
const PREC_POSTFIX: u8 = 10;
const PREC_ATOM: u8 = 11;

/// Mutable state threaded through code generation.
#[derive(Debug, Default)]
pub struct CodegenState {
    output: String,
    indent: usize,
}

impl CodegenState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The generated source text.
    pub fn into_string(self) -> String {
        self.output
    }

    fn push(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn begin_line(&mut self) {
        self.output.push('\n');
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
    }
}

/// Nodes that can print themselves into a [`CodegenState`].
pub trait Codegen {
    /// Append this node's source text to the state.
    fn codegen(&self, state: &mut CodegenState);
}

/// Print a whole program to PHP source text.
///
/// # Example
///
/// ```
/// use shade_cst::{parse_program, print_program};
///
/// let program = parse_program("<?php echo 1 + 2;").expect("parse error");
/// assert_eq!(print_program(&program), "<?php\necho 1 + 2;\n");
/// ```
pub fn print_program(program: &Program) -> String {
    let mut state = CodegenState::new();
    program.codegen(&mut state);
    state.into_string()
}

impl Codegen for Program {
    fn codegen(&self, state: &mut CodegenState) {
        state.push("<?php");
        for stmt in &self.body {
            state.begin_line();
            stmt.codegen(state);
        }
        state.push("\n");
    }
}

impl Codegen for Stmt {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Stmt::Class(class) => {
                state.push("class ");
                state.push(&class.name);
                if let Some(parent) = &class.parent {
                    state.push(" extends ");
                    state.push(parent);
                }
                state.push(" {");
                state.indent += 1;
                for member in &class.members {
                    state.begin_line();
                    member.codegen(state);
                }
                state.indent -= 1;
                state.begin_line();
                state.push("}");
            }
            Stmt::Function(func) => {
                state.push("function ");
                state.push(&func.name);
                emit_params(&func.params, state);
                emit_return_type(&func.return_type, state);
                state.push(" ");
                emit_block(&func.body, state);
            }
            Stmt::If(stmt) => {
                state.push("if (");
                emit_expr(&stmt.cond, state, PREC_NONE);
                state.push(") ");
                emit_block(&stmt.then_branch, state);
                if let Some(else_branch) = &stmt.else_branch {
                    state.push(" else ");
                    emit_block(else_branch, state);
                }
            }
            Stmt::While(stmt) => {
                state.push("while (");
                emit_expr(&stmt.cond, state, PREC_NONE);
                state.push(") ");
                emit_block(&stmt.body, state);
            }
            Stmt::Foreach(stmt) => {
                state.push("foreach (");
                emit_expr(&stmt.subject, state, PREC_NONE);
                state.push(" as ");
                if let Some(key) = &stmt.key {
                    state.push("$");
                    state.push(&key.name);
                    state.push(" => ");
                }
                if stmt.by_ref {
                    state.push("&");
                }
                state.push("$");
                state.push(&stmt.value.name);
                state.push(") ");
                emit_block(&stmt.body, state);
            }
            Stmt::Echo(stmt) => {
                state.push("echo ");
                for (i, value) in stmt.values.iter().enumerate() {
                    if i > 0 {
                        state.push(", ");
                    }
                    emit_expr(value, state, PREC_NONE);
                }
                state.push(";");
            }
            Stmt::Return(stmt) => {
                state.push("return");
                if let Some(value) = &stmt.value {
                    state.push(" ");
                    emit_expr(value, state, PREC_NONE);
                }
                state.push(";");
            }
            Stmt::Break => state.push("break;"),
            Stmt::Continue => state.push("continue;"),
            Stmt::Block(stmts) => emit_block(stmts, state),
            Stmt::Expression(expr) => {
                emit_expr(expr, state, PREC_NONE);
                state.push(";");
            }
        }
    }
}

impl Codegen for ClassMember {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            ClassMember::Property(prop) => {
                state.push(prop.flags.visibility.keyword());
                if prop.flags.is_static {
                    state.push(" static");
                }
                state.push(" ");
                for (i, item) in prop.items.iter().enumerate() {
                    if i > 0 {
                        state.push(", ");
                    }
                    state.push("$");
                    state.push(&item.name);
                    if let Some(default) = &item.default {
                        state.push(" = ");
                        emit_expr(default, state, PREC_NONE);
                    }
                }
                state.push(";");
            }
            ClassMember::Method(method) => {
                state.push(method.flags.visibility.keyword());
                if method.flags.is_static {
                    state.push(" static");
                }
                state.push(" function ");
                state.push(&method.name);
                emit_params(&method.params, state);
                emit_return_type(&method.return_type, state);
                state.push(" ");
                emit_block(&method.body, state);
            }
        }
    }
}

fn emit_block(stmts: &[Stmt], state: &mut CodegenState) {
    state.push("{");
    state.indent += 1;
    for stmt in stmts {
        state.begin_line();
        stmt.codegen(state);
    }
    state.indent -= 1;
    state.begin_line();
    state.push("}");
}

fn emit_params(params: &[Param], state: &mut CodegenState) {
    state.push("(");
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            state.push(", ");
        }
        if let Some(hint) = &param.hint {
            emit_type_hint(hint, state);
            state.push(" ");
        }
        if param.by_ref {
            state.push("&");
        }
        state.push("$");
        state.push(&param.var.name);
        if let Some(default) = &param.default {
            state.push(" = ");
            emit_expr(default, state, PREC_NONE);
        }
    }
    state.push(")");
}

fn emit_return_type(return_type: &Option<TypeHint>, state: &mut CodegenState) {
    if let Some(hint) = return_type {
        state.push(": ");
        emit_type_hint(hint, state);
    }
}

fn emit_type_hint(hint: &TypeHint, state: &mut CodegenState) {
    if hint.nullable {
        state.push("?");
    }
    state.push(&hint.name);
}

fn binary_prec(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => PREC_MULTIPLICATIVE,
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Concat => PREC_ADDITIVE,
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => PREC_COMPARISON,
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::Identical | BinaryOp::NotIdentical => {
            PREC_EQUALITY
        }
        BinaryOp::And => PREC_AND,
        BinaryOp::Or => PREC_OR,
        BinaryOp::Coalesce => PREC_COALESCE,
    }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Mul => "*",
        BinaryOp::Div => "/",
        BinaryOp::Mod => "%",
        BinaryOp::Add => "+",
        BinaryOp::Sub => "-",
        BinaryOp::Concat => ".",
        BinaryOp::Lt => "<",
        BinaryOp::Le => "<=",
        BinaryOp::Gt => ">",
        BinaryOp::Ge => ">=",
        BinaryOp::Eq => "==",
        BinaryOp::NotEq => "!=",
        BinaryOp::Identical => "===",
        BinaryOp::NotIdentical => "!==",
        BinaryOp::And => "&&",
        BinaryOp::Or => "||",
        BinaryOp::Coalesce => "??",
    }
}

fn assign_op_str(op: AssignOp) -> &'static str {
    match op {
        AssignOp::Assign => "=",
        AssignOp::Add => "+=",
        AssignOp::Sub => "-=",
        AssignOp::Mul => "*=",
        AssignOp::Div => "/=",
        AssignOp::Concat => ".=",
        AssignOp::Coalesce => "??=",
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Variable(_)
        | Expr::Int(_)
        | Expr::Float(_)
        | Expr::String(_)
        | Expr::ConstFetch(_)
        | Expr::Array(_) => PREC_ATOM,
        Expr::Index(_)
        | Expr::FunctionCall(_)
        | Expr::MethodCall(_)
        | Expr::StaticCall(_)
        | Expr::PropertyFetch(_)
        | Expr::StaticPropertyFetch(_)
        | Expr::New(_) => PREC_POSTFIX,
        Expr::Unary(_) => PREC_UNARY,
        Expr::IncDec(incdec) => {
            if incdec.prefix {
                PREC_UNARY
            } else {
                PREC_POSTFIX
            }
        }
        Expr::Binary(binary) => binary_prec(binary.op),
        Expr::Assign(_) => PREC_ASSIGN,
    }
}

fn emit_expr(expr: &Expr, state: &mut CodegenState, min_prec: u8) {
    let needs_parens = precedence(expr) < min_prec;
    if needs_parens {
        state.push("(");
    }
    match expr {
        Expr::Variable(var) => {
            state.push("$");
            state.push(&var.name);
        }
        Expr::Int(value) => state.push(&value.to_string()),
        Expr::Float(value) => {
            let mut text = value.to_string();
            // Keep floats floats: `2.0` must not print as the int `2`.
            if !text.contains('.') && !text.contains('e') && !text.contains('E') {
                text.push_str(".0");
            }
            state.push(&text);
        }
        Expr::String(raw) => state.push(raw),
        Expr::ConstFetch(name) => state.push(name),
        Expr::Array(items) => {
            state.push("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    state.push(", ");
                }
                if let Some(key) = &item.key {
                    emit_expr(key, state, PREC_NONE);
                    state.push(" => ");
                }
                emit_expr(&item.value, state, PREC_NONE);
            }
            state.push("]");
        }
        Expr::Index(index) => {
            emit_postfix_target(&index.target, state);
            state.push("[");
            if let Some(inner) = &index.index {
                emit_expr(inner, state, PREC_NONE);
            }
            state.push("]");
        }
        Expr::Unary(unary) => {
            state.push(match unary.op {
                UnaryOp::Not => "!",
                UnaryOp::Neg => "-",
                UnaryOp::Plus => "+",
            });
            // `-(-$x)` must not print as `--$x`.
            let sign_clash = matches!(unary.op, UnaryOp::Neg | UnaryOp::Plus)
                && match &*unary.operand {
                    Expr::Unary(_) => true,
                    Expr::IncDec(inner) => inner.prefix,
                    _ => false,
                };
            let min = if sign_clash { PREC_ATOM } else { PREC_UNARY };
            emit_expr(&unary.operand, state, min);
        }
        Expr::Binary(binary) => {
            let prec = binary_prec(binary.op);
            let (left_min, right_min) = if binary.op == BinaryOp::Coalesce {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            emit_expr(&binary.left, state, left_min);
            state.push(" ");
            state.push(binary_op_str(binary.op));
            state.push(" ");
            emit_expr(&binary.right, state, right_min);
        }
        Expr::Assign(assign) => {
            emit_expr(&assign.target, state, PREC_POSTFIX);
            state.push(" ");
            state.push(assign_op_str(assign.op));
            state.push(" ");
            emit_expr(&assign.value, state, PREC_ASSIGN);
        }
        Expr::IncDec(incdec) => {
            let op = match incdec.op {
                IncDecOp::Inc => "++",
                IncDecOp::Dec => "--",
            };
            if incdec.prefix {
                state.push(op);
                emit_expr(&incdec.target, state, PREC_POSTFIX);
            } else {
                emit_expr(&incdec.target, state, PREC_POSTFIX);
                state.push(op);
            }
        }
        Expr::FunctionCall(call) => {
            match &call.callee {
                Callee::Name(name) => state.push(name),
                Callee::Variable(var) => {
                    state.push("$");
                    state.push(&var.name);
                }
            }
            emit_args(&call.args, state);
        }
        Expr::MethodCall(call) => {
            emit_postfix_target(&call.target, state);
            state.push("->");
            emit_member_name(&call.name, state);
            emit_args(&call.args, state);
        }
        Expr::StaticCall(call) => {
            state.push(&call.class);
            state.push("::");
            match &call.name {
                MemberName::Identifier(name) => state.push(name),
                MemberName::Variable(var) => {
                    state.push("$");
                    state.push(&var.name);
                }
                MemberName::Expr(inner) => {
                    state.push("{");
                    emit_expr(inner, state, PREC_NONE);
                    state.push("}");
                }
            }
            emit_args(&call.args, state);
        }
        Expr::PropertyFetch(fetch) => {
            emit_postfix_target(&fetch.target, state);
            state.push("->");
            emit_member_name(&fetch.name, state);
        }
        Expr::StaticPropertyFetch(fetch) => {
            state.push(&fetch.class);
            state.push("::$");
            state.push(&fetch.name);
        }
        Expr::New(new) => {
            state.push("new ");
            state.push(&new.class);
            emit_args(&new.args, state);
        }
    }
    if needs_parens {
        state.push(")");
    }
}

/// Emit the receiver of a postfix access, parenthesizing `new` which PHP
/// does not allow bare in that position.
fn emit_postfix_target(target: &Expr, state: &mut CodegenState) {
    if matches!(target, Expr::New(_)) {
        state.push("(");
        emit_expr(target, state, PREC_NONE);
        state.push(")");
    } else {
        emit_expr(target, state, PREC_POSTFIX);
    }
}

fn emit_args(args: &[Expr], state: &mut CodegenState) {
    state.push("(");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            state.push(", ");
        }
        emit_expr(arg, state, PREC_NONE);
    }
    state.push(")");
}

fn emit_member_name(name: &MemberName, state: &mut CodegenState) {
    match name {
        MemberName::Identifier(ident) => state.push(ident),
        MemberName::Variable(var) => {
            state.push("$");
            state.push(&var.name);
        }
        MemberName::Expr(expr) => {
            state.push("{");
            emit_expr(expr, state, PREC_NONE);
            state.push("}");
        }
    }
}
