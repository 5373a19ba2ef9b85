//! A PHP parser and syntax tree library for shade.
//!
//! This crate parses a practical subset of PHP into an owned, mutable
//! syntax tree, and converts trees back to source text. It exists to
//! support identifier renaming: node identifier fields are plain
//! `String`s that a visitor can rewrite in place.
//!
//! # Overview
//!
//! - **Parsing**: [`parse_program`] turns source text into a
//!   [`Program`]; failures are [`ParserError`]s with line/column info.
//! - **Code generation**: [`print_program`] converts a tree back to
//!   normalized source via the [`Codegen`] trait. Output preserves
//!   program semantics, not the original formatting.
//! - **Traversal**: the [`visitor`] module provides the [`MutVisitor`]
//!   trait and `walk_*` functions for deterministic, source-order
//!   traversal with in-place mutation.
//! - **Stripping**: [`strip_whitespace`] re-emits a file without
//!   comments or insignificant whitespace, like `php_strip_whitespace`.
//!
//! # Quick Start
//!
//! ```
//! use shade_cst::{parse_program, print_program};
//!
//! let source = "<?php echo 1 + 2;";
//! let program = parse_program(source).expect("parse error");
//! assert_eq!(print_program(&program), "<?php\necho 1 + 2;\n");
//! ```
//!
//! # Subset Notes
//!
//! The grammar covers classes (methods, properties, modifiers),
//! functions, the common statement forms, and an expression grammar with
//! the PHP 7 precedence table for the supported operators. Double-quoted
//! string interpolation is rejected at tokenize time: renaming a
//! variable while leaving interpolated occurrences inside strings would
//! change program behavior.

/// Syntax tree node types.
pub mod ast;

/// Code generation back to PHP source text.
pub mod codegen;

/// Recursive-descent parser.
pub mod parser;

/// Token-level whitespace and comment stripping.
pub mod strip;

/// Tokenizer for PHP source code.
pub mod tokenizer;

/// Visitor infrastructure for mutable tree traversal.
pub mod visitor;

pub use ast::*;
pub use codegen::{print_program, Codegen, CodegenState};
pub use parser::{parse_program, ParseResult, ParserError};
pub use strip::strip_whitespace;
pub use tokenizer::{tokenize, Token, TokenKind, TokenizerError, TokenizerResult};
pub use visitor::{walk_expr, walk_program, walk_stmt, MutVisitor, VisitResult};
