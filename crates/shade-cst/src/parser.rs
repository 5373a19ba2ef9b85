//! Recursive-descent parser for the PHP subset.
//!
//! Builds a [`Program`] from a token stream. Statements are parsed by
//! keyword dispatch; expressions with precedence climbing matching the
//! PHP 7 operator table for the supported operators (concatenation sits
//! at the additive level).
//!
//! Keywords are recognized case-insensitively, like PHP's. The parser is
//! deliberately lenient where strictness would not change the meaning of
//! accepted programs (for example, it does not reject `1 < 2 < 3`).

use thiserror::Error;

use crate::ast::{
    ArrayItem, AssignExpr, AssignOp, BinaryExpr, BinaryOp, Callee, ClassDecl, ClassMember,
    EchoStmt, Expr, ForeachStmt, FunctionCallExpr, FunctionDecl, IfStmt, IncDecExpr, IncDecOp,
    IndexExpr, MemberFlags, MemberName, MethodCallExpr, MethodDecl, NewExpr, Param, Program,
    PropertyDecl, PropertyFetchExpr, PropertyItem, ReturnStmt, StaticCallExpr,
    StaticPropertyFetchExpr, Stmt, TypeHint, UnaryExpr, UnaryOp, Variable, Visibility, WhileStmt,
};
use crate::tokenizer::{tokenize, Token, TokenKind, TokenizerError};

/// Error type for parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// The tokenizer rejected the source.
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),

    /// A token that does not fit the grammar at this position.
    #[error("unexpected token '{found}' at line {line}, column {col}: expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        line: u32,
        col: u32,
    },

    /// The input ended mid-construct.
    #[error("unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    /// A numeric literal that does not fit its type.
    #[error("invalid numeric literal '{text}' at line {line}, column {col}")]
    InvalidLiteral { text: String, line: u32, col: u32 },
}

/// Result type for parsing.
pub type ParseResult<T> = Result<T, ParserError>;

/// Parse PHP source into a [`Program`].
///
/// # Errors
///
/// Returns a [`ParserError`] if the source fails to tokenize or does not
/// match the grammar.
///
/// # Example
///
/// ```
/// use shade_cst::parse_program;
///
/// let program = parse_program("<?php echo 1 + 2;").expect("parse error");
/// assert_eq!(program.body.len(), 1);
/// ```
pub fn parse_program(source: &str) -> ParseResult<Program> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        // The tokenizer guarantees the stream starts with the open tag.
        let pos = usize::from(matches!(
            tokens.first(),
            Some(Token {
                kind: TokenKind::OpenTag,
                ..
            })
        ));
        Self { tokens, pos }
    }

    fn parse(mut self) -> ParseResult<Program> {
        let mut body = Vec::new();
        loop {
            match self.peek_kind() {
                None => break,
                Some(TokenKind::CloseTag) => {
                    self.pos += 1;
                    break;
                }
                Some(_) => body.push(self.parse_statement()?),
            }
        }
        Ok(Program { body })
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.bump().unwrap_or_else(|| unreachable!()))
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Lowercased text of the current token, if it is an identifier.
    fn keyword(&self) -> Option<String> {
        match self.peek() {
            Some(token) if token.kind == TokenKind::Identifier => {
                Some(token.text.to_ascii_lowercase())
            }
            _ => None,
        }
    }

    fn at_keyword(&self, kw: &str) -> bool {
        self.keyword().as_deref() == Some(kw)
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParserError {
        match self.peek() {
            Some(token) => ParserError::UnexpectedToken {
                found: token.text.clone(),
                expected: expected.to_string(),
                line: token.line,
                col: token.col,
            },
            None => ParserError::UnexpectedEof {
                expected: expected.to_string(),
            },
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        if let Some(kw) = self.keyword() {
            match kw.as_str() {
                "class" => {
                    self.pos += 1;
                    return Ok(Stmt::Class(self.parse_class()?));
                }
                "function" => {
                    self.pos += 1;
                    return Ok(Stmt::Function(self.parse_function()?));
                }
                "if" => {
                    self.pos += 1;
                    return Ok(Stmt::If(self.parse_if()?));
                }
                "while" => {
                    self.pos += 1;
                    return Ok(Stmt::While(self.parse_while()?));
                }
                "foreach" => {
                    self.pos += 1;
                    return Ok(Stmt::Foreach(self.parse_foreach()?));
                }
                "echo" => {
                    self.pos += 1;
                    return Ok(Stmt::Echo(self.parse_echo()?));
                }
                "return" => {
                    self.pos += 1;
                    let value = if self.check(TokenKind::Semicolon) {
                        None
                    } else {
                        Some(self.parse_expr()?)
                    };
                    self.expect(TokenKind::Semicolon, "';' after return")?;
                    return Ok(Stmt::Return(ReturnStmt { value }));
                }
                "break" => {
                    self.pos += 1;
                    self.expect(TokenKind::Semicolon, "';' after break")?;
                    return Ok(Stmt::Break);
                }
                "continue" => {
                    self.pos += 1;
                    self.expect(TokenKind::Semicolon, "';' after continue")?;
                    return Ok(Stmt::Continue);
                }
                _ => {}
            }
        }
        if self.eat(TokenKind::LBrace) {
            let mut stmts = Vec::new();
            while !self.check(TokenKind::RBrace) {
                if self.peek().is_none() {
                    return Err(self.unexpected("'}'"));
                }
                stmts.push(self.parse_statement()?);
            }
            self.pos += 1;
            return Ok(Stmt::Block(stmts));
        }
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon, "';' after expression")?;
        Ok(Stmt::Expression(expr))
    }

    fn parse_class(&mut self) -> ParseResult<ClassDecl> {
        let name = self.expect(TokenKind::Identifier, "class name")?.text;
        let parent = if self.eat_keyword("extends") {
            Some(self.expect(TokenKind::Identifier, "parent class name")?.text)
        } else {
            None
        };
        self.expect(TokenKind::LBrace, "'{' after class name")?;
        let mut members = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            members.push(self.parse_member()?);
        }
        self.pos += 1;
        Ok(ClassDecl {
            name,
            parent,
            members,
        })
    }

    fn parse_member(&mut self) -> ParseResult<ClassMember> {
        let mut flags = MemberFlags::default();
        loop {
            match self.keyword().as_deref() {
                Some("public") => {
                    flags.visibility = Visibility::Public;
                    self.pos += 1;
                }
                Some("protected") => {
                    flags.visibility = Visibility::Protected;
                    self.pos += 1;
                }
                Some("private") => {
                    flags.visibility = Visibility::Private;
                    self.pos += 1;
                }
                Some("static") => {
                    flags.is_static = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }

        if self.eat_keyword("function") {
            let name = self.expect(TokenKind::Identifier, "method name")?.text;
            let params = self.parse_params()?;
            let return_type = self.parse_return_type()?;
            let body = self.parse_braced_body()?;
            return Ok(ClassMember::Method(MethodDecl {
                flags,
                name,
                params,
                return_type,
                body,
            }));
        }

        if self.check(TokenKind::Variable) {
            let mut items = Vec::new();
            loop {
                let token = self.expect(TokenKind::Variable, "property name")?;
                let name = token.text.trim_start_matches('$').to_string();
                let default = if self.eat(TokenKind::Assign) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                items.push(PropertyItem { name, default });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::Semicolon, "';' after property declaration")?;
            return Ok(ClassMember::Property(PropertyDecl { flags, items }));
        }

        Err(self.unexpected("a method or property declaration"))
    }

    fn parse_function(&mut self) -> ParseResult<FunctionDecl> {
        let name = self.expect(TokenKind::Identifier, "function name")?.text;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        let body = self.parse_braced_body()?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut params = Vec::new();
        if self.eat(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            params.push(self.parse_param()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')' after parameters")?;
        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let nullable = self.eat(TokenKind::Question);
        let hint = if self.check(TokenKind::Identifier) {
            let name = self.expect(TokenKind::Identifier, "type name")?.text;
            Some(TypeHint { nullable, name })
        } else if nullable {
            return Err(self.unexpected("a type name after '?'"));
        } else {
            None
        };
        let by_ref = self.eat(TokenKind::Ampersand);
        let token = self.expect(TokenKind::Variable, "parameter variable")?;
        let var = Variable::new(token.text.trim_start_matches('$'));
        let default = if self.eat(TokenKind::Assign) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(Param {
            hint,
            by_ref,
            var,
            default,
        })
    }

    fn parse_return_type(&mut self) -> ParseResult<Option<TypeHint>> {
        if !self.eat(TokenKind::Colon) {
            return Ok(None);
        }
        let nullable = self.eat(TokenKind::Question);
        let name = self.expect(TokenKind::Identifier, "return type name")?.text;
        Ok(Some(TypeHint { nullable, name }))
    }

    fn parse_braced_body(&mut self) -> ParseResult<Vec<Stmt>> {
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) {
            if self.peek().is_none() {
                return Err(self.unexpected("'}'"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.pos += 1;
        Ok(stmts)
    }

    /// A braced block or a single statement, as the body of a control
    /// structure.
    fn parse_branch(&mut self) -> ParseResult<Vec<Stmt>> {
        if self.check(TokenKind::LBrace) {
            self.parse_braced_body()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    fn parse_if(&mut self) -> ParseResult<IfStmt> {
        self.expect(TokenKind::LParen, "'(' after if")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        let then_branch = self.parse_branch()?;
        let else_branch = if self.eat_keyword("elseif") {
            Some(vec![Stmt::If(self.parse_if()?)])
        } else if self.eat_keyword("else") {
            Some(self.parse_branch()?)
        } else {
            None
        };
        Ok(IfStmt {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn parse_while(&mut self) -> ParseResult<WhileStmt> {
        self.expect(TokenKind::LParen, "'(' after while")?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen, "')' after condition")?;
        let body = self.parse_branch()?;
        Ok(WhileStmt { cond, body })
    }

    fn parse_foreach(&mut self) -> ParseResult<ForeachStmt> {
        self.expect(TokenKind::LParen, "'(' after foreach")?;
        let subject = self.parse_expr()?;
        if !self.eat_keyword("as") {
            return Err(self.unexpected("'as'"));
        }
        let first_by_ref = self.eat(TokenKind::Ampersand);
        let first = self.expect(TokenKind::Variable, "loop variable")?;
        let first = Variable::new(first.text.trim_start_matches('$'));

        let (key, by_ref, value) = if self.check(TokenKind::DoubleArrow) {
            if first_by_ref {
                return Err(self.unexpected("')' (foreach keys cannot be by reference)"));
            }
            self.pos += 1;
            let by_ref = self.eat(TokenKind::Ampersand);
            let value = self.expect(TokenKind::Variable, "loop value variable")?;
            let value = Variable::new(value.text.trim_start_matches('$'));
            (Some(first), by_ref, value)
        } else {
            (None, first_by_ref, first)
        };

        self.expect(TokenKind::RParen, "')' after foreach")?;
        let body = self.parse_branch()?;
        Ok(ForeachStmt {
            subject,
            key,
            by_ref,
            value,
            body,
        })
    }

    fn parse_echo(&mut self) -> ParseResult<EchoStmt> {
        let mut values = vec![self.parse_expr()?];
        while self.eat(TokenKind::Comma) {
            values.push(self.parse_expr()?);
        }
        self.expect(TokenKind::Semicolon, "';' after echo")?;
        Ok(EchoStmt { values })
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expr> {
        let left = self.parse_coalesce()?;
        let op = match self.peek_kind() {
            Some(TokenKind::Assign) => AssignOp::Assign,
            Some(TokenKind::PlusAssign) => AssignOp::Add,
            Some(TokenKind::MinusAssign) => AssignOp::Sub,
            Some(TokenKind::MulAssign) => AssignOp::Mul,
            Some(TokenKind::DivAssign) => AssignOp::Div,
            Some(TokenKind::ConcatAssign) => AssignOp::Concat,
            Some(TokenKind::CoalesceAssign) => AssignOp::Coalesce,
            _ => return Ok(left),
        };
        self.pos += 1;
        let value = self.parse_assignment()?;
        Ok(Expr::Assign(AssignExpr {
            op,
            target: Box::new(left),
            value: Box::new(value),
        }))
    }

    fn parse_coalesce(&mut self) -> ParseResult<Expr> {
        let left = self.parse_or()?;
        if self.eat(TokenKind::Coalesce) {
            let right = self.parse_coalesce()?;
            return Ok(binary(BinaryOp::Coalesce, left, right));
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::OrOr) {
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_equality()?;
        while self.eat(TokenKind::AndAnd) {
            let right = self.parse_equality()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::EqEq) => BinaryOp::Eq,
                Some(TokenKind::NotEq) => BinaryOp::NotEq,
                Some(TokenKind::Identical) => BinaryOp::Identical,
                Some(TokenKind::NotIdentical) => BinaryOp::NotIdentical,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_comparison()?;
            left = binary(op, left, right);
        }
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Lt) => BinaryOp::Lt,
                Some(TokenKind::Le) => BinaryOp::Le,
                Some(TokenKind::Gt) => BinaryOp::Gt,
                Some(TokenKind::Ge) => BinaryOp::Ge,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = binary(op, left, right);
        }
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                Some(TokenKind::Dot) => BinaryOp::Concat,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                Some(TokenKind::Percent) => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let op = match self.peek_kind() {
            Some(TokenKind::Bang) => Some(UnaryOp::Not),
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            Some(TokenKind::Plus) => Some(UnaryOp::Plus),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                op,
                operand: Box::new(operand),
            }));
        }
        if self.check(TokenKind::Inc) || self.check(TokenKind::Dec) {
            let op = if self.check(TokenKind::Inc) {
                IncDecOp::Inc
            } else {
                IncDecOp::Dec
            };
            self.pos += 1;
            let target = self.parse_unary()?;
            return Ok(Expr::IncDec(IncDecExpr {
                op,
                prefix: true,
                target: Box::new(target),
            }));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Arrow) => {
                    self.pos += 1;
                    let name = self.parse_member_name()?;
                    if self.check(TokenKind::LParen) {
                        let args = self.parse_args()?;
                        expr = Expr::MethodCall(MethodCallExpr {
                            target: Box::new(expr),
                            name,
                            args,
                        });
                    } else {
                        expr = Expr::PropertyFetch(PropertyFetchExpr {
                            target: Box::new(expr),
                            name,
                        });
                    }
                }
                Some(TokenKind::DoubleColon) => {
                    let class = match expr {
                        Expr::ConstFetch(name) => name,
                        _ => return Err(self.unexpected("a class name before '::'")),
                    };
                    self.pos += 1;
                    expr = self.parse_static_access(class)?;
                }
                Some(TokenKind::LBracket) => {
                    self.pos += 1;
                    let index = if self.check(TokenKind::RBracket) {
                        None
                    } else {
                        Some(Box::new(self.parse_expr()?))
                    };
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::Index(IndexExpr {
                        target: Box::new(expr),
                        index,
                    });
                }
                Some(TokenKind::Inc) | Some(TokenKind::Dec) => {
                    let op = if self.check(TokenKind::Inc) {
                        IncDecOp::Inc
                    } else {
                        IncDecOp::Dec
                    };
                    self.pos += 1;
                    expr = Expr::IncDec(IncDecExpr {
                        op,
                        prefix: false,
                        target: Box::new(expr),
                    });
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_static_access(&mut self, class: String) -> ParseResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Variable) => {
                let token = self.expect(TokenKind::Variable, "property name")?;
                let name = token.text.trim_start_matches('$').to_string();
                if self.check(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::StaticCall(StaticCallExpr {
                        class,
                        name: MemberName::Variable(Variable::new(name)),
                        args,
                    }))
                } else {
                    Ok(Expr::StaticPropertyFetch(StaticPropertyFetchExpr {
                        class,
                        name,
                    }))
                }
            }
            Some(TokenKind::Identifier) => {
                let name = self.expect(TokenKind::Identifier, "method name")?.text;
                if !self.check(TokenKind::LParen) {
                    return Err(self.unexpected("'(' (class constants are not supported)"));
                }
                let args = self.parse_args()?;
                Ok(Expr::StaticCall(StaticCallExpr {
                    class,
                    name: MemberName::Identifier(name),
                    args,
                }))
            }
            Some(TokenKind::LBrace) => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RBrace, "'}'")?;
                if !self.check(TokenKind::LParen) {
                    return Err(self.unexpected("'(' after computed method name"));
                }
                let args = self.parse_args()?;
                Ok(Expr::StaticCall(StaticCallExpr {
                    class,
                    name: MemberName::Expr(Box::new(inner)),
                    args,
                }))
            }
            _ => Err(self.unexpected("a method or property name after '::'")),
        }
    }

    fn parse_member_name(&mut self) -> ParseResult<MemberName> {
        match self.peek_kind() {
            Some(TokenKind::Identifier) => {
                let name = self.expect(TokenKind::Identifier, "member name")?.text;
                Ok(MemberName::Identifier(name))
            }
            Some(TokenKind::Variable) => {
                let token = self.expect(TokenKind::Variable, "member name")?;
                Ok(MemberName::Variable(Variable::new(
                    token.text.trim_start_matches('$'),
                )))
            }
            Some(TokenKind::LBrace) => {
                self.pos += 1;
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RBrace, "'}'")?;
                Ok(MemberName::Expr(Box::new(inner)))
            }
            _ => Err(self.unexpected("a member name after '->'")),
        }
    }

    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut args = Vec::new();
        while !self.check(TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Variable) => {
                let token = self.expect(TokenKind::Variable, "variable")?;
                let var = Variable::new(token.text.trim_start_matches('$'));
                if self.check(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::FunctionCall(FunctionCallExpr {
                        callee: Callee::Variable(var),
                        args,
                    }))
                } else {
                    Ok(Expr::Variable(var))
                }
            }
            Some(TokenKind::Int) => {
                let token = self.expect(TokenKind::Int, "integer")?;
                let value: i64 = token.text.parse().map_err(|_| ParserError::InvalidLiteral {
                    text: token.text.clone(),
                    line: token.line,
                    col: token.col,
                })?;
                Ok(Expr::Int(value))
            }
            Some(TokenKind::Float) => {
                let token = self.expect(TokenKind::Float, "float")?;
                let value: f64 = token.text.parse().map_err(|_| ParserError::InvalidLiteral {
                    text: token.text.clone(),
                    line: token.line,
                    col: token.col,
                })?;
                Ok(Expr::Float(value))
            }
            Some(TokenKind::StringLit) => {
                let token = self.expect(TokenKind::StringLit, "string")?;
                Ok(Expr::String(token.text))
            }
            Some(TokenKind::Identifier) => {
                if self.at_keyword("new") {
                    self.pos += 1;
                    let class = self.expect(TokenKind::Identifier, "class name after new")?.text;
                    let args = if self.check(TokenKind::LParen) {
                        self.parse_args()?
                    } else {
                        Vec::new()
                    };
                    return Ok(Expr::New(NewExpr { class, args }));
                }
                let token = self.expect(TokenKind::Identifier, "identifier")?;
                if self.check(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    Ok(Expr::FunctionCall(FunctionCallExpr {
                        callee: Callee::Name(token.text),
                        args,
                    }))
                } else {
                    Ok(Expr::ConstFetch(token.text))
                }
            }
            Some(TokenKind::LParen) => {
                self.pos += 1;
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(expr)
            }
            Some(TokenKind::LBracket) => {
                self.pos += 1;
                let mut items = Vec::new();
                while !self.check(TokenKind::RBracket) {
                    let first = self.parse_expr()?;
                    let item = if self.eat(TokenKind::DoubleArrow) {
                        ArrayItem {
                            key: Some(first),
                            value: self.parse_expr()?,
                        }
                    } else {
                        ArrayItem {
                            key: None,
                            value: first,
                        }
                    };
                    items.push(item);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                }
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expr::Array(items))
            }
            _ => Err(self.unexpected("an expression")),
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary(BinaryExpr {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}
