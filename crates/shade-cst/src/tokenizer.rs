//! Tokenizer for PHP source code.
//!
//! Produces a flat token stream for the parser and for token-level
//! rewriting (see [`crate::strip`]). Each token carries its raw source
//! text (`$name` includes the sigil, string literals include their
//! quotes) and whether whitespace or a comment preceded it, so the
//! stream can be re-emitted without consulting the original source.
//!
//! Comments are trivia: they are skipped, not tokenized. Double-quoted
//! strings are accepted only without interpolation - an unescaped `$name`
//! or `{$` inside one is a tokenizer error, because renaming a variable
//! while leaving interpolated occurrences behind would silently change
//! program behavior.

use thiserror::Error;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<?php`
    OpenTag,
    /// `?>`
    CloseTag,
    /// A bare name: keywords, class names, function names, constants.
    Identifier,
    /// `$name`
    Variable,
    /// Integer literal.
    Int,
    /// Float literal.
    Float,
    /// Single- or double-quoted string literal.
    StringLit,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Question,
    /// `->`
    Arrow,
    /// `::`
    DoubleColon,
    /// `=>`
    DoubleArrow,
    Assign,
    PlusAssign,
    MinusAssign,
    MulAssign,
    DivAssign,
    ConcatAssign,
    CoalesceAssign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Dot,
    Bang,
    Ampersand,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    NotEq,
    Identical,
    NotIdentical,
    AndAnd,
    OrOr,
    Coalesce,
    /// `++`
    Inc,
    /// `--`
    Dec,
}

/// One token of PHP source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// Raw source text of the token.
    pub text: String,
    /// 1-indexed line of the first character.
    pub line: u32,
    /// 1-indexed column of the first character.
    pub col: u32,
    /// Whether whitespace or a comment preceded this token.
    pub preceded_by_trivia: bool,
}

/// Error type for tokenization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    /// A character that starts no token.
    #[error("unexpected character '{ch}' at line {line}, column {col}")]
    UnexpectedChar { ch: char, line: u32, col: u32 },

    /// A string literal without a closing quote.
    #[error("unterminated string literal starting at line {line}, column {col}")]
    UnterminatedString { line: u32, col: u32 },

    /// A `/* ... */` comment without a closing `*/`.
    #[error("unterminated comment starting at line {line}, column {col}")]
    UnterminatedComment { line: u32, col: u32 },

    /// Interpolation inside a double-quoted string.
    #[error("string interpolation is not supported (line {line}, column {col})")]
    Interpolation { line: u32, col: u32 },

    /// The source does not start with an open tag.
    #[error("expected '<?php' open tag at line {line}, column {col}")]
    MissingOpenTag { line: u32, col: u32 },

    /// A `$` not followed by a variable name.
    #[error("'$' must be followed by a variable name at line {line}, column {col}")]
    BareDollar { line: u32, col: u32 },

    /// Non-whitespace content after the close tag.
    #[error("trailing content after '?>' at line {line}, column {col}")]
    TrailingContent { line: u32, col: u32 },
}

/// Result type for tokenization.
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Tokenize PHP source into a token stream.
///
/// The first token is always [`TokenKind::OpenTag`]; only whitespace may
/// precede the tag or follow a close tag.
pub fn tokenize(source: &str) -> TokenizerResult<Vec<Token>> {
    Tokenizer::new(source).run()
}

struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
}

impl Tokenizer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn run(mut self) -> TokenizerResult<Vec<Token>> {
        let mut tokens = Vec::new();

        // Only whitespace may precede the open tag.
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        let (line, col) = (self.line, self.col);
        if !self.eat_open_tag() {
            return Err(TokenizerError::MissingOpenTag { line, col });
        }
        tokens.push(Token {
            kind: TokenKind::OpenTag,
            text: "<?php".to_string(),
            line,
            col,
            preceded_by_trivia: false,
        });

        loop {
            let trivia = self.skip_trivia()?;
            let Some(ch) = self.peek() else { break };
            let (line, col) = (self.line, self.col);

            if ch == '?' && self.peek_at(1) == Some('>') {
                self.bump();
                self.bump();
                tokens.push(Token {
                    kind: TokenKind::CloseTag,
                    text: "?>".to_string(),
                    line,
                    col,
                    preceded_by_trivia: trivia,
                });
                // Anything after the close tag would be inline HTML,
                // which the obfuscator does not process.
                while let Some(c) = self.peek() {
                    if !c.is_whitespace() {
                        return Err(TokenizerError::TrailingContent {
                            line: self.line,
                            col: self.col,
                        });
                    }
                    self.bump();
                }
                break;
            }

            let token = self.next_token(ch, trivia, line, col)?;
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Consume `<?php` (case-insensitive) followed by whitespace or EOF.
    fn eat_open_tag(&mut self) -> bool {
        const TAG: &[char] = &['<', '?', 'p', 'h', 'p'];
        for (offset, expected) in TAG.iter().enumerate() {
            match self.peek_at(offset) {
                Some(c) if c.to_ascii_lowercase() == *expected => {}
                _ => return false,
            }
        }
        match self.peek_at(TAG.len()) {
            Some(c) if !c.is_whitespace() => return false,
            _ => {}
        }
        for _ in 0..TAG.len() {
            self.bump();
        }
        true
    }

    /// Skip whitespace and comments; returns whether anything was skipped.
    fn skip_trivia(&mut self) -> TokenizerResult<bool> {
        let mut any = false;
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                    any = true;
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    self.skip_line_comment();
                    any = true;
                }
                Some('#') => {
                    self.skip_line_comment();
                    any = true;
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.skip_block_comment()?;
                    any = true;
                }
                _ => break,
            }
        }
        Ok(any)
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            // A close tag ends a line comment, like in PHP.
            if c == '\n' || (c == '?' && self.peek_at(1) == Some('>')) {
                break;
            }
            self.bump();
        }
    }

    fn skip_block_comment(&mut self) -> TokenizerResult<()> {
        let (line, col) = (self.line, self.col);
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => return Err(TokenizerError::UnterminatedComment { line, col }),
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn next_token(
        &mut self,
        ch: char,
        trivia: bool,
        line: u32,
        col: u32,
    ) -> TokenizerResult<Token> {
        let (kind, text) = if ch == '$' {
            self.lex_variable(line, col)?
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            self.lex_identifier()
        } else if ch.is_ascii_digit() {
            self.lex_number()
        } else if ch == '\'' {
            self.lex_single_quoted(line, col)?
        } else if ch == '"' {
            self.lex_double_quoted(line, col)?
        } else {
            self.lex_operator(ch, line, col)?
        };
        Ok(Token {
            kind,
            text,
            line,
            col,
            preceded_by_trivia: trivia,
        })
    }

    fn lex_variable(&mut self, line: u32, col: u32) -> TokenizerResult<(TokenKind, String)> {
        let mut text = String::from('$');
        self.bump();
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return Err(TokenizerError::BareDollar { line, col }),
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        Ok((TokenKind::Variable, text))
    }

    fn lex_identifier(&mut self) -> (TokenKind, String) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        (TokenKind::Identifier, text)
    }

    fn lex_number(&mut self) -> (TokenKind, String) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let is_float = self.peek() == Some('.')
            && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit());
        if is_float {
            text.push('.');
            self.bump();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.bump();
                } else {
                    break;
                }
            }
            (TokenKind::Float, text)
        } else {
            (TokenKind::Int, text)
        }
    }

    fn lex_single_quoted(&mut self, line: u32, col: u32) -> TokenizerResult<(TokenKind, String)> {
        let mut text = String::from('\'');
        self.bump();
        loop {
            match self.peek() {
                None => return Err(TokenizerError::UnterminatedString { line, col }),
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    match self.bump() {
                        Some(c) => text.push(c),
                        None => return Err(TokenizerError::UnterminatedString { line, col }),
                    }
                }
                Some('\'') => {
                    text.push('\'');
                    self.bump();
                    return Ok((TokenKind::StringLit, text));
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }

    fn lex_double_quoted(&mut self, line: u32, col: u32) -> TokenizerResult<(TokenKind, String)> {
        let mut text = String::from('"');
        self.bump();
        loop {
            match self.peek() {
                None => return Err(TokenizerError::UnterminatedString { line, col }),
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    match self.bump() {
                        Some(c) => text.push(c),
                        None => return Err(TokenizerError::UnterminatedString { line, col }),
                    }
                }
                Some('$') if matches!(self.peek_at(1), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '{') =>
                {
                    return Err(TokenizerError::Interpolation {
                        line: self.line,
                        col: self.col,
                    });
                }
                Some('{') if self.peek_at(1) == Some('$') => {
                    return Err(TokenizerError::Interpolation {
                        line: self.line,
                        col: self.col,
                    });
                }
                Some('"') => {
                    text.push('"');
                    self.bump();
                    return Ok((TokenKind::StringLit, text));
                }
                Some(c) => {
                    text.push(c);
                    self.bump();
                }
            }
        }
    }

    fn lex_operator(&mut self, ch: char, line: u32, col: u32) -> TokenizerResult<(TokenKind, String)> {
        const THREE: &[(&str, TokenKind)] = &[
            ("===", TokenKind::Identical),
            ("!==", TokenKind::NotIdentical),
            ("??=", TokenKind::CoalesceAssign),
        ];
        const TWO: &[(&str, TokenKind)] = &[
            ("==", TokenKind::EqEq),
            ("!=", TokenKind::NotEq),
            ("<=", TokenKind::Le),
            (">=", TokenKind::Ge),
            ("&&", TokenKind::AndAnd),
            ("||", TokenKind::OrOr),
            ("??", TokenKind::Coalesce),
            ("->", TokenKind::Arrow),
            ("=>", TokenKind::DoubleArrow),
            ("::", TokenKind::DoubleColon),
            ("++", TokenKind::Inc),
            ("--", TokenKind::Dec),
            ("+=", TokenKind::PlusAssign),
            ("-=", TokenKind::MinusAssign),
            ("*=", TokenKind::MulAssign),
            ("/=", TokenKind::DivAssign),
            (".=", TokenKind::ConcatAssign),
        ];
        const ONE: &[(char, TokenKind)] = &[
            ('(', TokenKind::LParen),
            (')', TokenKind::RParen),
            ('{', TokenKind::LBrace),
            ('}', TokenKind::RBrace),
            ('[', TokenKind::LBracket),
            (']', TokenKind::RBracket),
            (',', TokenKind::Comma),
            (';', TokenKind::Semicolon),
            (':', TokenKind::Colon),
            ('?', TokenKind::Question),
            ('+', TokenKind::Plus),
            ('-', TokenKind::Minus),
            ('*', TokenKind::Star),
            ('/', TokenKind::Slash),
            ('%', TokenKind::Percent),
            ('.', TokenKind::Dot),
            ('!', TokenKind::Bang),
            ('=', TokenKind::Assign),
            ('<', TokenKind::Lt),
            ('>', TokenKind::Gt),
            ('&', TokenKind::Ampersand),
        ];

        for (text, kind) in THREE {
            if self.matches_str(text) {
                for _ in 0..3 {
                    self.bump();
                }
                return Ok((*kind, (*text).to_string()));
            }
        }
        for (text, kind) in TWO {
            if self.matches_str(text) {
                for _ in 0..2 {
                    self.bump();
                }
                return Ok((*kind, (*text).to_string()));
            }
        }
        for (expected, kind) in ONE {
            if ch == *expected {
                self.bump();
                return Ok((*kind, ch.to_string()));
            }
        }
        Err(TokenizerError::UnexpectedChar { ch, line, col })
    }

    fn matches_str(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(offset, expected)| self.peek_at(offset) == Some(expected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("tokenize error")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn tokenizes_a_simple_statement() {
        assert_eq!(
            kinds("<?php echo 1 + 2;"),
            vec![
                TokenKind::OpenTag,
                TokenKind::Identifier,
                TokenKind::Int,
                TokenKind::Plus,
                TokenKind::Int,
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn tokenizes_variables_with_sigil_text() {
        let tokens = tokenize("<?php $count = 1;").expect("tokenize error");
        assert_eq!(tokens[1].kind, TokenKind::Variable);
        assert_eq!(tokens[1].text, "$count");
    }

    #[test]
    fn requires_open_tag() {
        assert!(matches!(
            tokenize("echo 1;"),
            Err(TokenizerError::MissingOpenTag { .. })
        ));
    }

    #[test]
    fn open_tag_is_case_insensitive() {
        assert_eq!(kinds("<?PHP echo 1;").len(), 4);
    }

    #[test]
    fn comments_are_trivia() {
        let tokens = tokenize("<?php // note\n$a/* x */;").expect("tokenize error");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["<?php", "$a", ";"]);
        assert!(tokens[1].preceded_by_trivia);
        assert!(tokens[2].preceded_by_trivia);
    }

    #[test]
    fn adjacent_tokens_have_no_trivia_flag() {
        let tokens = tokenize("<?php $a;").expect("tokenize error");
        assert!(tokens[1].preceded_by_trivia);
        assert!(!tokens[2].preceded_by_trivia);
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            kinds("<?php $a === $b;")[2],
            TokenKind::Identical
        );
        assert_eq!(kinds("<?php $a ??= $b;")[2], TokenKind::CoalesceAssign);
        assert_eq!(kinds("<?php $a->b;")[2], TokenKind::Arrow);
    }

    #[test]
    fn string_literals_keep_raw_text() {
        let tokens = tokenize("<?php echo 'it\\'s';").expect("tokenize error");
        assert_eq!(tokens[2].kind, TokenKind::StringLit);
        assert_eq!(tokens[2].text, "'it\\'s'");
    }

    #[test]
    fn double_quoted_interpolation_is_rejected() {
        assert!(matches!(
            tokenize("<?php echo \"hello $name\";"),
            Err(TokenizerError::Interpolation { .. })
        ));
        assert!(matches!(
            tokenize("<?php echo \"hello {$name}\";"),
            Err(TokenizerError::Interpolation { .. })
        ));
    }

    #[test]
    fn escaped_dollar_is_allowed_in_double_quotes() {
        let tokens = tokenize("<?php echo \"price: \\$5\";").expect("tokenize error");
        assert_eq!(tokens[2].kind, TokenKind::StringLit);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(matches!(
            tokenize("<?php echo 'oops"),
            Err(TokenizerError::UnterminatedString { .. })
        ));
    }

    #[test]
    fn unterminated_comment_is_an_error() {
        assert!(matches!(
            tokenize("<?php /* oops"),
            Err(TokenizerError::UnterminatedComment { .. })
        ));
    }

    #[test]
    fn close_tag_ends_the_file() {
        assert_eq!(
            kinds("<?php echo 1; ?>\n"),
            vec![
                TokenKind::OpenTag,
                TokenKind::Identifier,
                TokenKind::Int,
                TokenKind::Semicolon,
                TokenKind::CloseTag,
            ]
        );
        assert!(matches!(
            tokenize("<?php ?> <b>html</b>"),
            Err(TokenizerError::TrailingContent { .. })
        ));
    }

    #[test]
    fn tracks_line_and_column() {
        let tokens = tokenize("<?php\n$a = 1;").expect("tokenize error");
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[1].col, 1);
        assert_eq!(tokens[2].line, 2);
        assert_eq!(tokens[2].col, 4);
    }

    #[test]
    fn floats_and_ints() {
        let tokens = tokenize("<?php 1.5 + 2;").expect("tokenize error");
        assert_eq!(tokens[1].kind, TokenKind::Float);
        assert_eq!(tokens[1].text, "1.5");
        assert_eq!(tokens[3].kind, TokenKind::Int);
    }

    #[test]
    fn bare_dollar_is_an_error() {
        assert!(matches!(
            tokenize("<?php $ = 1;"),
            Err(TokenizerError::BareDollar { .. })
        ));
    }
}
