//! Token-level whitespace and comment stripping.
//!
//! Re-emits a file's token stream with comments dropped and every run of
//! inter-token whitespace collapsed to a single space, like PHP's
//! `php_strip_whitespace`. The token texts themselves are untouched, so
//! string literals keep their exact contents.

use crate::tokenizer::{tokenize, TokenizerResult};

/// Strip comments and insignificant whitespace from PHP source.
///
/// # Errors
///
/// Fails if the source does not tokenize.
///
/// # Example
///
/// ```
/// use shade_cst::strip_whitespace;
///
/// let source = "<?php\n// add\necho 1 +   2;\n";
/// assert_eq!(strip_whitespace(source).expect("strip error"), "<?php echo 1 + 2;");
/// ```
pub fn strip_whitespace(source: &str) -> TokenizerResult<String> {
    let tokens = tokenize(source)?;
    let mut out = String::with_capacity(source.len());
    for token in &tokens {
        if !out.is_empty() && token.preceded_by_trivia {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(
            strip_whitespace("<?php\n\n    echo   1;\n").expect("strip error"),
            "<?php echo 1;"
        );
    }

    #[test]
    fn drops_comments() {
        let source = "<?php /* header */ echo 1; // done";
        assert_eq!(strip_whitespace(source).expect("strip error"), "<?php echo 1;");
    }

    #[test]
    fn keeps_string_contents_verbatim() {
        let source = "<?php echo 'a  //  b';";
        assert_eq!(
            strip_whitespace(source).expect("strip error"),
            "<?php echo 'a  //  b';"
        );
    }

    #[test]
    fn adjacent_tokens_stay_adjacent() {
        assert_eq!(
            strip_whitespace("<?php $a->b();").expect("strip error"),
            "<?php $a->b();"
        );
    }

    #[test]
    fn stripped_output_still_parses() {
        let source = "<?php\nclass Foo {\n    // counter\n    private $count = 0;\n}\n";
        let stripped = strip_whitespace(source).expect("strip error");
        assert!(crate::parser::parse_program(&stripped).is_ok());
    }
}
