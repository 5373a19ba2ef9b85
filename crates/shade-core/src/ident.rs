//! Identifier validation for generated names.

/// Returns true if `name` is a valid PHP identifier.
///
/// PHP identifiers match `[a-zA-Z_\x80-\xff][a-zA-Z0-9_\x80-\xff]*`; this
/// check restricts itself to the ASCII subset, which is all the scrambler
/// ever emits.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_identifiers() {
        assert!(is_valid_identifier("foo"));
        assert!(is_valid_identifier("_bar"));
        assert!(is_valid_identifier("s0a1b2c3d4"));
    }

    #[test]
    fn rejects_invalid_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("0foo"));
        assert!(!is_valid_identifier("foo-bar"));
        assert!(!is_valid_identifier("foo bar"));
    }
}
