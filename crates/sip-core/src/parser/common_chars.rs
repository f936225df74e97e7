//! Character classes shared across the SIP/SDP grammar (RFC 3261 §25.1).

pub fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

pub fn is_alphanum(c: u8) -> bool {
    c.is_ascii_alphanumeric()
}

/// `unreserved = alphanum / mark`, `mark = "-" / "_" / "." / "!" / "~" / "*" / "'" / "(" / ")"`
pub fn is_unreserved(c: u8) -> bool {
    is_alphanum(c) || matches!(c, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

/// `token = 1*(alphanum / "-" / "." / "!" / "%" / "*" / "_" / "+" / "`" / "'" / "~")`
pub fn is_token_char(c: u8) -> bool {
    is_alphanum(c)
        || matches!(
            c,
            b'-' | b'.' | b'!' | b'%' | b'*' | b'_' | b'+' | b'`' | b'\'' | b'~'
        )
}

/// Characters valid unescaped inside a URI user part, beyond `unreserved`.
pub fn is_user_unreserved(c: u8) -> bool {
    matches!(c, b'&' | b'=' | b'+' | b'$' | b',' | b';' | b'?' | b'/')
}

pub fn is_hex_digit(c: u8) -> bool {
    c.is_ascii_hexdigit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_chars_match_rfc_grammar() {
        assert!(is_token_char(b'a'));
        assert!(is_token_char(b'-'));
        assert!(!is_token_char(b' '));
        assert!(!is_token_char(b'@'));
    }

    #[test]
    fn unreserved_includes_marks() {
        assert!(is_unreserved(b'~'));
        assert!(is_unreserved(b'9'));
        assert!(!is_unreserved(b'@'));
    }
}
