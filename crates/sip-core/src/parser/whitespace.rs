//! RFC 3261 §25.1 whitespace grammar primitives, operating over raw bytes
//! since these run during message framing before any UTF-8 decoding.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::{opt, recognize};
use nom::multi::{many0, many1};
use nom::sequence::pair;
use nom::IResult;

pub type ParseResult<'a, O> = IResult<&'a [u8], O>;

/// A single SP or HTAB.
pub fn wsp(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(alt((tag(b" "), tag(b"\t"))))(input)
}

/// Zero or more SP/HTAB.
pub fn owsp(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(many0(wsp))(input)
}

/// CRLF. Under the `lenient_parsing` feature a bare LF is tolerated too,
/// as RFC 4475 torture inputs sometimes use one to probe line-ending
/// handling; the strict grammar requires the full sequence.
#[cfg(not(feature = "lenient_parsing"))]
pub fn crlf(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tag(b"\r\n"))(input)
}

#[cfg(feature = "lenient_parsing")]
pub fn crlf(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(alt((tag(b"\r\n"), tag(b"\n"))))(input)
}

/// Linear white space: `[*WSP CRLF] 1*WSP`, i.e. plain whitespace or a
/// folded continuation line.
pub fn lws(input: &[u8]) -> ParseResult<&[u8]> {
    alt((
        recognize(pair(pair(owsp, crlf), many1(wsp))),
        recognize(many1(wsp)),
    ))(input)
}

/// Optional linear white space: `[LWS]`.
pub fn sws(input: &[u8]) -> ParseResult<&[u8]> {
    opt(lws)(input).map(|(rem, val)| (rem, val.unwrap_or(&[])))
}

/// Unfolds header continuation lines (CRLF followed by SP/HTAB) into a
/// single space, the way a framer must before field-level parsing.
pub fn unfold(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i..].starts_with(b"\r\n") && i + 2 < input.len() && matches!(input[i + 2], b' ' | b'\t')
        {
            out.push(b' ');
            i += 2;
            while i < input.len() && matches!(input[i], b' ' | b'\t') {
                i += 1;
            }
        } else if input[i..].starts_with(b"\n") && i + 1 < input.len() && matches!(input[i + 1], b' ' | b'\t') {
            out.push(b' ');
            i += 1;
            while i < input.len() && matches!(input[i], b' ' | b'\t') {
                i += 1;
            }
        } else {
            out.push(input[i]);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wsp_matches_space_and_tab() {
        assert_eq!(wsp(b" x").unwrap().1, b" ");
        assert_eq!(wsp(b"\tx").unwrap().1, b"\t");
        assert!(wsp(b"x").is_err());
    }

    #[test]
    fn lws_handles_folding() {
        let (rem, val) = lws(b"\r\n  rest").unwrap();
        assert_eq!(rem, b"rest");
        assert_eq!(val, b"\r\n  ");
    }

    #[test]
    fn unfold_collapses_folded_header() {
        let folded = b"Subject: Lunch\r\n Meeting\r\n\r\n";
        let unfolded = unfold(folded);
        assert_eq!(unfolded, b"Subject: Lunch Meeting\r\n\r\n");
    }
}
