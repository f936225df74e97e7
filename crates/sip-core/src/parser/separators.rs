//! RFC 3261 §25.1 separator tokens, SWS-wrapped per the grammar.

use nom::bytes::complete::tag;
use nom::combinator::recognize;
use nom::sequence::{pair, tuple};
use nom::IResult;

use super::whitespace::sws;

pub type ParseResult<'a, O> = IResult<&'a [u8], O>;

pub fn hcolon(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((super::whitespace::owsp, tag(b":"), sws)))(input)
}

pub fn star(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(b"*"), sws)))(input)
}

pub fn slash(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(b"/"), sws)))(input)
}

pub fn equal(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(b"="), sws)))(input)
}

pub fn laquot(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(pair(sws, tag(b"<")))(input)
}

pub fn raquot(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(pair(tag(b">"), sws))(input)
}

pub fn comma(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(b","), sws)))(input)
}

pub fn semi(input: &[u8]) -> ParseResult<&[u8]> {
    recognize(tuple((sws, tag(b";"), sws)))(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hcolon_allows_leading_space_and_trailing_sws() {
        let (rem, val) = hcolon(b"  : rest").unwrap();
        assert_eq!(rem, b"rest");
        assert_eq!(val, b"  : ");
    }

    #[test]
    fn laquot_raquot_wrap_angle_brackets() {
        let (rem, val) = laquot(b" <sip:a@b>").unwrap();
        assert_eq!(rem, b"sip:a@b>");
        assert_eq!(val, b" <");
        let (rem, val) = raquot(b">rest").unwrap();
        assert_eq!(rem, b"rest");
        assert_eq!(val, b">");
    }

    #[test]
    fn semi_wraps_with_sws() {
        let (rem, val) = semi(b" ; rest").unwrap();
        assert_eq!(rem, b"rest");
        assert_eq!(val, b" ; ");
    }
}
