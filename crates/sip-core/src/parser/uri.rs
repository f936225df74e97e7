//! URI grammar (RFC 3261 §19.1, RFC 3966 tel URIs, RFC 4975 MSRP URIs).
//!
//! Runs over `&str` rather than `&[u8]`: by the time a URI reaches this
//! parser it has already been extracted from unfolded, validated-UTF-8
//! header text, so the ergonomics of `&str` combinators outweigh the
//! byte-level caution needed at the message-framing layer.

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, digit1};
use nom::combinator::{map, map_res, opt, recognize};
use nom::multi::{many0, separated_list0};
use nom::sequence::{pair, preceded, separated_pair, tuple};
use nom::IResult;

use crate::types::param::Param;
use crate::types::uri::{normalize_tel_digits, Host, Scheme, Uri};

fn is_scheme_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.'
}

fn scheme(input: &str) -> IResult<&str, Scheme> {
    map_res(take_while1(is_scheme_char), |s: &str| s.parse::<Scheme>())(input)
}

fn is_user_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-_.!~*'()&=+$,;?/%".contains(c)
}

fn user_part(input: &str) -> IResult<&str, &str> {
    take_while1(is_user_char)(input)
}

fn ipv6_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((char('['), take_while1(|c: char| c != ']'), char(']'))))(input)
}

fn is_domain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_'
}

fn host(input: &str) -> IResult<&str, Host> {
    alt((
        map(ipv6_literal, |s: &str| {
            Host::Ipv6Literal(s.to_string())
        }),
        map(char('*'), |_| Host::Wildcard),
        map_res(take_while1(is_domain_char), |s: &str| s.parse::<Host>()),
    ))(input)
}

fn port(input: &str) -> IResult<&str, u16> {
    map_res(digit1, |s: &str| s.parse::<u16>())(input)
}

fn param_name(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || "-_.!~*'()".contains(c))(input)
}

fn param_value(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c != ';' && c != '?' && c != '&')(input)
}

fn one_param(input: &str) -> IResult<&str, Param> {
    map(
        pair(param_name, opt(preceded(char('='), param_value))),
        |(name, value)| Param::parse_one(name, value),
    )(input)
}

fn uri_parameters(input: &str) -> IResult<&str, Vec<Param>> {
    many0(preceded(char(';'), one_param))(input)
}

fn header_pair(input: &str) -> IResult<&str, (String, String)> {
    map(
        separated_pair(
            take_while1(|c: char| c != '=' && c != '&'),
            char('='),
            take_while(|c: char| c != '&'),
        ),
        |(k, v): (&str, &str)| (k.to_string(), v.to_string()),
    )(input)
}

fn uri_headers(input: &str) -> IResult<&str, Vec<(String, String)>> {
    preceded(char('?'), separated_list0(char('&'), header_pair))(input)
}

/// Parses a full URI; `tel:` receives special-cased digit normalization
/// per §4.2 and a `+1NNNN...` `sip:`/`sips:` user is split from its host.
pub fn parse_uri(input: &str) -> IResult<&str, Uri> {
    let (rest, sch) = scheme(input)?;
    let (rest, _) = char(':')(rest)?;

    if sch == Scheme::Tel {
        let (rest, digits) = take_while1(|c: char| c != ';')(rest)?;
        let (rest, params) = uri_parameters(rest)?;
        let mut uri = Uri::new(Scheme::Tel, Host::Wildcard);
        uri.user = Some(normalize_tel_digits(digits));
        uri.parameters = params;
        return Ok((rest, uri));
    }

    // `urn:`/`cid:` are opaque colon-delimited identifiers (RFC 8141,
    // RFC 2392), not authority-based — the NENA i3 `urn:emergency:uid:...`
    // Call-Info form has no single "host" to extract. Take everything up
    // to `;params` verbatim.
    if sch == Scheme::Urn || sch == Scheme::Cid {
        let (rest, opaque) = take_while1(|c: char| c != ';')(rest)?;
        let (rest, params) = uri_parameters(rest)?;
        let mut uri = Uri::new(sch, Host::None);
        uri.path = Some(opaque.to_string());
        uri.parameters = params;
        return Ok((rest, uri));
    }

    let (rest, _) = opt(tag("//"))(rest)?;
    let (rest, user) = opt(pair(user_part, char('@')))(rest)?;
    let (rest, host_val) = host(rest)?;
    let (rest, port_val) = opt(preceded(char(':'), port))(rest)?;
    let (rest, path_val) = opt(preceded(char('/'), take_while(|c: char| c != ';' && c != '?')))(rest)?;
    let (rest, params) = uri_parameters(rest)?;
    let (rest, headers) = opt(uri_headers)(rest)?;

    let mut uri = Uri::new(sch, host_val);
    uri.user = user.map(|(u, _)| u.to_string());
    uri.port = port_val;
    uri.path = path_val.map(str::to_string);
    uri.parameters = params;
    uri.headers = headers.unwrap_or_default();

    // `sip:+1NNNN...@host` notation is not what this represents; instead a
    // bare `sip:+1NNNN...` (no '@', host is itself the E.164 literal) moves
    // the digits into `user` and leaves the literal as host, per §4.2.
    if uri.user.is_none() {
        if let Host::Domain(ref d) = uri.host {
            if d.starts_with('+') && d[1..].chars().all(|c| c.is_ascii_digit()) {
                uri.user = Some(d[1..].to_string());
            }
        }
    }

    Ok((rest, uri))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_sip_uri() {
        let (rest, uri) = parse_uri("sip:alice@example.com:5060;transport=tcp").unwrap();
        assert_eq!(rest, "");
        assert_eq!(uri.user.as_deref(), Some("alice"));
        assert_eq!(uri.port, Some(5060));
        assert_eq!(uri.transport(), Some("tcp"));
    }

    #[test]
    fn parses_tel_uri_with_dashes_and_spaces() {
        let (_, uri) = parse_uri("tel:+1 818-555-3333").unwrap();
        assert_eq!(uri.scheme, Scheme::Tel);
        assert_eq!(uri.user.as_deref(), Some("+18185553333"));
    }

    #[test]
    fn parses_msrp_uri() {
        let (_, uri) = parse_uri("msrp://host:2855/session-id;tcp").unwrap();
        assert_eq!(uri.scheme, Scheme::Msrp);
    }

    #[test]
    fn wildcard_uri_has_no_user() {
        let (_, uri) = parse_uri("sip:*").unwrap();
        assert_eq!(uri.host, Host::Wildcard);
    }

    #[test]
    fn parses_opaque_urn_uri() {
        let (rest, uri) = parse_uri("urn:emergency:uid:callid:abc123").unwrap();
        assert_eq!(rest, "");
        assert_eq!(uri.scheme, Scheme::Urn);
        assert_eq!(uri.host, Host::None);
        assert_eq!(uri.path.as_deref(), Some("emergency:uid:callid:abc123"));
        assert_eq!(uri.to_string(), "urn:emergency:uid:callid:abc123");
    }

    #[test]
    fn parses_opaque_cid_uri() {
        let (_, uri) = parse_uri("cid:target123@example.com").unwrap();
        assert_eq!(uri.scheme, Scheme::Cid);
        assert_eq!(uri.to_string(), "cid:target123@example.com");
    }
}
