//! SIP message framer (RFC 3261 §7, §25): splits a byte buffer into a
//! start-line, an unfolded header block, and a Content-Length-delimited
//! body, then builds a [`SipMessage`].

use crate::buffer::find_pattern;
use crate::error::{Error, Result};
use crate::parser::whitespace::unfold;
use crate::types::header::{HeaderName, Headers};
use crate::types::method::Method;
use crate::types::sip_message::{SipMessage, SipRequest, SipResponse};
use crate::types::status::StatusCode;
use crate::types::uri::Uri;

const SIP_VERSION: &str = "SIP/2.0";

/// Result of a successful frame: the parsed message and the number of bytes
/// of `buf` it consumed (start-line + headers + body).
pub struct Framed {
    pub message: SipMessage,
    pub consumed: usize,
}

/// Maps a header name to the `&'static str` the error taxonomy needs for
/// `DuplicateHeader`/`MissingHeader`; extension headers fall back to a
/// generic label since their text isn't `'static`.
fn static_name(name: &HeaderName) -> &'static str {
    match name {
        HeaderName::Via => "Via",
        HeaderName::From => "From",
        HeaderName::To => "To",
        HeaderName::CallId => "Call-ID",
        HeaderName::CSeq => "CSeq",
        HeaderName::Contact => "Contact",
        HeaderName::ContentLength => "Content-Length",
        HeaderName::ContentType => "Content-Type",
        HeaderName::MaxForwards => "Max-Forwards",
        HeaderName::Route => "Route",
        HeaderName::RecordRoute => "Record-Route",
        HeaderName::Authorization => "Authorization",
        HeaderName::WwwAuthenticate => "WWW-Authenticate",
        HeaderName::Require => "Require",
        HeaderName::ProxyRequire => "Proxy-Require",
        HeaderName::Geolocation => "Geolocation",
        HeaderName::GeolocationRouting => "Geolocation-Routing",
        HeaderName::GeolocationError => "Geolocation-Error",
        HeaderName::CallInfo => "Call-Info",
        HeaderName::Other(_) => "header",
    }
}

fn parse_header_block(block: &str) -> Result<Headers> {
    let mut headers = Headers::new();
    for line in block.split("\r\n") {
        if line.is_empty() {
            continue;
        }
        let (raw_name, raw_value) = line
            .split_once(':')
            .ok_or_else(|| Error::Parse(format!("malformed header line: {line}")))?;
        let name: HeaderName = raw_name.trim().parse()?;
        let value = raw_value.trim();
        if name.is_singleton() && headers.contains(&name) {
            return Err(Error::DuplicateHeader(static_name(&name)));
        }
        headers.push(name, value);
    }
    Ok(headers)
}

fn content_length(headers: &Headers) -> Result<Option<i64>> {
    match headers.get(&HeaderName::ContentLength) {
        None => Ok(None),
        Some(v) => {
            let n: i64 = v
                .trim()
                .parse()
                .map_err(|_| Error::Parse(format!("malformed Content-Length: {v}")))?;
            if n < 0 {
                return Err(Error::InvalidContentLength(n));
            }
            Ok(Some(n))
        }
    }
}

/// Frames and parses one SIP message out of `buf`. Returns
/// `Err(Error::Incomplete)` if the header block or body hasn't fully
/// arrived yet, so stream-oriented callers can buffer more bytes and retry.
pub fn parse_message(buf: &[u8]) -> Result<Framed> {
    let header_end = find_pattern(buf, 0, buf.len(), b"\r\n\r\n").ok_or(Error::Incomplete)?;
    let raw_header_block = std::str::from_utf8(&buf[..header_end])?;
    let unfolded = unfold(raw_header_block.as_bytes());
    let unfolded = std::str::from_utf8(&unfolded)?.to_string();

    let mut lines = unfolded.splitn(2, "\r\n");
    let start_line = lines.next().unwrap_or_default();
    let header_block = lines.next().unwrap_or_default();

    let headers = parse_header_block(header_block)?;
    let cl = content_length(&headers)?;
    let body_start = header_end + 4;

    let (body_end, consumed) = match cl {
        Some(n) => {
            let n = n as usize;
            if buf.len() - body_start < n {
                return Err(Error::Incomplete);
            }
            (body_start + n, body_start + n)
        }
        None => (buf.len(), buf.len()),
    };

    let body = bytes::Bytes::copy_from_slice(&buf[body_start..body_end]);

    let message = if let Some(rest) = start_line.strip_prefix(SIP_VERSION) {
        let rest = rest.trim_start();
        let (code_str, reason) = rest.split_once(' ').unwrap_or((rest, ""));
        let code: u16 = code_str
            .parse()
            .map_err(|_| Error::MalformedStartLine(start_line.to_string()))?;
        let status = StatusCode::new(code)?;
        SipMessage::Response(SipResponse {
            status,
            reason: reason.to_string(),
            headers,
            body,
        })
    } else {
        let mut parts = start_line.splitn(3, ' ');
        let method_str = parts
            .next()
            .ok_or_else(|| Error::MalformedStartLine(start_line.to_string()))?;
        let uri_str = parts
            .next()
            .ok_or_else(|| Error::MalformedStartLine(start_line.to_string()))?;
        let version = parts
            .next()
            .ok_or_else(|| Error::MalformedStartLine(start_line.to_string()))?;
        if version != SIP_VERSION {
            return Err(Error::InvalidVersion);
        }
        let method: Method = method_str.parse()?;
        let uri: Uri = uri_str.parse()?;
        SipMessage::Request(SipRequest { method, uri, headers, body })
    };

    Ok(Framed { message, consumed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_invite_request() {
        let raw = b"INVITE sip:bob@example.com SIP/2.0\r\nVia: SIP/2.0/UDP pc33.example.com;branch=z9hG4bK776a\r\nFrom: <sip:alice@example.com>;tag=1928301774\r\nTo: <sip:bob@example.com>\r\nCall-ID: a84b4c76e66710\r\nCSeq: 314159 INVITE\r\nMax-Forwards: 70\r\nContent-Length: 0\r\n\r\n";
        let framed = parse_message(raw).unwrap();
        assert_eq!(framed.consumed, raw.len());
        let req = framed.message.as_request().unwrap();
        assert_eq!(req.method, Method::Invite);
    }

    #[test]
    fn parses_response_with_body() {
        let raw = b"SIP/2.0 200 OK\r\nCSeq: 1 INVITE\r\nContent-Length: 5\r\n\r\nhello";
        let framed = parse_message(raw).unwrap();
        let resp = framed.message.as_response().unwrap();
        assert_eq!(resp.status.0, 200);
        assert_eq!(&resp.body[..], b"hello");
    }

    #[test]
    fn incomplete_body_requests_more_data() {
        let raw = b"SIP/2.0 200 OK\r\nContent-Length: 10\r\n\r\nhi";
        assert!(matches!(parse_message(raw), Err(Error::Incomplete)));
    }

    #[test]
    fn duplicate_singleton_header_is_rejected() {
        let raw = b"INVITE sip:bob@example.com SIP/2.0\r\nCall-ID: a\r\nCall-ID: b\r\n\r\n";
        assert!(matches!(parse_message(raw), Err(Error::DuplicateHeader("Call-ID"))));
    }

    #[test]
    fn unfolds_continuation_lines_before_header_parsing() {
        let raw = b"INVITE sip:bob@example.com SIP/2.0\r\nSubject: I know\r\n you hear\r\n me.\r\nContent-Length: 0\r\n\r\n";
        let framed = parse_message(raw).unwrap();
        let req = framed.message.as_request().unwrap();
        assert_eq!(
            req.headers.get(&HeaderName::Other("Subject".to_string())),
            Some("I know you hear me.")
        );
    }

    #[test]
    fn cseq_method_mismatch_is_not_a_framer_error() {
        // RFC 4475 3.1.2.17 (mismatch01.dat): CSeq/method disagreement is
        // caught by the request validator, not the framer.
        let raw = b"REGISTER sip:example.com SIP/2.0\r\nCSeq: 1 INVITE\r\nContent-Length: 0\r\n\r\n";
        let framed = parse_message(raw).unwrap();
        let req = framed.message.as_request().unwrap();
        assert_eq!(req.cseq(), Some((1, Method::Invite)));
        assert_ne!(req.cseq().map(|(_, m)| m), Some(req.method.clone()));
    }
}
