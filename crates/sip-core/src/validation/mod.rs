//! Request validation (§4.3): the framer accepts anything well-formed per
//! the grammar; this module checks the semantic preconditions a request
//! must satisfy before it is acted on. Violations surface as
//! [`Error::Validation`], distinct from the framer's parse errors.

use crate::error::{Error, Result};
use crate::types::header::HeaderName;
use crate::types::method::Method;
use crate::types::sip_message::{parse_cseq, SipRequest};
use crate::types::uri::Scheme;

/// Schemes this core accepts as a Request-URI target.
fn is_known_request_uri_scheme(scheme: Scheme) -> bool {
    matches!(scheme, Scheme::Sip | Scheme::Sips | Scheme::Tel | Scheme::Im | Scheme::Pres)
}

/// Validates a request against RFC 3261's mandatory-header and
/// CSeq/method-agreement rules.
///
/// Checks, in order: Request-URI scheme is recognized, at least one Via is
/// present, From/To/Call-ID/CSeq/Max-Forwards are present, and the CSeq
/// header's method matches the request line's method (RFC 4475 3.1.2.17).
pub fn validate_request(request: &SipRequest) -> Result<()> {
    if !is_known_request_uri_scheme(request.uri.scheme) {
        return Err(Error::Validation(format!(
            "unsupported Request-URI scheme: {}",
            request.uri.scheme
        )));
    }

    if !request.headers.contains(&HeaderName::Via) {
        return Err(Error::Validation("missing Via header".into()));
    }

    for (name, label) in [
        (HeaderName::From, "From"),
        (HeaderName::To, "To"),
        (HeaderName::CallId, "Call-ID"),
        (HeaderName::CSeq, "CSeq"),
        (HeaderName::MaxForwards, "Max-Forwards"),
    ] {
        if !request.headers.contains(&name) {
            return Err(Error::Validation(format!("missing {label} header")));
        }
    }

    let cseq_value = request.headers.get(&HeaderName::CSeq).unwrap();
    let (_, cseq_method) = parse_cseq(cseq_value)
        .ok_or_else(|| Error::Validation(format!("malformed CSeq: {cseq_value}")))?;
    if cseq_method != request.method {
        return Err(Error::Validation(format!(
            "CSeq method {cseq_method} does not match request method {}",
            request.method
        )));
    }

    Ok(())
}

/// Used by callers that need to know whether a method is well-formed
/// before even attempting full request validation (e.g. the MSRP bridge
/// rejecting methods outside the MESSAGE/SUBSCRIBE family early).
pub fn is_extension_method(method: &Method) -> bool {
    matches!(method, Method::Extension(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::uri::{Host, Uri};

    fn base_request(method: Method, cseq_method: Method) -> SipRequest {
        let uri = Uri::new(Scheme::Sip, Host::domain("example.com"));
        SipRequest::new(method, uri)
            .with_header(HeaderName::Via, "SIP/2.0/UDP pc33.example.com;branch=z9hG4bK1")
            .with_header(HeaderName::From, "<sip:alice@example.com>;tag=1")
            .with_header(HeaderName::To, "<sip:bob@example.com>")
            .with_header(HeaderName::CallId, "abc123@example.com")
            .with_header(HeaderName::CSeq, format!("1 {cseq_method}"))
            .with_header(HeaderName::MaxForwards, "70")
    }

    #[test]
    fn well_formed_request_validates() {
        let req = base_request(Method::Invite, Method::Invite);
        assert!(validate_request(&req).is_ok());
    }

    #[test]
    fn cseq_method_mismatch_is_rejected() {
        // RFC 4475 3.1.2.17 (mismatch01.dat).
        let req = base_request(Method::Register, Method::Invite);
        assert!(matches!(validate_request(&req), Err(Error::Validation(_))));
    }

    #[test]
    fn missing_via_is_rejected() {
        let uri = Uri::new(Scheme::Sip, Host::domain("example.com"));
        let req = SipRequest::new(Method::Invite, uri)
            .with_header(HeaderName::From, "<sip:alice@example.com>;tag=1")
            .with_header(HeaderName::To, "<sip:bob@example.com>")
            .with_header(HeaderName::CallId, "abc123@example.com")
            .with_header(HeaderName::CSeq, "1 INVITE")
            .with_header(HeaderName::MaxForwards, "70");
        assert!(matches!(validate_request(&req), Err(Error::Validation(_))));
    }

    #[test]
    fn unknown_well_formed_method_validates() {
        // RFC 4475 3.1.1.2 (intmeth.dat): an unrecognized-but-well-formed
        // method must validate, not be rejected at this layer.
        let req = base_request(
            Method::Extension("PUBLISHXYZ".to_string()),
            Method::Extension("PUBLISHXYZ".to_string()),
        );
        assert!(validate_request(&req).is_ok());
    }
}
