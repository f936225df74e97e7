//! SIP request and response messages (RFC 3261 §7).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::types::header::{HeaderName, Headers};
use crate::types::method::Method;
use crate::types::status::StatusCode;
use crate::types::uri::Uri;

/// A SIP request: request-line (method, Request-URI, version) plus headers
/// and an optional body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: Headers,
    pub body: Bytes,
}

impl SipRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        SipRequest {
            method,
            uri,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn cseq(&self) -> Option<(u32, Method)> {
        parse_cseq(self.headers.get(&HeaderName::CSeq)?)
    }
}

/// A SIP response: status-line (version, status-code, reason phrase) plus
/// headers and an optional body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipResponse {
    pub status: StatusCode,
    pub reason: String,
    pub headers: Headers,
    pub body: Bytes,
}

impl SipResponse {
    pub fn new(status: StatusCode) -> Self {
        let reason = status.default_reason().to_string();
        SipResponse {
            status,
            reason,
            headers: Headers::new(),
            body: Bytes::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }
}

/// Either side of the request/response split, for code that needs to treat
/// both uniformly (e.g. a framer returning whatever it parsed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SipMessage {
    Request(SipRequest),
    Response(SipResponse),
}

impl SipMessage {
    pub fn headers(&self) -> &Headers {
        match self {
            SipMessage::Request(r) => &r.headers,
            SipMessage::Response(r) => &r.headers,
        }
    }

    pub fn body(&self) -> &Bytes {
        match self {
            SipMessage::Request(r) => &r.body,
            SipMessage::Response(r) => &r.body,
        }
    }

    pub fn as_request(&self) -> Option<&SipRequest> {
        match self {
            SipMessage::Request(r) => Some(r),
            SipMessage::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&SipResponse> {
        match self {
            SipMessage::Response(r) => Some(r),
            SipMessage::Request(_) => None,
        }
    }
}

/// Parses a `CSeq` header value (`"<number> <METHOD>"`) into its parts.
pub fn parse_cseq(value: &str) -> Option<(u32, Method)> {
    let mut parts = value.split_whitespace();
    let number = parts.next()?.parse().ok()?;
    let method = parts.next()?.parse().ok()?;
    Some((number, method))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::uri::{Host, Scheme};

    #[test]
    fn request_round_trips_cseq() {
        let uri = Uri::new(Scheme::Sip, Host::domain("example.com"));
        let req = SipRequest::new(Method::Invite, uri).with_header(HeaderName::CSeq, "314159 INVITE");
        assert_eq!(req.cseq(), Some((314159, Method::Invite)));
    }

    #[test]
    fn response_default_reason_matches_status() {
        let resp = SipResponse::new(StatusCode::new(200).unwrap());
        assert_eq!(resp.reason, "OK");
    }
}
