//! MSRP message model (§3.4): the typed request/response shapes the codec
//! encodes and decodes, and the wire-level enums they carry.

use std::fmt;
use std::str::FromStr;

use ng911_sip_core::Uri;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// MSRP request method. RFC 4975 names three; anything else is carried as
/// an extension so an unrecognized-but-well-formed request still decodes
/// (the connection layer is the one that responds 501 to it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MsrpMethod {
    Send,
    Report,
    Nickname,
    Extension(String),
}

impl MsrpMethod {
    pub fn as_str(&self) -> &str {
        match self {
            MsrpMethod::Send => "SEND",
            MsrpMethod::Report => "REPORT",
            MsrpMethod::Nickname => "NICKNAME",
            MsrpMethod::Extension(s) => s,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, MsrpMethod::Extension(_))
    }
}

impl fmt::Display for MsrpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MsrpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "SEND" => MsrpMethod::Send,
            "REPORT" => MsrpMethod::Report,
            "NICKNAME" => MsrpMethod::Nickname,
            other => MsrpMethod::Extension(other.to_string()),
        })
    }
}

/// Trailing completion flag on a transaction's end-line (§3.4, §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Complete,
    Continuation,
    Truncated,
    Unknown,
}

impl CompletionStatus {
    pub fn flag(&self) -> u8 {
        match self {
            CompletionStatus::Complete => b'$',
            CompletionStatus::Continuation => b'+',
            CompletionStatus::Truncated => b'#',
            CompletionStatus::Unknown => b'$',
        }
    }

    pub fn from_flag(flag: u8) -> Self {
        match flag {
            b'$' => CompletionStatus::Complete,
            b'+' => CompletionStatus::Continuation,
            b'#' => CompletionStatus::Truncated,
            _ => CompletionStatus::Unknown,
        }
    }
}

/// `Byte-Range: start-end/total`, 1-based inclusive. `end`/`total` of
/// `None` serialize as the literal `*` (§8 boundary behavior).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
    pub total: Option<u64>,
}

impl ByteRange {
    pub fn new(start: u64, end: u64, total: u64) -> Self {
        ByteRange { start, end: Some(end), total: Some(total) }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.end.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string());
        let total = self.total.map(|v| v.to_string()).unwrap_or_else(|| "*".to_string());
        write!(f, "{}-{}/{}", self.start, end, total)
    }
}

impl FromStr for ByteRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (range, total) = s
            .split_once('/')
            .ok_or_else(|| Error::Parse(format!("malformed Byte-Range: {s}")))?;
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| Error::Parse(format!("malformed Byte-Range: {s}")))?;
        let start = start
            .parse()
            .map_err(|_| Error::Parse(format!("malformed Byte-Range start: {s}")))?;
        let end = if end == "*" {
            None
        } else {
            Some(end.parse().map_err(|_| Error::Parse(format!("malformed Byte-Range end: {s}")))?)
        };
        let total = if total == "*" {
            None
        } else {
            Some(
                total
                    .parse()
                    .map_err(|_| Error::Parse(format!("malformed Byte-Range total: {s}")))?,
            )
        };
        Ok(ByteRange { start, end, total })
    }
}

/// One MSRP request (SEND/REPORT/NICKNAME or an unrecognized extension).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsrpRequest {
    pub txn_id: String,
    pub method: MsrpMethod,
    pub to_path: Vec<Uri>,
    pub from_path: Vec<Uri>,
    pub message_id: Option<String>,
    pub content_type: Option<String>,
    pub byte_range: Option<ByteRange>,
    pub success_report: Option<bool>,
    pub failure_report: Option<bool>,
    pub status: Option<String>,
    /// Unrecognized header lines, preserved verbatim in arrival order
    /// (§4.6 "tolerates unknown headers").
    pub extra_headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub completion: CompletionStatus,
}

impl MsrpRequest {
    pub fn new(txn_id: impl Into<String>, method: MsrpMethod) -> Self {
        MsrpRequest {
            txn_id: txn_id.into(),
            method,
            to_path: Vec::new(),
            from_path: Vec::new(),
            message_id: None,
            content_type: None,
            byte_range: None,
            success_report: None,
            failure_report: None,
            status: None,
            extra_headers: Vec::new(),
            body: Vec::new(),
            completion: CompletionStatus::Complete,
        }
    }
}

/// One MSRP response: transaction-id, status code, optional reason (§3.4).
/// Responses may echo To-Path/From-Path per RFC 4975 §7.2; carried here so
/// the codec round-trips a full response, not just the bare triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MsrpResponse {
    pub txn_id: String,
    pub code: u16,
    pub reason: Option<String>,
    pub to_path: Vec<Uri>,
    pub from_path: Vec<Uri>,
    pub extra_headers: Vec<(String, String)>,
    pub completion: CompletionStatus,
}

impl MsrpResponse {
    pub fn new(txn_id: impl Into<String>, code: u16, reason: Option<String>) -> Self {
        MsrpResponse {
            txn_id: txn_id.into(),
            code,
            reason,
            to_path: Vec::new(),
            from_path: Vec::new(),
            extra_headers: Vec::new(),
            completion: CompletionStatus::Complete,
        }
    }
}

/// A decoded transaction is either a request or a response; the framer
/// hands the codec a complete byte buffer and the codec decides which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MsrpTransaction {
    Request(MsrpRequest),
    Response(MsrpResponse),
}

impl MsrpTransaction {
    pub fn txn_id(&self) -> &str {
        match self {
            MsrpTransaction::Request(r) => &r.txn_id,
            MsrpTransaction::Response(r) => &r.txn_id,
        }
    }
}

/// Transport MUST be `tcp` for `msrp` and `tls` for `msrps` (§3.5). The
/// transport token is a bare flag parameter (`;tcp`), not a `key=value`
/// pair, per RFC 4975's `transp-param` grammar.
pub fn validate_msrp_uri(uri: &Uri) -> Result<()> {
    use ng911_sip_core::Scheme;
    use ng911_sip_core::types::Param;
    let expected = match uri.scheme {
        Scheme::Msrp => "tcp",
        Scheme::Msrps => "tls",
        other => return Err(Error::InvalidUri(format!("not an MSRP scheme: {other}"))),
    };
    let has_flag = uri
        .parameters
        .iter()
        .any(|p| matches!(p, Param::Flag(f) if f.eq_ignore_ascii_case(expected)));
    if has_flag {
        Ok(())
    } else {
        Err(Error::InvalidUri(format!("missing `;{expected}` transport flag")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_range_round_trips_with_wildcards() {
        let br: ByteRange = "4097-5000/5000".parse().unwrap();
        assert_eq!(br.to_string(), "4097-5000/5000");

        let wildcard: ByteRange = "1-*/*".parse().unwrap();
        assert_eq!(wildcard.end, None);
        assert_eq!(wildcard.total, None);
        assert_eq!(wildcard.to_string(), "1-*/*");
    }

    #[test]
    fn completion_flag_round_trips() {
        assert_eq!(CompletionStatus::from_flag(b'+'), CompletionStatus::Continuation);
        assert_eq!(CompletionStatus::Continuation.flag(), b'+');
    }

    #[test]
    fn msrp_uri_requires_matching_transport() {
        let uri: Uri = "msrp://host:2855/sess;tcp".parse().unwrap();
        assert!(validate_msrp_uri(&uri).is_ok());

        let bad: Uri = "msrp://host:2855/sess;tls".parse().unwrap();
        assert!(validate_msrp_uri(&bad).is_err());
    }
}
