//! SIP header names and the generic header container.
//!
//! Headers are stored as `(HeaderName, raw value string)` pairs in insertion
//! order; typed accessors on [`Headers`] parse the raw value on demand. This
//! keeps unknown/extension headers round-trip-safe without needing a
//! per-header-type enum for every RFC 3261 header, only the ones §3.2 names
//! as essential to NG9-1-1 message handling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A SIP header name, case-insensitively matched and with RFC 3261 §7.3.3
/// compact forms recognized on parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeaderName {
    Via,
    From,
    To,
    CallId,
    CSeq,
    Contact,
    ContentLength,
    ContentType,
    MaxForwards,
    Route,
    RecordRoute,
    Authorization,
    WwwAuthenticate,
    Require,
    ProxyRequire,
    Geolocation,
    GeolocationRouting,
    GeolocationError,
    CallInfo,
    Other(String),
}

impl HeaderName {
    pub fn as_str(&self) -> &str {
        match self {
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
            HeaderName::Other(s) => s,
        }
    }

    /// Singleton headers (RFC 3261 §7.3.1 table) may appear at most once;
    /// a second occurrence is a framer-level error (§4.2 duplicate
    /// singleton header), not a silent overwrite.
    pub fn is_singleton(&self) -> bool {
        matches!(
            self,
            HeaderName::To
                | HeaderName::From
                | HeaderName::CallId
                | HeaderName::CSeq
                | HeaderName::ContentLength
                | HeaderName::ContentType
                | HeaderName::MaxForwards
                | HeaderName::GeolocationRouting
        )
    }
}

impl fmt::Display for HeaderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeaderName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::Parse("empty header name".into()));
        }
        Ok(match s.to_ascii_lowercase().as_str() {
            "via" | "v" => HeaderName::Via,
            "from" | "f" => HeaderName::From,
            "to" | "t" => HeaderName::To,
            "call-id" | "i" => HeaderName::CallId,
            "cseq" => HeaderName::CSeq,
            "contact" | "m" => HeaderName::Contact,
            "content-length" | "l" => HeaderName::ContentLength,
            "content-type" | "c" => HeaderName::ContentType,
            "max-forwards" => HeaderName::MaxForwards,
            "route" => HeaderName::Route,
            "record-route" => HeaderName::RecordRoute,
            "authorization" => HeaderName::Authorization,
            "www-authenticate" => HeaderName::WwwAuthenticate,
            "require" => HeaderName::Require,
            "proxy-require" => HeaderName::ProxyRequire,
            "geolocation" => HeaderName::Geolocation,
            "geolocation-routing" => HeaderName::GeolocationRouting,
            "geolocation-error" => HeaderName::GeolocationError,
            "call-info" => HeaderName::CallInfo,
            _ => HeaderName::Other(s.to_string()),
        })
    }
}

/// One header field: a name and its raw (unfolded, trimmed) value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: HeaderName,
    pub value: String,
}

impl Header {
    pub fn new(name: HeaderName, value: impl Into<String>) -> Self {
        Header { name, value: value.into() }
    }
}

/// An ordered, insertion-preserving multimap of header fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headers(Vec<Header>);

impl Headers {
    pub fn new() -> Self {
        Headers(Vec::new())
    }

    pub fn push(&mut self, name: HeaderName, value: impl Into<String>) {
        self.0.push(Header::new(name, value));
    }

    pub fn get(&self, name: &HeaderName) -> Option<&str> {
        self.0.iter().find(|h| &h.name == name).map(|h| h.value.as_str())
    }

    pub fn get_all<'a>(&'a self, name: &'a HeaderName) -> impl Iterator<Item = &'a str> {
        self.0.iter().filter(move |h| &h.name == name).map(|h| h.value.as_str())
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.0.iter().any(|h| &h.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Splits a comma-joined multi-value header (e.g. `Require`,
    /// `Proxy-Require`) into its option-tags. An absent header yields an
    /// empty `Vec`, not an error, per §9 Open Question resolution.
    pub fn comma_list(&self, name: &HeaderName) -> Vec<String> {
        self.get(name)
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_forms_resolve_to_canonical_names() {
        assert_eq!("v".parse::<HeaderName>().unwrap(), HeaderName::Via);
        assert_eq!("f".parse::<HeaderName>().unwrap(), HeaderName::From);
        assert_eq!("l".parse::<HeaderName>().unwrap(), HeaderName::ContentLength);
    }

    #[test]
    fn unknown_header_is_other() {
        let name: HeaderName = "X-Custom".parse().unwrap();
        assert_eq!(name, HeaderName::Other("X-Custom".to_string()));
    }

    #[test]
    fn empty_require_is_empty_list_not_error() {
        let headers = Headers::new();
        assert_eq!(headers.comma_list(&HeaderName::Require), Vec::<String>::new());
    }

    #[test]
    fn comma_list_splits_and_trims() {
        let mut headers = Headers::new();
        headers.push(HeaderName::Require, "100rel, timer");
        assert_eq!(
            headers.comma_list(&HeaderName::Require),
            vec!["100rel".to_string(), "timer".to_string()]
        );
    }
}
