//! Geolocation header support (RFC 6442) — ambient supplement for NG9-1-1
//! call routing, which depends on location conveyed in SIP signaling.
//!
//! This core does not resolve `cid:`/`http(s):` references or validate the
//! PIDF-LO documents they point at; it only parses/serializes the header
//! values faithfully so a higher NG9-1-1 layer can perform resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::uri::{Scheme, Uri};

/// A single `Geolocation` header value: either a by-reference `cid:` URL
/// pointing at a multipart body part, or a by-value `sip:`/`http(s):`
/// dereference target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeolocationRef {
    ByCid(String),
    ByUri(Uri),
}

impl fmt::Display for GeolocationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeolocationRef::ByCid(cid) => write!(f, "<cid:{cid}>"),
            GeolocationRef::ByUri(uri) => write!(f, "<{uri}>"),
        }
    }
}

impl FromStr for GeolocationRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let inner = s
            .strip_prefix('<')
            .and_then(|s| s.strip_suffix('>'))
            .ok_or_else(|| Error::Parse(format!("Geolocation value missing '<...>': {s}")))?;
        let uri: Uri = inner.parse()?;
        if uri.scheme == Scheme::Cid {
            let cid = uri.path.clone().unwrap_or_default();
            Ok(GeolocationRef::ByCid(cid))
        } else {
            Ok(GeolocationRef::ByUri(uri))
        }
    }
}

/// Splits a comma-separated `Geolocation` header into its individual
/// reference values.
pub fn parse_geolocation_list(s: &str) -> Result<Vec<GeolocationRef>> {
    s.split(',').map(|entry| entry.parse()).collect()
}

/// `Geolocation-Routing` header: a single `yes`/`no` token. RFC 6442 §3.1
/// says routing is not permitted unless the header explicitly says so, so
/// the absence of the header (and any value other than `yes`) means `No`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeolocationRouting {
    #[default]
    No,
    Yes,
}

impl fmt::Display for GeolocationRouting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GeolocationRouting::Yes => "yes",
            GeolocationRouting::No => "no",
        })
    }
}

impl FromStr for GeolocationRouting {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(GeolocationRouting::Yes),
            "no" => Ok(GeolocationRouting::No),
            other => Err(Error::Parse(format!("invalid Geolocation-Routing value: {other}"))),
        }
    }
}

/// `Geolocation-Error`: reports an upstream location-resolution failure
/// (e.g. a LoST query failure) back toward the originator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeolocationError {
    pub code: u16,
    pub text: String,
}

impl fmt::Display for GeolocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \"{}\"", self.code, self.text)
    }
}

impl FromStr for GeolocationError {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (code_str, text) = s
            .split_once(char::is_whitespace)
            .ok_or_else(|| Error::Parse(format!("malformed Geolocation-Error: {s}")))?;
        let code = code_str
            .parse::<u16>()
            .map_err(|_| Error::Parse(format!("invalid Geolocation-Error code: {code_str}")))?;
        let text = text.trim().trim_matches('"').to_string();
        Ok(GeolocationError { code, text })
    }
}

/// Bundles the three Geolocation-related headers a `SipMessage` tracks
/// (§3.2): the reference list, the routing intent, and an optional error
/// report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub refs: Vec<GeolocationRef>,
    pub routing: GeolocationRouting,
    pub error: Option<GeolocationError>,
}
