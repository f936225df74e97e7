//! SIP/SIPS/tel/MSRP and related URI forms (RFC 3261 §19.1, RFC 4975 §6).
//!
//! Host retains bracketed IPv6 literals verbatim in their stored form so
//! re-serialization is byte-stable, and a `*` host (used by a wildcard
//! Contact) is its own variant rather than a sentinel string.

use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::uri::parse_uri;
use crate::types::param::Param;

/// URI scheme, restricted to the set this core is expected to see on the
/// wire (RFC 3261 request-URIs, RFC 4975 MSRP URIs, RFC 6442 Geolocation
/// `cid`/`http(s)` references). An unrecognized scheme is a parse error,
/// not a fallthrough variant — callers that need an open-world scheme set
/// should parse the raw string themselves before reaching for `Uri`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scheme {
    Sip,
    Sips,
    Urn,
    Tel,
    Http,
    Https,
    Ws,
    Wss,
    Cid,
    Msrp,
    Msrps,
    Im,
    Pres,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Sip => "sip",
            Scheme::Sips => "sips",
            Scheme::Urn => "urn",
            Scheme::Tel => "tel",
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Ws => "ws",
            Scheme::Wss => "wss",
            Scheme::Cid => "cid",
            Scheme::Msrp => "msrp",
            Scheme::Msrps => "msrps",
            Scheme::Im => "im",
            Scheme::Pres => "pres",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sip" => Ok(Scheme::Sip),
            "sips" => Ok(Scheme::Sips),
            "urn" => Ok(Scheme::Urn),
            "tel" => Ok(Scheme::Tel),
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            "ws" => Ok(Scheme::Ws),
            "wss" => Ok(Scheme::Wss),
            "cid" => Ok(Scheme::Cid),
            "msrp" => Ok(Scheme::Msrp),
            "msrps" => Ok(Scheme::Msrps),
            "im" => Ok(Scheme::Im),
            "pres" => Ok(Scheme::Pres),
            other => Err(Error::InvalidUri(format!("unknown scheme: {other}"))),
        }
    }
}

/// Host component of a URI.
///
/// `Domain` also carries a bracketed IPv6 literal verbatim (e.g.
/// `[2001:db8::1]`) since the spec requires the brackets to survive
/// round-tripping; `Address` is reserved for hosts the parser has
/// confirmed are a bare IPv4 literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Host {
    Domain(String),
    Address(IpAddr),
    /// Bracketed IPv6 literal, stored with its brackets intact.
    Ipv6Literal(String),
    /// A bare `*` host, used by the wildcard Contact (`Contact: *`).
    Wildcard,
    /// No host concept at all — `urn:`/`cid:` URIs are opaque
    /// colon-delimited identifiers, not authority-based.
    None,
}

impl Host {
    pub fn domain(domain: impl Into<String>) -> Self {
        Host::Domain(domain.into())
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Domain(d) => write!(f, "{d}"),
            Host::Address(a) => write!(f, "{a}"),
            Host::Ipv6Literal(s) => write!(f, "{s}"),
            Host::Wildcard => write!(f, "*"),
            Host::None => Ok(()),
        }
    }
}

impl FromStr for Host {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "*" {
            return Ok(Host::Wildcard);
        }
        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner.strip_suffix(']').ok_or_else(|| {
                Error::MalformedUriComponent {
                    component: "host",
                    message: format!("unclosed IPv6 literal bracket: {s}"),
                }
            })?;
            Ipv6Addr::from_str(inner).map_err(|e| Error::MalformedUriComponent {
                component: "host",
                message: format!("invalid IPv6 literal: {e}"),
            })?;
            return Ok(Host::Ipv6Literal(s.to_string()));
        }
        // A raw (unbracketed) IPv6 literal in a URI host is rejected per
        // RFC 4475 torture test 4.2 — colons outside brackets are invalid.
        if s.contains(':') {
            return Err(Error::MalformedUriComponent {
                component: "host",
                message: format!("unbracketed IPv6 literal: {s}"),
            });
        }
        if let Ok(addr) = IpAddr::from_str(s) {
            return Ok(Host::Address(addr));
        }
        if s.is_empty() {
            return Err(Error::MalformedUriComponent {
                component: "host",
                message: "host cannot be empty".into(),
            });
        }
        Ok(Host::Domain(s.to_string()))
    }
}

/// A parsed URI: `scheme:[user@]host[:port][;params][?headers]`.
///
/// Parameters and headers are stored in an order-preserving container for
/// Display, but equality (`PartialEq`) ignores their order as required by
/// §4.2: it compares the parameter and header *sets*, case-insensitively
/// on keys (and on the `transport` value specifically), case-sensitively
/// otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Uri {
    pub scheme: Scheme,
    pub user: Option<String>,
    pub host: Host,
    pub port: Option<u16>,
    /// Path segment following the authority (`//host[:port]/path`), used by
    /// `msrp`/`msrps` URIs to carry the session-id (§3.5) and by `http(s)`
    /// Geolocation dereference targets.
    pub path: Option<String>,
    pub parameters: Vec<Param>,
    pub headers: Vec<(String, String)>,
}

impl Uri {
    pub fn new(scheme: Scheme, host: Host) -> Self {
        Uri {
            scheme,
            user: None,
            host,
            port: None,
            path: None,
            parameters: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_parameter(mut self, param: Param) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn transport(&self) -> Option<&str> {
        self.parameters.iter().find_map(|p| p.as_transport())
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.iter().find_map(|p| p.named_value(name))
    }

    fn normalized_params(&self) -> BTreeMap<String, String> {
        self.parameters
            .iter()
            .map(|p| {
                let (name, value) = p.name_value_pair();
                let name = name.to_ascii_lowercase();
                let value = if name == "transport" {
                    value.to_ascii_lowercase()
                } else {
                    value
                };
                (name, value)
            })
            .collect()
    }

    fn normalized_headers(&self) -> BTreeMap<String, String> {
        self.headers
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect()
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.user == other.user
            && self.host == other.host
            && self.port == other.port
            && self.path == other.path
            && self.normalized_params() == other.normalized_params()
            && self.normalized_headers() == other.normalized_headers()
    }
}
impl Eq for Uri {}

/// Schemes whose URI form is `scheme://authority[/path]` rather than
/// `scheme:user@host` (RFC 3986 net-path authority).
fn uses_net_path_authority(scheme: Scheme) -> bool {
    matches!(
        scheme,
        Scheme::Msrp | Scheme::Msrps | Scheme::Http | Scheme::Https | Scheme::Ws | Scheme::Wss
    )
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme)?;
        if self.host == Host::None {
            // Opaque scheme (urn:, cid:): the entire remainder lives in
            // `path` with no authority or leading slash.
            if let Some(path) = &self.path {
                write!(f, "{path}")?;
            }
            return Ok(());
        }
        if uses_net_path_authority(self.scheme) {
            write!(f, "//")?;
        }
        if let Some(user) = &self.user {
            write!(f, "{user}@")?;
        }
        write!(f, "{}", self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        if let Some(path) = &self.path {
            write!(f, "/{path}")?;
        }
        for param in &self.parameters {
            write!(f, ";{param}")?;
        }
        if !self.headers.is_empty() {
            write!(f, "?")?;
            for (i, (k, v)) in self.headers.iter().enumerate() {
                if i > 0 {
                    write!(f, "&")?;
                }
                write!(f, "{k}={v}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for Uri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (rest, uri) = parse_uri(s).map_err(|e| match e {
            nom::Err::Incomplete(_) => Error::Incomplete,
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                Error::InvalidUri(format!("{s}: {:?}", e.code))
            }
        })?;
        if !rest.is_empty() {
            return Err(Error::InvalidUri(format!("trailing data after URI: {rest}")));
        }
        Ok(uri)
    }
}

/// Parses a `tel:` URI's user part, stripping whitespace and dashes from
/// the digit string and then a leading NANP `+1` country code, if present
/// (e.g. `+1 818-555-3333` -> `8185553333`) per §4.2.
pub fn normalize_tel_digits(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    digits.strip_prefix("+1").map(str::to_string).unwrap_or(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_ipv6_round_trips() {
        let uri: Uri = "sip:alice@[2001:db8::1]:5060".parse().unwrap();
        assert_eq!(uri.host.to_string(), "[2001:db8::1]");
        assert_eq!(uri.to_string(), "sip:alice@[2001:db8::1]:5060");
    }

    #[test]
    fn unbracketed_ipv6_is_rejected() {
        let err = "sip:alice@2001:db8::1".parse::<Uri>();
        assert!(err.is_err());
    }

    #[test]
    fn wildcard_host_has_no_user() {
        let uri: Uri = "sip:*".parse().unwrap();
        assert_eq!(uri.host, Host::Wildcard);
        assert_eq!(uri.user, None);
    }

    #[test]
    fn equality_ignores_param_order_and_key_case() {
        let a: Uri = "sip:bob@example.com;TRANSPORT=TCP;foo=bar".parse().unwrap();
        let b: Uri = "sip:bob@example.com;foo=bar;transport=tcp".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn tel_digit_normalization() {
        assert_eq!(normalize_tel_digits("+1 818-555-3333"), "8185553333");
    }
}
