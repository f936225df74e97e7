//! SDP attribute (`a=`) grammar. Attributes this core inspects by name get
//! a named variant; everything else round-trips through `Opaque`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::uri::Uri;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    SendRecv,
    SendOnly,
    RecvOnly,
    Inactive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::SendRecv => "sendrecv",
            Direction::SendOnly => "sendonly",
            Direction::RecvOnly => "recvonly",
            Direction::Inactive => "inactive",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Setup {
    Active,
    Passive,
    ActPass,
    HoldConn,
}

impl Setup {
    /// The passive side's answer to an offer with this setup role, per
    /// RFC 4975 §8.4: `actpass`/`passive` is answered `active`, anything
    /// else is answered `passive`.
    pub fn answer_role(self) -> Setup {
        match self {
            Setup::ActPass | Setup::Passive => Setup::Active,
            Setup::Active | Setup::HoldConn => Setup::Passive,
        }
    }
}

impl fmt::Display for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Setup::Active => "active",
            Setup::Passive => "passive",
            Setup::ActPass => "actpass",
            Setup::HoldConn => "holdconn",
        })
    }
}

impl FromStr for Setup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "active" => Ok(Setup::Active),
            "passive" => Ok(Setup::Passive),
            "actpass" => Ok(Setup::ActPass),
            "holdconn" => Ok(Setup::HoldConn),
            other => Err(Error::Sdp(format!("invalid a=setup value: {other}"))),
        }
    }
}

/// One `a=rtpmap:<payload-type> <encoding-name>/<clock-rate>[/<channels>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtpMap {
    pub payload_type: u8,
    pub encoding_name: String,
    pub clock_rate: u32,
    pub channels: Option<u8>,
}

impl fmt::Display for RtpMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rtpmap:{} {}/{}", self.payload_type, self.encoding_name, self.clock_rate)?;
        if let Some(c) = self.channels {
            write!(f, "/{c}")?;
        }
        Ok(())
    }
}

/// `a=fmtp:<payload-type> <format-specific-params>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fmtp {
    pub payload_type: u8,
    pub params: String,
}

impl fmt::Display for Fmtp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fmtp:{} {}", self.payload_type, self.params)
    }
}

/// `a=crypto:<tag> <crypto-suite> <key-params> [<session-params>]`
/// (RFC 4568).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crypto {
    pub tag: u32,
    pub suite: String,
    pub key_params: String,
}

impl fmt::Display for Crypto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "crypto:{} {} {}", self.tag, self.suite, self.key_params)
    }
}

/// `a=fingerprint:<hash-func> <fingerprint>` (RFC 8122, DTLS-SRTP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub hash_func: String,
    pub fingerprint: String,
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fingerprint:{} {}", self.hash_func, self.fingerprint)
    }
}

/// A single SDP attribute line (the text after `a=`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attribute {
    Direction(Direction),
    RtpMap(RtpMap),
    Fmtp(Fmtp),
    Crypto(Crypto),
    Setup(Setup),
    /// `a=path:<msrp-uri> ...` (RFC 4975 §8.4), one or more MSRP URIs.
    Path(Vec<Uri>),
    Fingerprint(Fingerprint),
    /// `a=<name>[:<value>]`, for anything not specifically modeled.
    Opaque { name: String, value: Option<String> },
}

impl Attribute {
    pub fn is_direction(&self) -> bool {
        matches!(self, Attribute::Direction(_))
    }

    pub fn as_setup(&self) -> Option<Setup> {
        match self {
            Attribute::Setup(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_rtpmap(&self) -> Option<&RtpMap> {
        match self {
            Attribute::RtpMap(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_fmtp(&self) -> Option<&Fmtp> {
        match self {
            Attribute::Fmtp(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_crypto(&self) -> Option<&Crypto> {
        match self {
            Attribute::Crypto(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Direction(d) => write!(f, "{d}"),
            Attribute::RtpMap(r) => write!(f, "{r}"),
            Attribute::Fmtp(fm) => write!(f, "{fm}"),
            Attribute::Crypto(c) => write!(f, "{c}"),
            Attribute::Setup(s) => write!(f, "setup:{s}"),
            Attribute::Path(uris) => {
                write!(f, "path:")?;
                for (i, u) in uris.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{u}")?;
                }
                Ok(())
            }
            Attribute::Fingerprint(fp) => write!(f, "{fp}"),
            Attribute::Opaque { name, value: Some(v) } => write!(f, "{name}:{v}"),
            Attribute::Opaque { name, value: None } => write!(f, "{name}"),
        }
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, value) = match s.split_once(':') {
            Some((n, v)) => (n, Some(v)),
            None => (s, None),
        };
        Ok(match (name, value) {
            ("sendrecv", None) => Attribute::Direction(Direction::SendRecv),
            ("sendonly", None) => Attribute::Direction(Direction::SendOnly),
            ("recvonly", None) => Attribute::Direction(Direction::RecvOnly),
            ("inactive", None) => Attribute::Direction(Direction::Inactive),
            ("setup", Some(v)) => Attribute::Setup(v.parse()?),
            ("rtpmap", Some(v)) => Attribute::RtpMap(parse_rtpmap(v)?),
            ("fmtp", Some(v)) => Attribute::Fmtp(parse_fmtp(v)?),
            ("crypto", Some(v)) => Attribute::Crypto(parse_crypto(v)?),
            ("fingerprint", Some(v)) => Attribute::Fingerprint(parse_fingerprint(v)?),
            ("path", Some(v)) => {
                let uris = v
                    .split_whitespace()
                    .map(|u| u.parse::<Uri>())
                    .collect::<Result<Vec<_>>>()?;
                Attribute::Path(uris)
            }
            _ => Attribute::Opaque { name: name.to_string(), value: value.map(str::to_string) },
        })
    }
}

fn parse_rtpmap(v: &str) -> Result<RtpMap> {
    let (pt_str, rest) = v
        .split_once(' ')
        .ok_or_else(|| Error::Sdp(format!("malformed rtpmap: {v}")))?;
    let payload_type: u8 = pt_str.parse().map_err(|_| Error::Sdp(format!("bad payload type: {pt_str}")))?;
    let mut fields = rest.split('/');
    let encoding_name = fields
        .next()
        .ok_or_else(|| Error::Sdp(format!("malformed rtpmap: {v}")))?
        .to_string();
    let clock_rate: u32 = fields
        .next()
        .ok_or_else(|| Error::Sdp(format!("malformed rtpmap: {v}")))?
        .parse()
        .map_err(|_| Error::Sdp(format!("bad clock rate in rtpmap: {v}")))?;
    let channels = fields.next().and_then(|c| c.parse().ok());
    Ok(RtpMap { payload_type, encoding_name, clock_rate, channels })
}

fn parse_fmtp(v: &str) -> Result<Fmtp> {
    let (pt_str, params) = v
        .split_once(' ')
        .ok_or_else(|| Error::Sdp(format!("malformed fmtp: {v}")))?;
    let payload_type: u8 = pt_str.parse().map_err(|_| Error::Sdp(format!("bad payload type: {pt_str}")))?;
    Ok(Fmtp { payload_type, params: params.to_string() })
}

fn parse_crypto(v: &str) -> Result<Crypto> {
    let mut parts = v.splitn(3, ' ');
    let tag: u32 = parts
        .next()
        .ok_or_else(|| Error::Sdp(format!("malformed crypto: {v}")))?
        .parse()
        .map_err(|_| Error::Sdp(format!("bad crypto tag: {v}")))?;
    let suite = parts
        .next()
        .ok_or_else(|| Error::Sdp(format!("malformed crypto: {v}")))?
        .to_string();
    let key_params = parts.next().unwrap_or_default().to_string();
    Ok(Crypto { tag, suite, key_params })
}

fn parse_fingerprint(v: &str) -> Result<Fingerprint> {
    let (hash_func, fp) = v
        .split_once(' ')
        .ok_or_else(|| Error::Sdp(format!("malformed fingerprint: {v}")))?;
    Ok(Fingerprint { hash_func: hash_func.to_string(), fingerprint: fp.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_direction_flags() {
        assert_eq!("sendrecv".parse::<Attribute>().unwrap(), Attribute::Direction(Direction::SendRecv));
        assert!("sendrecv".parse::<Attribute>().unwrap().is_direction());
    }

    #[test]
    fn parses_rtpmap_with_channels() {
        let attr: Attribute = "rtpmap:97 opus/48000/2".parse().unwrap();
        let rtpmap = attr.as_rtpmap().unwrap();
        assert_eq!(rtpmap.payload_type, 97);
        assert_eq!(rtpmap.channels, Some(2));
    }

    #[test]
    fn setup_answer_role_flips_actpass_to_active() {
        assert_eq!(Setup::ActPass.answer_role(), Setup::Active);
        assert_eq!(Setup::Passive.answer_role(), Setup::Active);
        assert_eq!(Setup::Active.answer_role(), Setup::Passive);
    }

    #[test]
    fn parses_path_with_msrp_uri() {
        let attr: Attribute = "path:msrp://host:2855/abc123;tcp".parse().unwrap();
        assert!(matches!(attr, Attribute::Path(ref uris) if uris.len() == 1));
    }

    #[test]
    fn unrecognized_attribute_round_trips_opaque() {
        let attr: Attribute = "ptime:20".parse().unwrap();
        assert_eq!(attr.to_string(), "ptime:20");
    }
}
