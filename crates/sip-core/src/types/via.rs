use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::param::Param;

/// A single Via header field value: `SIP/2.0/<transport> <host>[:port]
/// [;branch=...][;received=...][;rport[=...]]...`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Via {
    pub transport: String,
    pub host: String,
    pub port: Option<u16>,
    pub params: Vec<Param>,
}

impl Via {
    pub fn branch(&self) -> Option<&str> {
        self.params.iter().find_map(|p| match p {
            Param::Branch(b) => Some(b.as_str()),
            _ => None,
        })
    }

    pub fn received(&self) -> Option<&str> {
        self.params.iter().find_map(|p| match p {
            Param::Received(r) => Some(r.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIP/2.0/{} {}", self.transport.to_ascii_uppercase(), self.host)?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        for p in &self.params {
            write!(f, ";{p}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Via {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let rest = s
            .strip_prefix("SIP/2.0/")
            .ok_or_else(|| Error::Parse(format!("malformed Via (missing SIP/2.0/): {s}")))?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let transport = parts
            .next()
            .ok_or_else(|| Error::Parse("malformed Via: missing transport".into()))?
            .to_string();
        let sent_by_and_params = parts
            .next()
            .ok_or_else(|| Error::Parse("malformed Via: missing sent-by".into()))?
            .trim_start();

        let mut segments = sent_by_and_params.split(';');
        let sent_by = segments.next().unwrap_or_default().trim();
        let (host, port) = match sent_by.rsplit_once(':') {
            Some((h, p)) if !h.contains(']') || h.ends_with(']') => {
                match p.parse::<u16>() {
                    Ok(port) => (h.to_string(), Some(port)),
                    Err(_) => (sent_by.to_string(), None),
                }
            }
            _ => (sent_by.to_string(), None),
        };

        let params = segments
            .map(|seg| {
                let mut kv = seg.splitn(2, '=');
                let k = kv.next().unwrap_or_default();
                let v = kv.next();
                Param::parse_one(k, v)
            })
            .collect();

        Ok(Via {
            transport,
            host,
            port,
            params,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_via() {
        let via: Via = "SIP/2.0/UDP pc33.example.com;branch=z9hG4bK776asdhds".parse().unwrap();
        assert_eq!(via.transport, "UDP");
        assert_eq!(via.branch(), Some("z9hG4bK776asdhds"));
        assert_eq!(via.to_string(), "SIP/2.0/UDP pc33.example.com;branch=z9hG4bK776asdhds");
    }

    #[test]
    fn parses_via_with_port() {
        let via: Via = "SIP/2.0/TCP 192.0.2.4:5060".parse().unwrap();
        assert_eq!(via.port, Some(5060));
    }
}
