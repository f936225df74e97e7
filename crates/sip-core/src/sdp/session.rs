//! SDP session-level model (RFC 8866 §5): `v=`, `o=`, `s=`, `c=`, `t=`, and
//! session-level `a=` lines, plus the ordered media description list.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sdp::attributes::Attribute;
use crate::sdp::media::MediaDescription;

/// The `o=` line: `<username> <sess-id> <sess-version> <nettype> <addrtype>
/// <unicast-address>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub username: String,
    pub session_id: String,
    pub session_version: String,
    pub net_type: String,
    pub address_type: String,
    pub address: String,
}

impl Origin {
    pub fn parse(value: &str) -> Result<Origin> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(Error::Sdp(format!("invalid o= line: {value}")));
        }
        if parts[3] != "IN" {
            return Err(Error::Sdp(format!("unsupported nettype: {}", parts[3])));
        }
        if parts[4] != "IP4" && parts[4] != "IP6" {
            return Err(Error::Sdp(format!("unsupported addrtype: {}", parts[4])));
        }
        Ok(Origin {
            username: parts[0].to_string(),
            session_id: parts[1].to_string(),
            session_version: parts[2].to_string(),
            net_type: parts[3].to_string(),
            address_type: parts[4].to_string(),
            address: parts[5].to_string(),
        })
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.username, self.session_id, self.session_version, self.net_type, self.address_type, self.address
        )
    }
}

/// The `c=` line: `<nettype> <addrtype> <connection-address>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionData {
    pub net_type: String,
    pub address_type: String,
    pub address: String,
}

impl ConnectionData {
    pub fn parse(value: &str) -> Result<ConnectionData> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(Error::Sdp(format!("invalid c= line: {value}")));
        }
        Ok(ConnectionData {
            net_type: parts[0].to_string(),
            address_type: parts[1].to_string(),
            address: parts[2].to_string(),
        })
    }
}

impl std::fmt::Display for ConnectionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.net_type, self.address_type, self.address)
    }
}

/// The `t=` line: `<start-time> <stop-time>`, carried as opaque NTP-epoch
/// decimal strings (`0 0` means a permanent session).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    pub start: String,
    pub stop: String,
}

/// A full SDP session description (RFC 8866 §5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub version: String,
    pub origin: Origin,
    pub session_name: String,
    pub info: Option<String>,
    pub uri: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub connection: Option<ConnectionData>,
    pub bandwidth: Vec<String>,
    pub timing: Vec<Timing>,
    pub attributes: Vec<Attribute>,
    pub media: Vec<MediaDescription>,
}

impl Session {
    /// The session-level direction attribute, if any (`sendrecv` /
    /// `sendonly` / `recvonly` / `inactive`), inherited by any media
    /// description that lacks its own (§3.3 invariant).
    pub fn direction(&self) -> Option<Attribute> {
        self.attributes.iter().find(|a| a.is_direction()).cloned()
    }

    /// Applies the session-level direction inheritance invariant: any media
    /// description without its own direction attribute gets the
    /// session-level one copied in.
    pub fn apply_direction_inheritance(&mut self) {
        if let Some(dir) = self.direction() {
            for media in &mut self.media {
                if !media.attributes.iter().any(|a| a.is_direction()) {
                    media.attributes.push(dir.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_origin() {
        let origin = Origin::parse("jdoe 2890844526 2890842807 IN IP4 10.47.16.5").unwrap();
        assert_eq!(origin.username, "jdoe");
        assert_eq!(origin.address, "10.47.16.5");
    }

    #[test]
    fn rejects_unsupported_nettype() {
        assert!(Origin::parse("jdoe 1 1 NET IP4 10.0.0.1").is_err());
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(Origin::parse("jdoe 1 1 IN IP4").is_err());
    }
}
