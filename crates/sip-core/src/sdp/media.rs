//! SDP media description (`m=` line and its following `a=`/`c=`/`b=`
//! lines), RFC 8866 §5.14.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sdp::attributes::Attribute;
use crate::sdp::session::ConnectionData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Audio,
    Video,
    Text,
    Message,
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Text => "text",
            MediaType::Message => "message",
        })
    }
}

impl std::str::FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "audio" => Ok(MediaType::Audio),
            "video" => Ok(MediaType::Video),
            "text" => Ok(MediaType::Text),
            "message" => Ok(MediaType::Message),
            other => Err(Error::Sdp(format!("unsupported media type: {other}"))),
        }
    }
}

/// One `m=<media> <port>[/<port-count>] <proto> <fmt> [<fmt>...]` line and
/// the attributes/connection-data/bandwidth that follow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDescription {
    pub media_type: MediaType,
    pub port: u16,
    pub protocol: String,
    pub formats: Vec<String>,
    pub connection: Option<ConnectionData>,
    pub bandwidth: Vec<String>,
    pub attributes: Vec<Attribute>,
}

impl MediaDescription {
    pub fn parse_line(value: &str) -> Result<MediaDescription> {
        let parts: Vec<&str> = value.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(Error::Sdp(format!("invalid m= line: {value}")));
        }
        let media_type: MediaType = parts[0].parse()?;
        let port_field = parts[1];
        let port: u16 = port_field
            .split('/')
            .next()
            .unwrap_or(port_field)
            .parse()
            .map_err(|_| Error::Sdp(format!("invalid port in m= line: {value}")))?;
        let protocol = parts[2].to_string();
        let formats = parts[3..].iter().map(|s| s.to_string()).collect();
        Ok(MediaDescription {
            media_type,
            port,
            protocol,
            formats,
            connection: None,
            bandwidth: Vec::new(),
            attributes: Vec::new(),
        })
    }

    pub fn rtpmaps(&self) -> impl Iterator<Item = &crate::sdp::attributes::RtpMap> {
        self.attributes.iter().filter_map(|a| a.as_rtpmap())
    }

    pub fn direction(&self) -> Option<Attribute> {
        self.attributes.iter().find(|a| a.is_direction()).cloned()
    }

    pub fn setup(&self) -> Option<crate::sdp::attributes::Setup> {
        self.attributes.iter().find_map(|a| a.as_setup())
    }

    /// Whether this media description is rejected (`m=... 0 ...`), the
    /// answer engine's way of declining an offered media type it has no
    /// local support for (§4.4).
    pub fn is_rejected(&self) -> bool {
        self.port == 0
    }
}

impl std::fmt::Display for MediaDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.media_type, self.port, self.protocol)?;
        for fmt_val in &self.formats {
            write!(f, " {fmt_val}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_audio_media_line() {
        let m = MediaDescription::parse_line("audio 49170 RTP/AVP 0 8").unwrap();
        assert_eq!(m.media_type, MediaType::Audio);
        assert_eq!(m.port, 49170);
        assert_eq!(m.formats, vec!["0", "8"]);
    }

    #[test]
    fn rejected_media_has_zero_port() {
        let m = MediaDescription::parse_line("video 0 RTP/AVP 99").unwrap();
        assert!(m.is_rejected());
    }

    #[test]
    fn rejects_too_few_fields() {
        assert!(MediaDescription::parse_line("audio 49170 RTP/AVP").is_err());
    }
}
