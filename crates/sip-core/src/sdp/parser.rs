//! SDP line-dispatch parser: each line's leading character (`v/o/s/i/u/e/p/
//! b/t/c/a/m`) selects how the rest of the line is interpreted (§4.4).

use crate::error::{Error, Result};
use crate::sdp::attributes::Attribute;
use crate::sdp::media::MediaDescription;
use crate::sdp::session::{ConnectionData, Origin, Session, Timing};

/// Parses a full SDP message body into a [`Session`].
pub fn parse_sdp(input: &str) -> Result<Session> {
    let mut version = None;
    let mut origin = None;
    let mut session_name = None;
    let mut info = None;
    let mut uri = None;
    let mut email = None;
    let mut phone = None;
    let mut connection = None;
    let mut bandwidth = Vec::new();
    let mut timing = Vec::new();
    let mut attributes = Vec::new();
    let mut media: Vec<MediaDescription> = Vec::new();

    for raw_line in input.split("\r\n").flat_map(|l| l.split('\n')) {
        let line = raw_line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let (tag, value) = line
            .split_once('=')
            .ok_or_else(|| Error::Sdp(format!("malformed SDP line: {line}")))?;

        // Once inside a media section, c=/b=/a= lines attach to the most
        // recent m= line rather than the session.
        if let Some(current) = media.last_mut() {
            match tag {
                "c" => {
                    current.connection = Some(ConnectionData::parse(value)?);
                    continue;
                }
                "b" => {
                    current.bandwidth.push(value.to_string());
                    continue;
                }
                "a" => {
                    current.attributes.push(value.parse::<Attribute>()?);
                    continue;
                }
                "m" => {
                    media.push(MediaDescription::parse_line(value)?);
                    continue;
                }
                _ => return Err(Error::Sdp(format!("unexpected session-level line after m=: {line}"))),
            }
        }

        match tag {
            "v" => version = Some(value.to_string()),
            "o" => origin = Some(Origin::parse(value)?),
            "s" => session_name = Some(value.to_string()),
            "i" => info = Some(value.to_string()),
            "u" => uri = Some(value.to_string()),
            "e" => email = Some(value.to_string()),
            "p" => phone = Some(value.to_string()),
            "c" => connection = Some(ConnectionData::parse(value)?),
            "b" => bandwidth.push(value.to_string()),
            "t" => {
                let parts: Vec<&str> = value.split_whitespace().collect();
                if parts.len() != 2 {
                    return Err(Error::Sdp(format!("invalid t= line: {line}")));
                }
                timing.push(Timing { start: parts[0].to_string(), stop: parts[1].to_string() });
            }
            "a" => attributes.push(value.parse::<Attribute>()?),
            "m" => media.push(MediaDescription::parse_line(value)?),
            other => return Err(Error::Sdp(format!("unknown SDP line type '{other}': {line}"))),
        }
    }

    let mut session = Session {
        version: version.ok_or_else(|| Error::Sdp("missing v= line".into()))?,
        origin: origin.ok_or_else(|| Error::Sdp("missing o= line".into()))?,
        session_name: session_name.ok_or_else(|| Error::Sdp("missing s= line".into()))?,
        info,
        uri,
        email,
        phone,
        connection,
        bandwidth,
        timing,
        attributes,
        media,
    };
    session.apply_direction_inheritance();
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdp::attributes::Direction;

    const AUDIO_OFFER: &str = "v=0\r\no=alice 123456 654321 IN IP4 192.0.2.1\r\ns=Emergency Call\r\nc=IN IP4 192.0.2.1\r\nt=0 0\r\na=sendrecv\r\nm=audio 49170 RTP/AVP 0\r\na=rtpmap:0 PCMU/8000\r\n";

    #[test]
    fn parses_minimal_session() {
        let session = parse_sdp(AUDIO_OFFER).unwrap();
        assert_eq!(session.origin.username, "alice");
        assert_eq!(session.media.len(), 1);
        assert_eq!(session.media[0].port, 49170);
    }

    #[test]
    fn session_direction_is_inherited_by_media_without_one() {
        let session = parse_sdp(AUDIO_OFFER).unwrap();
        assert_eq!(session.media[0].direction(), Some(crate::sdp::attributes::Attribute::Direction(Direction::SendRecv)));
    }

    #[test]
    fn media_level_direction_overrides_session_level() {
        let sdp = "v=0\r\no=alice 1 1 IN IP4 192.0.2.1\r\ns=-\r\nt=0 0\r\na=sendrecv\r\nm=audio 49170 RTP/AVP 0\r\na=recvonly\r\n";
        let session = parse_sdp(sdp).unwrap();
        assert_eq!(session.media[0].direction(), Some(crate::sdp::attributes::Attribute::Direction(Direction::RecvOnly)));
    }

    #[test]
    fn rejects_missing_origin() {
        let sdp = "v=0\r\ns=-\r\nt=0 0\r\n";
        assert!(parse_sdp(sdp).is_err());
    }
}
