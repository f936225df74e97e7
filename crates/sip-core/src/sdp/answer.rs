//! Offer/answer engine (§4.4): given an offered [`Session`] and the local
//! application's capabilities, produce an answered `Session` one media
//! description at a time.

use crate::error::Result;
use crate::sdp::attributes::{Attribute, Crypto, Fingerprint, Setup};
use crate::sdp::media::{MediaDescription, MediaType};
use crate::sdp::session::Session;
use crate::types::uri::Uri;

/// Yields the next available port for a media type. A deterministic fake
/// implementation lets the answer engine be unit-tested without a real
/// socket layer.
pub trait PortManager {
    fn next_port(&self, media_type: MediaType) -> Option<u16>;
}

/// What the local application can do, used to decide accept-vs-reject and
/// to narrow payload types when answering.
pub struct AnswerCapabilities {
    pub supported_media: Vec<MediaType>,
    /// Payload-type/encoding pairs the local side can encode/decode, in
    /// preference order, keyed by media type.
    pub supported_encodings: Vec<(MediaType, String)>,
    /// The local MSRP URI template; the engine appends a freshly generated
    /// session-id to it when answering an MSRP offer.
    pub local_msrp_base_uri: Option<Uri>,
    pub local_dtls_fingerprint: Option<Fingerprint>,
    pub supported_srtp_suites: Vec<String>,
    pub session_id_source: fn() -> String,
}

fn supports(caps: &AnswerCapabilities, media_type: MediaType) -> bool {
    caps.supported_media.contains(&media_type)
}

fn first_mutual_format(caps: &AnswerCapabilities, media_type: MediaType, offered: &[String]) -> Option<String> {
    caps.supported_encodings
        .iter()
        .filter(|(mt, _)| *mt == media_type)
        .map(|(_, fmt)| fmt.clone())
        .find(|fmt| offered.contains(fmt))
}

fn is_dtls_srtp_transport(protocol: &str) -> bool {
    protocol == "UDP/TLS/RTP/SAVP" || protocol == "RTP/SAVP"
}

fn answer_media(
    offered: &MediaDescription,
    caps: &AnswerCapabilities,
    ports: &dyn PortManager,
) -> Result<MediaDescription> {
    if !supports(caps, offered.media_type) {
        return Ok(MediaDescription {
            media_type: offered.media_type,
            port: 0,
            protocol: offered.protocol.clone(),
            formats: offered.formats.clone(),
            connection: None,
            bandwidth: Vec::new(),
            attributes: Vec::new(),
        });
    }

    let port = ports.next_port(offered.media_type).unwrap_or(0);
    if port == 0 {
        return Ok(MediaDescription {
            media_type: offered.media_type,
            port: 0,
            protocol: offered.protocol.clone(),
            formats: offered.formats.clone(),
            connection: None,
            bandwidth: Vec::new(),
            attributes: Vec::new(),
        });
    }

    let mut formats = Vec::new();
    let mut attributes = Vec::new();

    if offered.media_type == MediaType::Audio {
        if let Some(chosen) = first_mutual_format(caps, offered.media_type, &offered.formats) {
            formats.push(chosen.clone());
            if let Some(rtpmap) = offered.rtpmaps().find(|r| r.payload_type.to_string() == chosen) {
                attributes.push(Attribute::RtpMap(rtpmap.clone()));
            }
        }
        // Carry a telephone-event rtpmap/fmtp pair across verbatim if the
        // offer has one (§4.4).
        if let Some(dtmf) = offered.rtpmaps().find(|r| r.encoding_name == "telephone-event") {
            formats.push(dtmf.payload_type.to_string());
            attributes.push(Attribute::RtpMap(dtmf.clone()));
            if let Some(fmtp) = offered
                .attributes
                .iter()
                .filter_map(|a| a.as_fmtp())
                .find(|f| f.payload_type == dtmf.payload_type)
            {
                attributes.push(Attribute::Fmtp(fmtp.clone()));
            }
        }
    } else {
        formats = offered.formats.clone();
    }

    let mut protocol = offered.protocol.clone();

    if offered.protocol.contains("MSRP") {
        let setup = offered.setup().unwrap_or(Setup::ActPass).answer_role();
        attributes.push(Attribute::Setup(setup));
        if let Some(base) = &caps.local_msrp_base_uri {
            let mut uri = base.clone();
            let session_id = (caps.session_id_source)();
            uri.path = Some(session_id);
            attributes.push(Attribute::Path(vec![uri]));
        }
    } else if is_dtls_srtp_transport(&offered.protocol) {
        if let Some(fp) = &caps.local_dtls_fingerprint {
            let setup = offered.setup().unwrap_or(Setup::ActPass).answer_role();
            attributes.push(Attribute::Setup(setup));
            attributes.push(Attribute::Fingerprint(fp.clone()));
        }
    } else if offered.protocol == "RTP/SAVP" || offered.protocol.ends_with("SAVP") {
        // SDES-SRTP: echo the first locally supported suite under the same tag.
        if let Some(chosen) = offered
            .attributes
            .iter()
            .filter_map(|a| a.as_crypto())
            .find(|c| caps.supported_srtp_suites.contains(&c.suite))
        {
            attributes.push(Attribute::Crypto(Crypto {
                tag: chosen.tag,
                suite: chosen.suite.clone(),
                key_params: chosen.key_params.clone(),
            }));
        } else {
            protocol = offered.protocol.clone();
        }
    }

    Ok(MediaDescription {
        media_type: offered.media_type,
        port,
        protocol,
        formats,
        connection: None,
        bandwidth: Vec::new(),
        attributes,
    })
}

/// Answers an entire offered session, one media description at a time.
pub fn answer_session(offer: &Session, caps: &AnswerCapabilities, ports: &dyn PortManager) -> Result<Session> {
    let mut answer = offer.clone();
    answer.media = offer
        .media
        .iter()
        .map(|m| answer_media(m, caps, ports))
        .collect::<Result<Vec<_>>>()?;
    Ok(answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdp::parser::parse_sdp;
    use crate::types::uri::{Host, Scheme};

    struct FixedPorts(u16);
    impl PortManager for FixedPorts {
        fn next_port(&self, _media_type: MediaType) -> Option<u16> {
            Some(self.0)
        }
    }

    fn caps() -> AnswerCapabilities {
        AnswerCapabilities {
            supported_media: vec![MediaType::Audio, MediaType::Message],
            supported_encodings: vec![(MediaType::Audio, "0".to_string())],
            local_msrp_base_uri: Some(Uri::new(Scheme::Msrp, Host::domain("psap.example.com")).with_port(2855)),
            local_dtls_fingerprint: None,
            supported_srtp_suites: Vec::new(),
            session_id_source: || "abc123".to_string(),
        }
    }

    #[test]
    fn unsupported_media_is_rejected_with_zero_port() {
        let offer = parse_sdp(
            "v=0\r\no=a 1 1 IN IP4 192.0.2.1\r\ns=-\r\nt=0 0\r\nm=video 3000 RTP/AVP 99\r\n",
        )
        .unwrap();
        let answer = answer_session(&offer, &caps(), &FixedPorts(4000)).unwrap();
        assert!(answer.media[0].is_rejected());
    }

    #[test]
    fn supported_audio_narrows_to_mutual_codec() {
        let offer = parse_sdp(
            "v=0\r\no=a 1 1 IN IP4 192.0.2.1\r\ns=-\r\nt=0 0\r\nm=audio 49170 RTP/AVP 0 8\r\na=rtpmap:0 PCMU/8000\r\na=rtpmap:8 PCMA/8000\r\n",
        )
        .unwrap();
        let answer = answer_session(&offer, &caps(), &FixedPorts(6000)).unwrap();
        assert_eq!(answer.media[0].port, 6000);
        assert_eq!(answer.media[0].formats, vec!["0"]);
    }

    #[test]
    fn msrp_actpass_offer_is_answered_active_with_path() {
        let offer = parse_sdp(
            "v=0\r\no=a 1 1 IN IP4 192.0.2.1\r\ns=-\r\nt=0 0\r\nm=message 2855 TCP/MSRP *\r\na=setup:actpass\r\na=path:msrp://caller.example.com:2855/xyz;tcp\r\n",
        )
        .unwrap();
        let answer = answer_session(&offer, &caps(), &FixedPorts(2855)).unwrap();
        assert_eq!(answer.media[0].setup(), Some(Setup::Active));
        assert!(matches!(
            answer.media[0].attributes.iter().find(|a| matches!(a, Attribute::Path(_))),
            Some(Attribute::Path(_))
        ));
    }
}
