//! RFC 3862 CPIM codec (§4.8): a message format carried inside MSRP SEND
//! bodies. The body boundary is the *last* double-CRLF in the byte stream,
//! not the first, since a CPIM body can itself be a MIME document
//! containing blank lines.

use ng911_sip_core::buffer::rfind_pattern;

/// A decoded CPIM message. Known header fields are pulled out by name;
/// everything else is preserved verbatim in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpimMessage {
    pub to: Option<String>,
    pub from: Option<String>,
    pub cc: Option<String>,
    pub subject: Option<String>,
    pub date_time: Option<String>,
    pub require: Option<String>,
    pub ns: Option<String>,
    pub content_type: Option<String>,
    pub content_id: Option<String>,
    pub unknown_headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CpimMessage {
    fn empty() -> Self {
        CpimMessage {
            to: None,
            from: None,
            cc: None,
            subject: None,
            date_time: None,
            require: None,
            ns: None,
            content_type: None,
            content_id: None,
            unknown_headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// Parses a CPIM message. Per §4.8, a malformed message (no double-CRLF
/// found at all) yields `None` rather than an error — CPIM decode failure
/// is not fatal to the MSRP transaction carrying it.
pub fn parse(buf: &[u8]) -> Option<CpimMessage> {
    let boundary = rfind_pattern(buf, b"\r\n\r\n")?;
    let header_block = &buf[..boundary];
    let body = buf[boundary + 4..].to_vec();

    let text = std::str::from_utf8(header_block).ok()?;
    let mut msg = CpimMessage::empty();
    for line in text.split("\r\n").filter(|l| !l.is_empty()) {
        let Some((name, value)) = line.split_once(':') else { continue };
        let name = name.trim();
        let value = value.trim().to_string();
        match name.to_ascii_lowercase().as_str() {
            "to" => msg.to = Some(value),
            "from" => msg.from = Some(value),
            "cc" => msg.cc = Some(value),
            "subject" => msg.subject = Some(value),
            "datetime" => msg.date_time = Some(value),
            "require" => msg.require = Some(value),
            "ns" => msg.ns = Some(value),
            "content-type" => msg.content_type = Some(value),
            "content-id" => msg.content_id = Some(value),
            _ => msg.unknown_headers.push((name.to_string(), value)),
        }
    }
    msg.body = body;
    Some(msg)
}

/// Encodes a CPIM message back to wire form.
pub fn encode(msg: &CpimMessage) -> Vec<u8> {
    let mut out = Vec::new();
    let mut push = |name: &str, value: &Option<String>| {
        if let Some(v) = value {
            out.extend_from_slice(format!("{name}: {v}\r\n").as_bytes());
        }
    };
    push("To", &msg.to);
    push("From", &msg.from);
    push("cc", &msg.cc);
    push("Subject", &msg.subject);
    push("DateTime", &msg.date_time);
    push("Require", &msg.require);
    push("NS", &msg.ns);
    push("Content-Type", &msg.content_type);
    push("Content-ID", &msg.content_id);
    for (name, value) in &msg.unknown_headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(b"\r\n");
    out.extend_from_slice(&msg.body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_block_and_body_at_last_blank_line() {
        let raw = b"From: alice@example.com\r\nTo: bob@example.com\r\nNS: MyFeatures <mid:MessageFeatures>\r\n\r\nContent-Type: text/plain\r\n\r\nhey there\r\n";
        let msg = parse(raw).unwrap();
        assert_eq!(msg.from.as_deref(), Some("alice@example.com"));
        assert_eq!(msg.to.as_deref(), Some("bob@example.com"));
        // The body's own MIME headers sit before the body's own blank line,
        // which is the *last* CRLFCRLF, so they end up inside the body here
        // since this wrapper-level decoder only pulls CPIM header fields.
        assert!(msg.body.starts_with(b"hey there") || msg.body.ends_with(b"hey there\r\n"));
    }

    #[test]
    fn malformed_input_returns_none() {
        assert!(parse(b"no blank line anywhere").is_none());
    }

    #[test]
    fn round_trips_through_encode() {
        let mut msg = CpimMessage::empty();
        msg.from = Some("alice@example.com".to_string());
        msg.to = Some("bob@example.com".to_string());
        msg.content_type = Some("text/plain".to_string());
        msg.body = b"hello".to_vec();
        let encoded = encode(&msg);
        let decoded = parse(&encoded).unwrap();
        assert_eq!(decoded, msg);
    }
}
