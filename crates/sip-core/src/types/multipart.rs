//! Multipart body decomposition (`Content-Type: multipart/...; boundary=B`).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::buffer::find_pattern;
use crate::error::{Error, Result};
use crate::types::header::{HeaderName, Headers};

/// One part of a multipart body: its own header block and a body that is
/// kept byte-exact when `Content-Transfer-Encoding: binary` was specified,
/// or treated as UTF-8 text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipartPart {
    pub headers: Headers,
    pub body: Bytes,
}

impl MultipartPart {
    pub fn is_binary(&self) -> bool {
        self.headers
            .get(&HeaderName::Other("Content-Transfer-Encoding".to_string()))
            .map(|v| v.eq_ignore_ascii_case("binary"))
            .unwrap_or(false)
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.body).map_err(Error::from)
    }
}

/// An ordered sequence of decomposed multipart parts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultipartBody(pub Vec<MultipartPart>);

impl MultipartBody {
    /// Splits `body` on the RFC 2046 boundary delimiters, then each part's
    /// own header block (terminated by the first CRLF CRLF within the
    /// part) from its body.
    pub fn parse(body: &[u8], boundary: &str) -> Result<MultipartBody> {
        let delim = format!("--{boundary}").into_bytes();
        let mut parts = Vec::new();
        let mut cursor = 0usize;

        // Position at the first delimiter; anything before it is preamble
        // and is discarded per RFC 2046 §5.1.1.
        let first = find_pattern(body, cursor, body.len(), &delim)
            .ok_or_else(|| Error::Parse("multipart body: no boundary found".into()))?;
        cursor = first + delim.len();

        loop {
            // A delimiter is immediately followed by either "--" (close)
            // or CRLF (more parts follow).
            if body[cursor..].starts_with(b"--") {
                break;
            }
            let part_start = skip_crlf(body, cursor);
            let next = find_pattern(body, part_start, body.len(), &delim)
                .ok_or_else(|| Error::Parse("multipart body: unterminated part".into()))?;
            // Trim the CRLF that precedes the next delimiter from the part.
            let mut part_end = next;
            if part_end >= 2 && &body[part_end - 2..part_end] == b"\r\n" {
                part_end -= 2;
            }
            parts.push(parse_part(&body[part_start..part_end])?);
            cursor = next + delim.len();
        }

        Ok(MultipartBody(parts))
    }
}

fn skip_crlf(body: &[u8], idx: usize) -> usize {
    if body[idx..].starts_with(b"\r\n") {
        idx + 2
    } else {
        idx
    }
}

fn parse_part(raw: &[u8]) -> Result<MultipartPart> {
    let header_end = find_pattern(raw, 0, raw.len(), b"\r\n\r\n")
        .ok_or_else(|| Error::Parse("multipart part missing header/body separator".into()))?;
    let header_block = std::str::from_utf8(&raw[..header_end])?;
    let body = Bytes::copy_from_slice(&raw[header_end + 4..]);

    let mut headers = Headers::new();
    for line in header_block.split("\r\n") {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::Parse(format!("malformed multipart header line: {line}")))?;
        headers.push(name.trim().parse()?, value.trim());
    }

    Ok(MultipartPart { headers, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_parts() {
        let raw = b"--B\r\nContent-Type: application/sdp\r\n\r\nv=0\r\no=- 1 1 IN IP4 0.0.0.0\r\n--B\r\nContent-Type: application/pidf+xml\r\nContent-ID: <loc@example.com>\r\n\r\n<presence/>\r\n--B--";
        let body = MultipartBody::parse(raw, "B").unwrap();
        assert_eq!(body.0.len(), 2);
        assert_eq!(
            body.0[0].headers.get(&HeaderName::ContentType),
            Some("application/sdp")
        );
        assert!(body.0[0].text().unwrap().starts_with("v=0"));
        assert_eq!(
            body.0[1].headers.get(&HeaderName::Other("Content-ID".to_string())),
            Some("<loc@example.com>")
        );
    }

    #[test]
    fn binary_part_preserves_bytes_exactly() {
        let mut raw = Vec::new();
        raw.extend_from_slice(b"--B\r\nContent-Type: application/octet-stream\r\nContent-Transfer-Encoding: binary\r\n\r\n");
        raw.extend_from_slice(&[0u8, 1, 2, 255, 254]);
        raw.extend_from_slice(b"\r\n--B--");
        let body = MultipartBody::parse(&raw, "B").unwrap();
        assert!(body.0[0].is_binary());
        assert_eq!(&body.0[0].body[..], &[0u8, 1, 2, 255, 254]);
    }
}
