//! MSRP request/response wire codec (§4.6, §6.1). Operates on one complete
//! transaction buffer as handed over by the [`crate::stream_parser`] —
//! never on a partial stream.

use ng911_sip_core::Uri;

use crate::error::{Error, Result};
use crate::message::{ByteRange, CompletionStatus, MsrpMethod, MsrpRequest, MsrpResponse, MsrpTransaction};

const CRLF: &[u8] = b"\r\n";

fn parse_uri_list(value: &str) -> Result<Vec<Uri>> {
    value
        .split_whitespace()
        .map(|s| s.parse::<Uri>().map_err(Error::from))
        .collect()
}

fn format_uri_list(uris: &[Uri]) -> String {
    uris.iter().map(|u| u.to_string()).collect::<Vec<_>>().join(" ")
}

/// Decodes one complete transaction buffer (including its end-line) into a
/// request or a response.
pub fn decode(buf: &[u8]) -> Result<MsrpTransaction> {
    let first_line_end = ng911_sip_core::buffer::find_pattern(buf, 0, buf.len(), CRLF)
        .ok_or_else(|| Error::Parse("no CRLF after start line".into()))?;
    let first_line = std::str::from_utf8(&buf[..first_line_end])
        .map_err(|e| Error::Parse(format!("non-UTF8 start line: {e}")))?;

    let mut tokens = first_line.split_whitespace();
    if tokens.next() != Some("MSRP") {
        return Err(Error::Parse(format!("start line does not begin with MSRP: {first_line}")));
    }
    let txn_id = tokens
        .next()
        .ok_or_else(|| Error::Parse("missing transaction-id".into()))?
        .to_string();
    let rest: Vec<&str> = tokens.collect();
    if rest.is_empty() {
        return Err(Error::Parse("missing method or status code".into()));
    }

    let header_start = first_line_end + CRLF.len();
    let header_block_end = ng911_sip_core::buffer::find_pattern(buf, header_start, buf.len(), b"\r\n\r\n")
        .ok_or_else(|| Error::Parse("missing blank line after headers".into()))?;
    let headers = parse_header_block(&buf[header_start..header_block_end])?;
    let body_start = header_block_end + 4;

    let dash_pattern = format!("-------{txn_id}").into_bytes();
    let dash_pos = ng911_sip_core::buffer::find_pattern(buf, body_start, buf.len(), &dash_pattern)
        .ok_or_else(|| Error::Parse("missing end-line".into()))?;

    let body_end = if dash_pos >= body_start + 2 && &buf[dash_pos - 2..dash_pos] == CRLF {
        dash_pos - 2
    } else {
        dash_pos
    };
    let body = buf[body_start..body_end].to_vec();

    let flag_pos = dash_pos + dash_pattern.len();
    let flag = *buf.get(flag_pos).ok_or_else(|| Error::Parse("missing completion flag".into()))?;
    let completion = CompletionStatus::from_flag(flag);

    if let Ok(code) = rest[0].parse::<u16>() {
        let reason = if rest.len() > 1 { Some(rest[1..].join(" ")) } else { None };
        let mut resp = MsrpResponse::new(txn_id, code, reason);
        resp.completion = completion;
        apply_response_headers(&mut resp, headers)?;
        Ok(MsrpTransaction::Response(resp))
    } else {
        let method: MsrpMethod = rest[0].parse()?;
        let mut req = MsrpRequest::new(txn_id, method);
        req.completion = completion;
        req.body = body;
        apply_request_headers(&mut req, headers)?;
        Ok(MsrpTransaction::Request(req))
    }
}

fn parse_header_block(block: &[u8]) -> Result<Vec<(String, String)>> {
    if block.is_empty() {
        return Ok(Vec::new());
    }
    let text = std::str::from_utf8(block).map_err(|e| Error::Parse(format!("non-UTF8 headers: {e}")))?;
    text.split("\r\n")
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| Error::Parse(format!("malformed header line: {line}")))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn apply_request_headers(req: &mut MsrpRequest, headers: Vec<(String, String)>) -> Result<()> {
    for (name, value) in headers {
        match name.as_str() {
            "To-Path" => req.to_path = parse_uri_list(&value)?,
            "From-Path" => req.from_path = parse_uri_list(&value)?,
            "Message-ID" => req.message_id = Some(value),
            "Content-Type" => req.content_type = Some(value),
            "Byte-Range" => req.byte_range = Some(value.parse()?),
            "Success-Report" => req.success_report = Some(value.eq_ignore_ascii_case("yes")),
            "Failure-Report" => req.failure_report = Some(value.eq_ignore_ascii_case("yes")),
            "Status" => req.status = Some(value),
            _ => req.extra_headers.push((name, value)),
        }
    }
    Ok(())
}

fn apply_response_headers(resp: &mut MsrpResponse, headers: Vec<(String, String)>) -> Result<()> {
    for (name, value) in headers {
        match name.as_str() {
            "To-Path" => resp.to_path = parse_uri_list(&value)?,
            "From-Path" => resp.from_path = parse_uri_list(&value)?,
            _ => resp.extra_headers.push((name, value)),
        }
    }
    Ok(())
}

/// Encodes a request: `MSRP <txn-id> <METHOD>\r\n<headers>\r\n[<body>\r\n]-------<txn-id><flag>\r\n`.
pub fn encode_request(req: &MsrpRequest) -> Vec<u8> {
    let mut out = format!("MSRP {} {}\r\n", req.txn_id, req.method).into_bytes();
    if !req.to_path.is_empty() {
        out.extend_from_slice(format!("To-Path: {}\r\n", format_uri_list(&req.to_path)).as_bytes());
    }
    if !req.from_path.is_empty() {
        out.extend_from_slice(format!("From-Path: {}\r\n", format_uri_list(&req.from_path)).as_bytes());
    }
    if let Some(id) = &req.message_id {
        out.extend_from_slice(format!("Message-ID: {id}\r\n").as_bytes());
    }
    if let Some(range) = &req.byte_range {
        out.extend_from_slice(format!("Byte-Range: {range}\r\n").as_bytes());
    }
    if let Some(ct) = &req.content_type {
        out.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
    }
    if req.success_report == Some(true) {
        out.extend_from_slice(b"Success-Report: yes\r\n");
    }
    if req.failure_report == Some(true) {
        out.extend_from_slice(b"Failure-Report: yes\r\n");
    }
    if let Some(status) = &req.status {
        out.extend_from_slice(format!("Status: {status}\r\n").as_bytes());
    }
    for (name, value) in &req.extra_headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(CRLF);
    if !req.body.is_empty() {
        out.extend_from_slice(&req.body);
        out.extend_from_slice(CRLF);
    }
    out.extend_from_slice(format!("-------{}{}\r\n", req.txn_id, req.completion.flag() as char).as_bytes());
    out
}

/// Encodes a response: `MSRP <txn-id> <code>[ <reason>]\r\n<headers>\r\n-------<txn-id><flag>\r\n`.
pub fn encode_response(resp: &MsrpResponse) -> Vec<u8> {
    let mut out = match &resp.reason {
        Some(reason) => format!("MSRP {} {} {}\r\n", resp.txn_id, resp.code, reason),
        None => format!("MSRP {} {}\r\n", resp.txn_id, resp.code),
    }
    .into_bytes();
    if !resp.to_path.is_empty() {
        out.extend_from_slice(format!("To-Path: {}\r\n", format_uri_list(&resp.to_path)).as_bytes());
    }
    if !resp.from_path.is_empty() {
        out.extend_from_slice(format!("From-Path: {}\r\n", format_uri_list(&resp.from_path)).as_bytes());
    }
    for (name, value) in &resp.extra_headers {
        out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
    }
    out.extend_from_slice(CRLF);
    out.extend_from_slice(
        format!("-------{}{}\r\n", resp.txn_id, resp.completion.flag() as char).as_bytes(),
    );
    out
}

pub fn encode(txn: &MsrpTransaction) -> Vec<u8> {
    match txn {
        MsrpTransaction::Request(r) => encode_request(r),
        MsrpTransaction::Response(r) => encode_response(r),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MsrpMethod;

    #[test]
    fn decodes_bodyless_send_from_spec_scenario() {
        let raw = b"MSRP abc SEND\r\nTo-Path: msrp://x/y;tcp\r\nFrom-Path: msrp://a/b;tcp\r\n\r\n-------abc$\r\n";
        let txn = decode(raw).unwrap();
        let MsrpTransaction::Request(req) = txn else { panic!("expected request") };
        assert_eq!(req.method, MsrpMethod::Send);
        assert_eq!(req.to_path.len(), 1);
        assert_eq!(req.completion, CompletionStatus::Complete);
        assert!(req.body.is_empty());
    }

    #[test]
    fn encode_decode_round_trip_with_body() {
        let mut req = MsrpRequest::new("tid1", MsrpMethod::Send);
        req.to_path = vec!["msrp://psap.example.com:2855/sess1;tcp".parse().unwrap()];
        req.from_path = vec!["msrp://ua.example.com:49201/sess2;tcp".parse().unwrap()];
        req.message_id = Some("msg1".to_string());
        req.content_type = Some("text/plain".to_string());
        req.byte_range = Some(ByteRange::new(1, 11, 11));
        req.body = b"hello world".to_vec();
        req.completion = CompletionStatus::Complete;

        let encoded = encode_request(&req);
        let decoded = decode(&encoded).unwrap();
        let MsrpTransaction::Request(back) = decoded else { panic!("expected request") };
        assert_eq!(back, req);
        assert_eq!(encode_request(&back), encoded);
    }

    #[test]
    fn decodes_response_with_reason() {
        let raw = b"MSRP tid1 481 Timeout\r\n\r\n-------tid1$\r\n";
        let txn = decode(raw).unwrap();
        let MsrpTransaction::Response(resp) = txn else { panic!("expected response") };
        assert_eq!(resp.code, 481);
        assert_eq!(resp.reason.as_deref(), Some("Timeout"));
    }

    #[test]
    fn unknown_headers_pass_through_opaque() {
        let raw = b"MSRP tid1 SEND\r\nTo-Path: msrp://x/y;tcp\r\nFrom-Path: msrp://a/b;tcp\r\nX-Custom: value\r\n\r\n-------tid1$\r\n";
        let MsrpTransaction::Request(req) = decode(raw).unwrap() else { panic!("request") };
        assert_eq!(req.extra_headers, vec![("X-Custom".to_string(), "value".to_string())]);
    }
}
