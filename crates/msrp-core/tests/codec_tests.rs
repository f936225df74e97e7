//! End-to-end tests exercising the stream parser, codec, and CPIM body
//! codec together, the way a connection's reader task chains them.

use ng911_msrp_core::prelude::*;
use ng911_msrp_core::{codec, cpim, stream_parser::MsrpStreamParser, MsrpTransaction};

#[test]
fn streams_a_chunked_send_pair_and_decodes_each_chunk() {
    let config = MsrpConfig::default();
    let mut parser = MsrpStreamParser::new(&config);

    let chunk1 = b"MSRP dkei38sd SEND\r\n\
        To-Path: msrp://psap.example.com:2855/9125d1fa;tcp\r\n\
        From-Path: msrp://ua.example.com:49201/kd9gwz;tcp\r\n\
        Message-ID: 12339\r\n\
        Byte-Range: 1-8/22\r\n\
        Content-Type: text/plain\r\n\r\n\
        Hi there\r\n\
        -------dkei38sd+\r\n";
    let chunk2 = b"MSRP dkei38se SEND\r\n\
        To-Path: msrp://psap.example.com:2855/9125d1fa;tcp\r\n\
        From-Path: msrp://ua.example.com:49201/kd9gwz;tcp\r\n\
        Message-ID: 12339\r\n\
        Byte-Range: 9-22/22\r\n\
        Content-Type: text/plain\r\n\r\n\
        , how are you?\r\n\
        -------dkei38se$\r\n";

    let mut transactions = parser.feed(chunk1);
    transactions.extend(parser.feed(chunk2));
    assert_eq!(transactions.len(), 2);

    let MsrpTransaction::Request(first) = codec::decode(&transactions[0]).unwrap() else {
        panic!("expected a request")
    };
    assert_eq!(first.completion, CompletionStatus::Continuation);
    assert_eq!(first.byte_range.unwrap().to_string(), "1-8/22");
    assert_eq!(first.body, b"Hi there");

    let MsrpTransaction::Request(second) = codec::decode(&transactions[1]).unwrap() else {
        panic!("expected a request")
    };
    assert_eq!(second.completion, CompletionStatus::Complete);
    assert_eq!(second.message_id.as_deref(), Some("12339"));

    let full: Vec<u8> = [first.body, second.body].concat();
    assert_eq!(full, b"Hi there, how are you?");
}

#[test]
fn decodes_a_200_response_that_closes_out_a_transaction() {
    let raw = b"MSRP dkei38sd 200 OK\r\n\
        To-Path: msrp://ua.example.com:49201/kd9gwz;tcp\r\n\
        From-Path: msrp://psap.example.com:2855/9125d1fa;tcp\r\n\r\n\
        -------dkei38sd$\r\n";
    let MsrpTransaction::Response(resp) = codec::decode(raw).unwrap() else {
        panic!("expected a response")
    };
    assert_eq!(resp.code, 200);
    assert_eq!(resp.to_path.len(), 1);
}

#[test]
fn decodes_cpim_body_carried_inside_a_send() {
    let raw = b"MSRP a786hjs2 SEND\r\n\
        To-Path: msrp://psap.example.com:2855/9125d1fa;tcp\r\n\
        From-Path: msrp://ua.example.com:49201/kd9gwz;tcp\r\n\
        Message-ID: 40839\r\n\
        Content-Type: message/cpim\r\n\r\n\
        From: <sip:caller@example.com>\r\n\
        To: <sip:psap@example.com>\r\n\
        NS: emergency <urn:ietf:params:ecrit:emergency-types>\r\n\r\n\
        Content-Type: text/plain\r\n\r\n\
        I need help at 123 Main St\r\n\
        -------a786hjs2$\r\n";

    let MsrpTransaction::Request(req) = codec::decode(raw).unwrap() else {
        panic!("expected a request")
    };
    assert_eq!(req.content_type.as_deref(), Some("message/cpim"));

    let body = cpim::parse(&req.body).expect("well-formed CPIM");
    assert_eq!(body.from.as_deref(), Some("<sip:caller@example.com>"));
    assert_eq!(body.to.as_deref(), Some("<sip:psap@example.com>"));
    assert!(body.body.ends_with(b"I need help at 123 Main St\r\n"));
}

#[test]
fn malformed_transaction_is_rejected_by_the_codec() {
    let raw = b"MSRP only-one-token\r\n\r\n-------only-one-token$\r\n";
    assert!(codec::decode(raw).is_err());
}
