//! RFC 4475/5118 torture-test scenarios this core must reproduce (§8).
//! Gated behind `lenient_parsing` since a couple of these vectors probe
//! tolerance of non-strict line endings.

use ng911_sip_core::parser::message::parse_message;
use ng911_sip_core::prelude::*;
use ng911_sip_core::validation::validate_request;

/// RFC 4475 3.1.1.2 (intmeth.dat): a well-formed but unrecognized method
/// must parse and validate, not be rejected outright.
#[test]
fn unknown_method_intmeth_parses_and_validates() {
    let raw = b"INVITEXYZ sip:bob@biloxi.example.com SIP/2.0\r\n\
        Via: SIP/2.0/TCP host1.example.com;branch=z9hG4bK-int-meth\r\n\
        Max-Forwards: 70\r\n\
        To: sip:bob@biloxi.example.com\r\n\
        From: sip:amit@example.com;tag=kkaz-\r\n\
        Call-ID: intmeth.call\r\n\
        CSeq: 1 INVITEXYZ\r\n\
        Content-Length: 0\r\n\r\n";

    let framed = parse_message(raw).expect("well-formed unknown method must parse");
    let req = framed.message.as_request().expect("request");
    assert_eq!(req.method, Method::Extension("INVITEXYZ".to_string()));
    assert!(validate_request(req).is_ok());
}

/// RFC 4475 3.1.2.17 (mismatch01.dat): the CSeq method and request-line
/// method disagree — the framer parses it fine, the validator rejects it.
#[test]
fn cseq_method_mismatch_is_caught_by_validator_not_framer() {
    let raw = b"REGISTER sip:example.com SIP/2.0\r\n\
        Via: SIP/2.0/TCP host.example.com;branch=z9hG4bK-mismatch\r\n\
        Max-Forwards: 70\r\n\
        To: sip:watson@example.com\r\n\
        From: sip:watson@example.com;tag=mismatch01\r\n\
        Call-ID: mismatch01.call\r\n\
        CSeq: 1 INVITE\r\n\
        Content-Length: 0\r\n\r\n";

    let framed = parse_message(raw).expect("framer accepts mismatched CSeq");
    let req = framed.message.as_request().expect("request");
    assert_eq!(req.method, Method::Register);
    let err = validate_request(req).expect_err("validator must reject CSeq/method mismatch");
    assert!(matches!(err, Error::Validation(_)));
}

/// RFC 4475 §4.2: an unbracketed raw IPv6 literal in a URI host is invalid.
#[test]
fn unbracketed_ipv6_host_is_rejected() {
    let result = "sip:user@2001:db8::9:1".parse::<Uri>();
    assert!(result.is_err());
}

/// A bracketed IPv6 literal is accepted and round-trips byte-for-byte.
#[test]
fn bracketed_ipv6_host_round_trips() {
    let uri: Uri = "sip:user@[2001:db8::9:1]:5070".parse().unwrap();
    assert_eq!(uri.to_string(), "sip:user@[2001:db8::9:1]:5070");
}
