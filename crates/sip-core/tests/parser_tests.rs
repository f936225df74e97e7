//! End-to-end parser tests exercising the framer, URI grammar, and
//! multipart decomposition together.

use ng911_sip_core::prelude::*;
use ng911_sip_core::types::multipart::MultipartBody;

#[test]
fn frames_full_invite_and_exposes_headers() {
    let raw = b"INVITE sip:psap@example.com SIP/2.0\r\n\
        Via: SIP/2.0/UDP ua.example.com;branch=z9hG4bK776a\r\n\
        From: <sip:caller@example.com>;tag=1928301774\r\n\
        To: <sip:psap@example.com>\r\n\
        Call-ID: a84b4c76e66710\r\n\
        CSeq: 1 INVITE\r\n\
        Max-Forwards: 70\r\n\
        Geolocation: <cid:target123@example.com>\r\n\
        Geolocation-Routing: yes\r\n\
        Call-Info: <urn:emergency:uid:callid:abc123>;purpose=emergency-CallId\r\n\
        Content-Length: 0\r\n\r\n";

    let framed = parse_message(raw).unwrap();
    let req = framed.message.as_request().unwrap();
    assert!(validate_request(req).is_ok());

    let geo: GeolocationRef = req.headers.get(&HeaderName::Geolocation).unwrap().parse().unwrap();
    assert_eq!(geo, GeolocationRef::ByCid("target123@example.com".to_string()));

    let routing: GeolocationRouting =
        req.headers.get(&HeaderName::GeolocationRouting).unwrap().parse().unwrap();
    assert_eq!(routing, GeolocationRouting::Yes);

    let call_info: CallInfo = req.headers.get(&HeaderName::CallInfo).unwrap().parse().unwrap();
    assert_eq!(call_info.purpose.as_deref(), Some("emergency-CallId"));
}

#[test]
fn frames_response_and_splits_multipart_body() {
    let boundary = "boundary1";
    let mut raw = format!(
        "SIP/2.0 200 OK\r\nCSeq: 1 INVITE\r\nContent-Type: multipart/mixed; boundary={boundary}\r\n"
    );
    let sdp_part = "--boundary1\r\nContent-Type: application/sdp\r\n\r\nv=0\r\no=- 1 1 IN IP4 0.0.0.0\r\ns=-\r\nt=0 0\r\n--boundary1\r\nContent-Type: application/pidf+xml\r\nContent-ID: <loc@example.com>\r\n\r\n<presence/>\r\n--boundary1--";
    raw.push_str(&format!("Content-Length: {}\r\n\r\n", sdp_part.len()));
    raw.push_str(sdp_part);

    let framed = parse_message(raw.as_bytes()).unwrap();
    let resp = framed.message.as_response().unwrap();
    assert_eq!(resp.status.0, 200);

    let body = MultipartBody::parse(&resp.body, boundary).unwrap();
    assert_eq!(body.0.len(), 2);
    assert!(body.0[0].text().unwrap().starts_with("v=0"));
}

#[test]
fn msrp_uri_round_trips_through_sip_headers() {
    let uri: Uri = "msrp://psap.example.com:2855/9125d1fa;tcp".parse().unwrap();
    assert_eq!(uri.scheme, Scheme::Msrp);
    assert_eq!(uri.path.as_deref(), Some("9125d1fa"));
    assert_eq!(uri.to_string(), "msrp://psap.example.com:2855/9125d1fa;tcp");
}

#[test]
fn tel_uri_normalizes_and_validates_as_request_uri() {
    let req = SipRequest::new(Method::Invite, "tel:+1 818-555-3333".parse().unwrap())
        .with_header(HeaderName::Via, "SIP/2.0/UDP ua.example.com;branch=z9hG4bK1")
        .with_header(HeaderName::From, "<sip:caller@example.com>;tag=1")
        .with_header(HeaderName::To, "<tel:+18185553333>")
        .with_header(HeaderName::CallId, "abc@example.com")
        .with_header(HeaderName::CSeq, "1 INVITE")
        .with_header(HeaderName::MaxForwards, "70");
    assert_eq!(req.uri.user.as_deref(), Some("8185553333"));
    assert!(validate_request(&req).is_ok());
}
