//! AES-CM key derivation PRF (§4.10, RFC 3711 §4.3 / RFC 6188). Grounded
//! on the donor's `aes_cm_prf`/`derive_session_keys` shape
//! (`other_examples` RustyRTC `srtp_context.rs`), generalized from that
//! file's `index == 0`/`kdr == 0` special case to the full `r =
//! index / kdr`, 6-octet big-endian `r` construction the spec requires,
//! and widened from AES-128-only to AES-128/192/256.

use aes::{Aes128, Aes192, Aes256};
use ctr::cipher::generic_array::GenericArray;
use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::error::{Error, Result};
use crate::suites::{CryptoSuite, AUTH_KEY_LEN, SALT_LEN};

type Ctr128Be<C> = ctr::Ctr128BE<C>;

pub const LABEL_RTP_ENCRYPTION: u8 = 0x00;
pub const LABEL_RTP_AUTH: u8 = 0x01;
pub const LABEL_RTP_SALT: u8 = 0x02;
pub const LABEL_RTCP_ENCRYPTION: u8 = 0x03;
pub const LABEL_RTCP_AUTH: u8 = 0x04;
pub const LABEL_RTCP_SALT: u8 = 0x05;

#[derive(Clone, Debug)]
pub struct SessionKeys {
    pub enc_key: Vec<u8>,
    pub auth_key: [u8; AUTH_KEY_LEN],
    pub salt: [u8; SALT_LEN],
}

/// RFC 3711 §4.3.1: `r = index / kdr` (0 when `kdr == 0`), `key_id =
/// label || r` left-padded with zero to the salt's length, XORed with
/// the master salt, right-extended with two zero octets to form a
/// 16-octet AES-CM IV. The keystream produced by encrypting an
/// all-zero block under that IV is the derived key material.
fn derive(master_key: &[u8], master_salt: &[u8; SALT_LEN], label: u8, index: u64, kdr: u64, out: &mut [u8]) -> Result<()> {
    let r = if kdr == 0 { 0 } else { index / kdr };
    let mut key_id = [0u8; 7];
    key_id[0] = label;
    key_id[1..7].copy_from_slice(&r.to_be_bytes()[2..8]);

    let mut x = *master_salt;
    for (byte, k) in x[SALT_LEN - 7..].iter_mut().zip(key_id.iter()) {
        *byte ^= k;
    }

    let mut iv = [0u8; 16];
    iv[..SALT_LEN].copy_from_slice(&x);

    out.iter_mut().for_each(|b| *b = 0);
    let iv = GenericArray::from_slice(&iv);
    match master_key.len() {
        16 => {
            let mut cipher = Ctr128Be::<Aes128>::new(GenericArray::from_slice(master_key), iv);
            cipher.apply_keystream(out);
        }
        24 => {
            let mut cipher = Ctr128Be::<Aes192>::new(GenericArray::from_slice(master_key), iv);
            cipher.apply_keystream(out);
        }
        32 => {
            let mut cipher = Ctr128Be::<Aes256>::new(GenericArray::from_slice(master_key), iv);
            cipher.apply_keystream(out);
        }
        other => {
            return Err(Error::KeyLength {
                expected: 16,
                actual: other,
            })
        }
    }
    Ok(())
}

/// Derives the session encryption key, session auth key, and session
/// salt for one direction (SRTP labels 0x00-0x02) from a master
/// key/salt pair, at a given key-derivation index.
pub fn derive_srtp_session_keys(
    suite: CryptoSuite,
    master_key: &[u8],
    master_salt: &[u8],
    kdr: u64,
    index: u64,
) -> Result<SessionKeys> {
    derive_session_keys(suite, master_key, master_salt, kdr, index, LABEL_RTP_ENCRYPTION, LABEL_RTP_AUTH, LABEL_RTP_SALT)
}

/// Same derivation, using the SRTCP label set (0x03-0x05).
pub fn derive_srtcp_session_keys(
    suite: CryptoSuite,
    master_key: &[u8],
    master_salt: &[u8],
    kdr: u64,
    index: u64,
) -> Result<SessionKeys> {
    derive_session_keys(suite, master_key, master_salt, kdr, index, LABEL_RTCP_ENCRYPTION, LABEL_RTCP_AUTH, LABEL_RTCP_SALT)
}

fn derive_session_keys(
    suite: CryptoSuite,
    master_key: &[u8],
    master_salt: &[u8],
    kdr: u64,
    index: u64,
    enc_label: u8,
    auth_label: u8,
    salt_label: u8,
) -> Result<SessionKeys> {
    if master_key.len() != suite.key_len() {
        return Err(Error::KeyLength {
            expected: suite.key_len(),
            actual: master_key.len(),
        });
    }
    if master_salt.len() != suite.salt_len() {
        return Err(Error::SaltLength {
            expected: suite.salt_len(),
            actual: master_salt.len(),
        });
    }
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(master_salt);

    let mut enc_key = vec![0u8; suite.key_len()];
    derive(master_key, &salt, enc_label, index, kdr, &mut enc_key)?;

    let mut auth_key = [0u8; AUTH_KEY_LEN];
    derive(master_key, &salt, auth_label, index, kdr, &mut auth_key)?;

    let mut session_salt = [0u8; SALT_LEN];
    derive(master_key, &salt, salt_label, index, kdr, &mut session_salt)?;

    Ok(SessionKeys {
        enc_key,
        auth_key,
        salt: session_salt,
    })
}
