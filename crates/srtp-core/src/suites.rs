//! Crypto suite registry (§4.9). Seven named suites, all HMAC-SHA1
//! authenticated; the AEAD suites in the broader RFC 7714 family are out
//! of scope here, matching the donor's own `SrtpProfile` (which only ever
//! grew AES-CM/GCM variants, never F8) but widened to the key sizes and
//! the F8 cipher mode this spec names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Master salt length is fixed at 112 bits for every suite in this
/// registry (RFC 3711 §8.2).
pub const SALT_LEN: usize = 14;
/// HMAC-SHA1 session auth key length (RFC 3711 §8.2).
pub const AUTH_KEY_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherFamily {
    AesCm,
    AesF8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CryptoSuite {
    AesCm128HmacSha1_80,
    AesCm128HmacSha1_32,
    F8_128HmacSha1_80,
    AesCm192HmacSha1_80,
    AesCm192HmacSha1_32,
    AesCm256HmacSha1_80,
    AesCm256HmacSha1_32,
}

impl CryptoSuite {
    pub const ALL: [CryptoSuite; 7] = [
        CryptoSuite::AesCm128HmacSha1_80,
        CryptoSuite::AesCm128HmacSha1_32,
        CryptoSuite::F8_128HmacSha1_80,
        CryptoSuite::AesCm192HmacSha1_80,
        CryptoSuite::AesCm192HmacSha1_32,
        CryptoSuite::AesCm256HmacSha1_80,
        CryptoSuite::AesCm256HmacSha1_32,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CryptoSuite::AesCm128HmacSha1_80 => "AES_CM_128_HMAC_SHA1_80",
            CryptoSuite::AesCm128HmacSha1_32 => "AES_CM_128_HMAC_SHA1_32",
            CryptoSuite::F8_128HmacSha1_80 => "F8_128_HMAC_SHA1_80",
            CryptoSuite::AesCm192HmacSha1_80 => "AES_192_CM_HMAC_SHA1_80",
            CryptoSuite::AesCm192HmacSha1_32 => "AES_192_CM_HMAC_SHA1_32",
            CryptoSuite::AesCm256HmacSha1_80 => "AES_256_CM_HMAC_SHA1_80",
            CryptoSuite::AesCm256HmacSha1_32 => "AES_256_CM_HMAC_SHA1_32",
        }
    }

    /// Master key length in bytes.
    pub fn key_len(self) -> usize {
        match self {
            CryptoSuite::AesCm128HmacSha1_80
            | CryptoSuite::AesCm128HmacSha1_32
            | CryptoSuite::F8_128HmacSha1_80 => 16,
            CryptoSuite::AesCm192HmacSha1_80 | CryptoSuite::AesCm192HmacSha1_32 => 24,
            CryptoSuite::AesCm256HmacSha1_80 | CryptoSuite::AesCm256HmacSha1_32 => 32,
        }
    }

    pub fn salt_len(self) -> usize {
        SALT_LEN
    }

    pub fn auth_key_len(self) -> usize {
        AUTH_KEY_LEN
    }

    /// Authentication tag length in bytes.
    pub fn tag_len(self) -> usize {
        match self {
            CryptoSuite::AesCm128HmacSha1_80
            | CryptoSuite::F8_128HmacSha1_80
            | CryptoSuite::AesCm192HmacSha1_80
            | CryptoSuite::AesCm256HmacSha1_80 => 10,
            CryptoSuite::AesCm128HmacSha1_32
            | CryptoSuite::AesCm192HmacSha1_32
            | CryptoSuite::AesCm256HmacSha1_32 => 4,
        }
    }

    pub fn cipher_family(self) -> CipherFamily {
        match self {
            CryptoSuite::F8_128HmacSha1_80 => CipherFamily::AesF8,
            _ => CipherFamily::AesCm,
        }
    }
}

impl fmt::Display for CryptoSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CryptoSuite {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CryptoSuite::ALL
            .into_iter()
            .find(|suite| suite.as_str() == s)
            .ok_or_else(|| Error::UnknownSuite(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_suite_name() {
        for suite in CryptoSuite::ALL {
            assert_eq!(suite.as_str().parse::<CryptoSuite>().unwrap(), suite);
        }
    }

    #[test]
    fn rejects_aead_suites_as_out_of_scope() {
        assert!("AEAD_AES_128_GCM".parse::<CryptoSuite>().is_err());
    }

    #[test]
    fn key_lengths_match_suite_bit_width() {
        assert_eq!(CryptoSuite::AesCm128HmacSha1_80.key_len(), 16);
        assert_eq!(CryptoSuite::AesCm192HmacSha1_32.key_len(), 24);
        assert_eq!(CryptoSuite::AesCm256HmacSha1_80.key_len(), 32);
        assert!(CryptoSuite::ALL.iter().all(|s| s.salt_len() == 14));
    }
}
