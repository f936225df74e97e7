//! Tunables for one SRTP session (§1A), following the donor's
//! `rtp-core/src/api/common/srtp.rs::SrtpConfig` naming.

use serde::{Deserialize, Serialize};

use crate::suites::CryptoSuite;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SrtpConfig {
    pub suite: CryptoSuite,
    /// Key derivation rate: a packet-index divisor controlling how
    /// often session keys are rederived. 0 disables rekeying.
    pub key_derivation_rate: u64,
    /// Length of the MKI field in octets, appended after the payload
    /// and before the auth tag on the wire. 0 means no MKI is used.
    pub mki_len: usize,
}

impl Default for SrtpConfig {
    fn default() -> Self {
        SrtpConfig {
            suite: CryptoSuite::AesCm128HmacSha1_80,
            key_derivation_rate: 0,
            mki_len: 0,
        }
    }
}

impl SrtpConfig {
    pub fn with_suite(mut self, suite: CryptoSuite) -> Self {
        self.suite = suite;
        self
    }

    pub fn with_key_derivation_rate(mut self, rate: u64) -> Self {
        self.key_derivation_rate = rate;
        self
    }

    pub fn with_mki_len(mut self, len: usize) -> Self {
        self.mki_len = len;
        self
    }
}
