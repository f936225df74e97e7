//! Injectable random source (§6.5, §9 "Global random state"). Transaction
//! IDs and session IDs are generated through this trait so tests can be
//! deterministic instead of reading a process-wide global.

use rand::RngCore;

pub trait RandomSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]);
}

/// Default production source, backed by the OS CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn fill(&self, buf: &mut [u8]) {
        rand::rngs::OsRng.fill_bytes(buf);
    }
}

/// Generates a lowercase-hex identifier of `bytes` random bytes, used for
/// MSRP transaction-ids, session-ids, and Message-IDs.
pub fn hex_id(rng: &dyn RandomSource, bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rng.fill(&mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic source for reproducible unit tests.
    pub struct FixedSource(pub Vec<u8>);

    impl RandomSource for FixedSource {
        fn fill(&self, buf: &mut [u8]) {
            let n = buf.len().min(self.0.len());
            buf[..n].copy_from_slice(&self.0[..n]);
        }
    }

    #[test]
    fn fixed_source_produces_stable_ids() {
        let rng = FixedSource(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(hex_id(&rng, 4), "deadbeef");
    }
}
