//! Tunables named explicitly in §1A / §4.7, collected per the ambient-stack
//! convention: one `Config` struct per crate, `Default` matching the spec's
//! defaults, builder-style setters, `serde` so a host can load it from
//! TOML/JSON.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsrpConfig {
    /// Maximum accumulated size of one MSRP transaction before the stream
    /// parser resets silently.
    pub max_message_length: usize,
    /// Per-request transmit timeout, in milliseconds.
    pub transmit_timeout_ms: u64,
    /// Total attempts (including the first) before a send is abandoned.
    pub retry_attempts: u32,
    /// Outbound chunk size for `SendMsrpMessage` splitting.
    pub chunk_size: usize,
    /// Bound on the transmit-queue semaphore wait, so the transmit task can
    /// observe cancellation promptly.
    pub semaphore_poll_interval_ms: u64,
}

impl Default for MsrpConfig {
    fn default() -> Self {
        MsrpConfig {
            max_message_length: 10_000,
            transmit_timeout_ms: 500,
            retry_attempts: 3,
            chunk_size: 2048,
            semaphore_poll_interval_ms: 100,
        }
    }
}

impl MsrpConfig {
    pub fn with_max_message_length(mut self, limit: usize) -> Self {
        self.max_message_length = limit;
        self
    }

    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn transmit_timeout(&self) -> Duration {
        Duration::from_millis(self.transmit_timeout_ms)
    }

    pub fn semaphore_poll_interval(&self) -> Duration {
        Duration::from_millis(self.semaphore_poll_interval_ms)
    }
}
