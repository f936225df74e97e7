//! Error taxonomy for the SRTP transform (§7). All variants are
//! caller-level: the packet in question is dropped and the session
//! continues, matching the donor's `MediaTransportError` "report and
//! keep going" convention rather than tearing down the stream.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown SRTP crypto suite: {0}")]
    UnknownSuite(String),

    #[error("master key length {actual} does not match suite requirement {expected}")]
    KeyLength { expected: usize, actual: usize },

    #[error("master salt length {actual} does not match suite requirement {expected}")]
    SaltLength { expected: usize, actual: usize },

    #[error("packet too short to carry a valid header and auth tag")]
    PacketTooShort,

    #[error("authentication tag mismatch")]
    AuthFailed,

    #[error("packet decryption failed")]
    DecryptFailed,

    #[error("replayed or out-of-window packet index")]
    Replayed,
}
