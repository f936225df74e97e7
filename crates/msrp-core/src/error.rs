//! Error taxonomy for the MSRP connection engine (§7), restricted to the
//! variant groups this crate actually produces: `ParseError`,
//! `ProtocolError`, `NetworkError`, and `Overflow`. Validation of MSRP-URI
//! shape is folded into `Parse` since it's a structural grammar concern.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("malformed MSRP transaction: {0}")]
    Parse(String),

    #[error("invalid MSRP URI: {0}")]
    InvalidUri(String),

    #[error("message exceeds configured maximum size ({limit} bytes)")]
    Overflow { limit: usize },

    #[error("MSRP transport error: {0}")]
    Network(String),

    #[error("MSRP protocol violation: {0}")]
    Protocol(String),

    #[error("connection is closed")]
    ConnectionClosed,

    #[error("TLS error: {0}")]
    Tls(String),
}

impl From<ng911_sip_core::Error> for Error {
    fn from(err: ng911_sip_core::Error) -> Self {
        Error::InvalidUri(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Network(err.to_string())
    }
}
