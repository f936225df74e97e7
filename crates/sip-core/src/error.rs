use std::io;
use std::str::Utf8Error;

use thiserror::Error;

/// Result alias for this crate's fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for SIP/SDP parsing and validation.
///
/// Variants are grouped to match the crate-wide error design: structural
/// grammar failures (`Parse*`), semantically-invalid-but-well-formed
/// messages (`Validation`), and an `Overflow` case for messages exceeding
/// configured limits.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("invalid SIP method")]
    InvalidMethod,

    #[error("invalid SIP URI: {0}")]
    InvalidUri(String),

    #[error("invalid SIP version")]
    InvalidVersion,

    #[error("invalid status code: {0}")]
    InvalidStatusCode(u16),

    #[error("malformed start line: {0}")]
    MalformedStartLine(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("incomplete message: need more data")]
    Incomplete,

    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("duplicate singleton header: {0}")]
    DuplicateHeader(&'static str),

    #[error("Content-Length mismatch: expected {expected}, got {actual}")]
    ContentLengthMismatch { expected: i64, actual: usize },

    #[error("negative or oversize Content-Length: {0}")]
    InvalidContentLength(i64),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("message exceeds configured maximum size ({limit} bytes)")]
    Overflow { limit: usize },

    #[error("malformed URI component {component}: {message}")]
    MalformedUriComponent {
        component: &'static str,
        message: String,
    },

    #[error("SDP error: {0}")]
    Sdp(String),

    #[error("SDP validation error: {0}")]
    SdpValidation(String),

    #[error("invalid UTF-8 sequence: {0}")]
    Utf8(#[from] Utf8Error),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("{0}")]
    Other(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::Parse(format!("failed to parse integer: {err}"))
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a str>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&'a str>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::Incomplete,
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                Error::Parse(format!("at {:?}: {:?}", &e.input[..e.input.len().min(32)], e.code))
            }
        }
    }
}

impl<'a> From<nom::Err<nom::error::Error<&'a [u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&'a [u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(_) => Error::Incomplete,
            nom::Err::Error(e) | nom::Err::Failure(e) => {
                Error::Parse(format!("byte parse failure: {:?}", e.code))
            }
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
