use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A SIP response status code, 100-699 per RFC 3261 §21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub fn new(code: u16) -> Result<Self, Error> {
        if (100..=699).contains(&code) {
            Ok(StatusCode(code))
        } else {
            Err(Error::InvalidStatusCode(code))
        }
    }

    pub fn is_provisional(&self) -> bool {
        (100..200).contains(&self.0)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.0)
    }

    /// Default reason phrase for the handful of codes this core emits
    /// itself (MSRP-adjacent SIP responses); anything else falls back to
    /// an empty phrase rather than guessing.
    pub fn default_reason(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            481 => "Call/Transaction Does Not Exist",
            501 => "Not Implemented",
            503 => "Service Unavailable",
            _ => "",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_codes() {
        assert!(StatusCode::new(42).is_err());
        assert!(StatusCode::new(999).is_err());
        assert!(StatusCode::new(200).is_ok());
    }
}
