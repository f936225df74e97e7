use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::uri::Uri;

/// One `Call-Info: <uri> ;purpose=...` entry. NG9-1-1 profiles (NENA i3)
/// use `purpose=emergency-CallId` / `purpose=emergency-IncidentId`; this
/// type treats the purpose value as opaque and only guarantees round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallInfo {
    pub uri: Uri,
    pub purpose: Option<String>,
}

impl fmt::Display for CallInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.uri)?;
        if let Some(p) = &self.purpose {
            write!(f, ";purpose={p}")?;
        }
        Ok(())
    }
}

impl std::str::FromStr for CallInfo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s
            .strip_prefix('<')
            .ok_or_else(|| Error::Parse(format!("Call-Info missing '<': {s}")))?;
        let (uri_str, rest) = s
            .split_once('>')
            .ok_or_else(|| Error::Parse(format!("Call-Info missing '>': {s}")))?;
        let uri: Uri = uri_str.parse()?;
        let purpose = rest
            .trim_start_matches(';')
            .trim()
            .strip_prefix("purpose=")
            .map(|p| p.trim_matches('"').to_string());
        Ok(CallInfo { uri, purpose })
    }
}

/// Splits a comma-separated list of `Call-Info` entries, tolerating commas
/// inside bracketed URIs (none expected, but kept simple and correct).
pub fn parse_call_info_list(s: &str) -> Result<Vec<CallInfo>> {
    s.split(',').map(|entry| entry.parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ng911_call_info_purpose() {
        let ci: CallInfo = "<urn:emergency:uid:callid:abc123>;purpose=emergency-CallId"
            .parse()
            .unwrap();
        assert_eq!(ci.purpose.as_deref(), Some("emergency-CallId"));
        assert_eq!(ci.to_string(), "<urn:emergency:uid:callid:abc123>;purpose=emergency-CallId");
    }
}
