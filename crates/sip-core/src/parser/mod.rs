//! nom-based grammar parsers for SIP/SDP wire syntax.

pub mod common_chars;
pub mod message;
pub mod separators;
pub mod uri;
pub mod whitespace;
