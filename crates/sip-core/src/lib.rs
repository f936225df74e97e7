//! # ng911-sip-core
//!
//! SIP message parsing, SDP offer/answer, and RFC 6442 Geolocation header
//! support for an NG9-1-1 signaling core.
//!
//! The crate is structured around:
//!
//! - [`types`] — URI, header, method, status, and message model.
//! - [`parser`] — nom-based wire-grammar parsers and the message framer.
//! - [`validation`] — request-level semantic checks (§4.3).
//! - [`sdp`] — session/media model, attribute grammar, and the answer
//!   engine (behind the `sdp` feature, enabled by default).
//!
//! ## Feature flags
//!
//! - `sdp` (default) — enables SDP parsing and the offer/answer engine.
//! - `lenient_parsing` — relaxes a handful of grammar productions (e.g.
//!   bare-LF line endings) to accept RFC 4475 torture-test inputs that
//!   the strict grammar correctly rejects.

pub mod buffer;
pub mod error;
pub mod parser;
#[cfg(feature = "sdp")]
pub mod sdp;
pub mod types;
pub mod validation;

pub mod prelude;
#[cfg(feature = "sdp")]
pub mod sdp_prelude;

pub use error::{Error, Result};
pub use types::{Header, HeaderName, Headers, Host, Method, Scheme, SipMessage, StatusCode, Uri};
