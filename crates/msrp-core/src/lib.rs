//! # ng911-msrp-core
//!
//! RFC 4975 MSRP connection engine for NG9-1-1 message sessions: chunked
//! message framing, the connection state machine (client/server, plain TCP
//! or TLS), and the RFC 3862 CPIM codec carried inside MSRP bodies.
//!
//! The crate is structured around:
//!
//! - [`message`] — typed request/response model and the MSRP URI transport
//!   check.
//! - [`codec`] — wire encode/decode for one complete transaction buffer.
//! - [`stream_parser`] — byte-at-a-time framer that recognizes transaction
//!   boundaries in an incoming TCP stream.
//! - [`connection`] — the connection state machine: client connect, server
//!   listen, chunked send, reassembly, and the transmit retry/timeout loop.
//! - [`cpim`] — RFC 3862 CPIM codec for SEND bodies.
//! - [`events`] — the application-facing event sink trait.
//! - [`tls`] — host-injectable peer certificate verification policy.
//! - [`rng`] — host-injectable random source for transaction/session ids.

pub mod codec;
pub mod config;
pub mod connection;
pub mod cpim;
pub mod error;
pub mod events;
pub mod message;
pub mod rng;
pub mod stream_parser;
pub mod tls;

pub mod prelude;

pub use error::{Error, Result};
pub use message::{ByteRange, CompletionStatus, MsrpMethod, MsrpRequest, MsrpResponse, MsrpTransaction};
