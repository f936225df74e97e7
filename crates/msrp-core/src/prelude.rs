//! Common imports for consumers of this crate.

pub use crate::config::MsrpConfig;
pub use crate::connection::{ConnectionState, MsrpConnection};
pub use crate::error::{Error, Result};
pub use crate::events::{DeliveryFailure, MsrpEventSink, NullEventSink};
pub use crate::message::{
    validate_msrp_uri, ByteRange, CompletionStatus, MsrpMethod, MsrpRequest, MsrpResponse, MsrpTransaction,
};
pub use crate::rng::{OsRandomSource, RandomSource};
pub use crate::tls::{InsecureAcceptAny, TlsVerifier};
