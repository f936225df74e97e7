//! Common SDP imports, re-exported separately from [`crate::prelude`] since
//! the `sdp` feature can be disabled.

pub use crate::sdp::answer::{answer_session, AnswerCapabilities, PortManager};
pub use crate::sdp::attributes::{Attribute, Crypto, Direction, Fingerprint, Fmtp, RtpMap, Setup};
pub use crate::sdp::media::{MediaDescription, MediaType};
pub use crate::sdp::parser::parse_sdp;
pub use crate::sdp::session::{ConnectionData, Origin, Session, Timing};
