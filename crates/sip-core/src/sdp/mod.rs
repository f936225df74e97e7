//! Session Description Protocol support (RFC 8866): session/media model,
//! attribute grammar, line-dispatch parser, and the offer/answer engine.

pub mod answer;
pub mod attributes;
pub mod media;
pub mod parser;
pub mod session;

pub use answer::{answer_session, AnswerCapabilities, PortManager};
pub use attributes::Attribute;
pub use media::MediaDescription;
pub use parser::parse_sdp;
pub use session::{ConnectionData, Origin, Session};
