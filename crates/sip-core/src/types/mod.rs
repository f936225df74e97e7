//! Typed SIP message model: URIs, headers, requests/responses, and the
//! multipart body decomposer.

pub mod call_info;
pub mod geolocation;
pub mod header;
pub mod method;
pub mod multipart;
pub mod param;
pub mod sip_message;
pub mod status;
pub mod uri;
pub mod via;

pub use call_info::CallInfo;
pub use geolocation::{Geolocation, GeolocationError, GeolocationRef, GeolocationRouting};
pub use header::{Header, HeaderName, Headers};
pub use method::Method;
pub use multipart::MultipartBody;
pub use param::Param;
pub use sip_message::{SipMessage, SipRequest, SipResponse};
pub use status::StatusCode;
pub use uri::{Host, Scheme, Uri};
pub use via::Via;
