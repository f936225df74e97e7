//! Common imports for consumers of this crate.

pub use crate::error::{Error, Result};
pub use crate::parser::message::{parse_message, Framed};
pub use crate::types::{
    CallInfo, Geolocation, GeolocationError, GeolocationRef, GeolocationRouting, Header,
    HeaderName, Headers, Host, Method, MultipartBody, Scheme, SipMessage, SipRequest,
    SipResponse, StatusCode, Uri, Via,
};
pub use crate::validation::validate_request;
