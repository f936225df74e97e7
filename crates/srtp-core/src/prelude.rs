//! Common imports for consumers of this crate.

pub use crate::config::SrtpConfig;
pub use crate::error::{Error, Result};
pub use crate::suites::{CipherFamily, CryptoSuite};
pub use crate::transform::{srtcp_protect, srtcp_unprotect, SrtpDecryptor, SrtpEncryptor};
