//! Application event surface (§6.4, §9 "Delegate-based event model").
//! Modeled as a single `#[async_trait]` sink with one method per event
//! rather than a multicast/filter subscription system — the application
//! installs exactly one sink per [`crate::connection::MsrpConnection`].

use async_trait::async_trait;
use ng911_sip_core::Uri;

use crate::message::MsrpRequest;

#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub message_id: Option<String>,
    pub remote_uri: Uri,
    pub status_code: u16,
    pub status_text: String,
}

#[async_trait]
pub trait MsrpEventSink: Send + Sync {
    async fn message_received(&self, content_type: Option<String>, bytes: Vec<u8>, from: Uri);

    async fn message_delivery_failed(&self, message: MsrpRequest, failure: DeliveryFailure);

    async fn report_received(
        &self,
        message_id: Option<String>,
        total_bytes: u64,
        status_code: u16,
        status_text: Option<String>,
    );

    async fn connection_established(&self, is_passive: bool, remote_uri: Uri);

    async fn connection_failed(&self, remote_uri: Option<Uri>, reason: String);
}

/// A no-op sink, useful as a default or in tests that only care about one
/// event kind overriding the rest.
pub struct NullEventSink;

#[async_trait]
impl MsrpEventSink for NullEventSink {
    async fn message_received(&self, _content_type: Option<String>, _bytes: Vec<u8>, _from: Uri) {}

    async fn message_delivery_failed(&self, _message: MsrpRequest, _failure: DeliveryFailure) {}

    async fn report_received(
        &self,
        _message_id: Option<String>,
        _total_bytes: u64,
        _status_code: u16,
        _status_text: Option<String>,
    ) {
    }

    async fn connection_established(&self, _is_passive: bool, _remote_uri: Uri) {}

    async fn connection_failed(&self, _remote_uri: Option<Uri>, _reason: String) {}
}
