//! MSRP connection engine (§4.7, §5, §9). A connection owns exactly one
//! long-running transmit task and drives reads through I/O completion; the
//! transmit task is the only writer to the network stream, matching the
//! "async I/O callbacks with shared mutable fields → task + channels"
//! re-architecture called out in §9.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv6Addr, SocketAddr, ToSocketAddrs};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use ng911_sip_core::{Host, Scheme, Uri};
use rustls::pki_types::ServerName;
use rustls::ClientConfig;
use tokio::io::{split, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio_rustls::{client::TlsStream, TlsConnector};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::codec;
use crate::config::MsrpConfig;
use crate::error::{Error, Result};
use crate::events::{DeliveryFailure, MsrpEventSink};
use crate::message::{ByteRange, CompletionStatus, MsrpMethod, MsrpRequest, MsrpResponse, MsrpTransaction};
use crate::rng::{hex_id, RandomSource};
use crate::stream_parser::MsrpStreamParser;
use crate::tls::TlsVerifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Listening,
    Authenticating,
    Established,
    ShuttingDown,
    Closed,
}

trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> AsyncStream for T {}

type BoxedStream = Box<dyn AsyncStream>;
type PendingMap = Arc<Mutex<HashMap<String, oneshot::Sender<MsrpResponse>>>>;

/// Accumulator for an in-progress reassembly of a chunked SEND, keyed by
/// `(from-path, message-id)`.
#[derive(Default)]
struct Reassembly {
    content_type: Option<String>,
    chunks: Vec<Vec<u8>>,
}

pub struct MsrpConnection {
    config: MsrpConfig,
    local_uri: Uri,
    remote_uri: Mutex<Option<Uri>>,
    state: Mutex<ConnectionState>,
    cancellation: CancellationToken,
    sink: Arc<dyn MsrpEventSink>,
    request_tx: mpsc::Sender<MsrpRequest>,
    response_tx: mpsc::Sender<MsrpResponse>,
    request_rx: Mutex<Option<mpsc::Receiver<MsrpRequest>>>,
    response_rx: Mutex<Option<mpsc::Receiver<MsrpResponse>>>,
    pending: PendingMap,
    reassembly: Mutex<HashMap<(String, String), Reassembly>>,
}

impl MsrpConnection {
    fn new(local_uri: Uri, remote_uri: Option<Uri>, config: MsrpConfig, sink: Arc<dyn MsrpEventSink>) -> Self {
        let (request_tx, request_rx) = mpsc::channel(64);
        let (response_tx, response_rx) = mpsc::channel(64);
        MsrpConnection {
            config,
            local_uri,
            remote_uri: Mutex::new(remote_uri),
            state: Mutex::new(ConnectionState::Idle),
            cancellation: CancellationToken::new(),
            sink,
            request_tx,
            response_tx,
            request_rx: Mutex::new(Some(request_rx)),
            response_rx: Mutex::new(Some(response_rx)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            reassembly: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().expect("state mutex poisoned")
    }

    fn set_state(&self, state: ConnectionState) {
        info!(?state, "MSRP connection state transition");
        *self.state.lock().expect("state mutex poisoned") = state;
    }

    pub fn local_uri(&self) -> &Uri {
        &self.local_uri
    }

    pub fn remote_uri(&self) -> Option<Uri> {
        self.remote_uri.lock().expect("remote_uri mutex poisoned").clone()
    }

    /// Establishes a client connection: connects, upgrades to TLS if the
    /// remote scheme is `msrps`, then emits a bodyless probe SEND once
    /// established (§4.7).
    pub async fn connect(
        remote_uri: Uri,
        local_uri: Uri,
        config: MsrpConfig,
        sink: Arc<dyn MsrpEventSink>,
        rng: Arc<dyn RandomSource>,
        tls: Option<Arc<dyn TlsVerifier>>,
    ) -> Result<Arc<Self>> {
        let addr = resolve_addr(&remote_uri)?;
        let conn = Arc::new(Self::new(local_uri, Some(remote_uri.clone()), config, sink.clone()));
        conn.set_state(ConnectionState::Connecting);

        let tcp = match TcpStream::connect(addr).await {
            Ok(s) => s,
            Err(e) => {
                conn.set_state(ConnectionState::Closed);
                sink.connection_failed(Some(remote_uri), e.to_string()).await;
                return Err(Error::from(e));
            }
        };

        let stream: BoxedStream = if remote_uri.scheme == Scheme::Msrps {
            conn.set_state(ConnectionState::Authenticating);
            let verifier = tls.ok_or_else(|| Error::Tls("msrps requires a TlsVerifier".into()))?;
            match upgrade_client_tls(tcp, &remote_uri, verifier).await {
                Ok(s) => Box::new(s),
                Err(e) => {
                    conn.set_state(ConnectionState::Closed);
                    sink.connection_failed(Some(remote_uri), e.to_string()).await;
                    return Err(e);
                }
            }
        } else {
            Box::new(tcp)
        };

        conn.set_state(ConnectionState::Established);
        conn.spawn_io(stream, rng.clone());
        conn.sink.connection_established(false, remote_uri).await;

        let mut probe = MsrpRequest::new(hex_id(rng.as_ref(), 4), MsrpMethod::Send);
        probe.to_path = vec![conn.remote_uri().expect("remote set above")];
        probe.from_path = vec![conn.local_uri.clone()];
        probe.completion = CompletionStatus::Complete;
        let _ = conn.request_tx.send(probe).await;

        Ok(conn)
    }

    /// Listens for inbound peers, rejecting any remote whose address does
    /// not match the pre-agreed `expected_remote` from SDP negotiation.
    /// Only one concurrent peer is served; a fresh accept pre-empts
    /// whichever connection is currently active.
    pub async fn listen(
        bind_addr: SocketAddr,
        local_uri: Uri,
        expected_remote: Uri,
        config: MsrpConfig,
        sink: Arc<dyn MsrpEventSink>,
        rng: Arc<dyn RandomSource>,
    ) -> Result<Arc<Self>> {
        let conn = Arc::new(Self::new(local_uri, Some(expected_remote.clone()), config, sink));
        conn.set_state(ConnectionState::Listening);

        let listener = TcpListener::bind(bind_addr).await?;
        let expected_addr = resolve_addr(&expected_remote)?;

        let accept_conn = conn.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = accept_conn.cancellation.cancelled() => break,
                    accepted = listener.accept() => {
                        let Ok((tcp, peer)) = accepted else { continue };
                        if peer.ip() != expected_addr.ip() {
                            warn!(%peer, "rejecting MSRP peer not matching SDP-negotiated endpoint");
                            continue;
                        }
                        // A second accept pre-empts the first: re-arming the
                        // transmit/reader pair replaces whatever was wired
                        // up before, since only one peer is served at a time.
                        accept_conn.set_state(ConnectionState::Established);
                        accept_conn.spawn_io(Box::new(tcp), rng.clone());
                        accept_conn.sink.connection_established(true, expected_remote.clone()).await;
                    }
                }
            }
        });

        Ok(conn)
    }

    fn spawn_io(self: &Arc<Self>, stream: BoxedStream, rng: Arc<dyn RandomSource>) {
        let (read_half, write_half) = split(stream);
        let request_rx = self
            .request_rx
            .lock()
            .expect("request_rx mutex poisoned")
            .take()
            .expect("spawn_io must only run once per accepted connection");
        let response_rx = self
            .response_rx
            .lock()
            .expect("response_rx mutex poisoned")
            .take()
            .expect("spawn_io must only run once per accepted connection");

        let reader = self.clone();
        tokio::spawn(async move { reader.run_reader(read_half).await });

        let writer = self.clone();
        tokio::spawn(async move { writer.run_transmit(write_half, request_rx, response_rx, rng).await });
    }

    async fn run_reader<R: AsyncRead + Unpin>(self: Arc<Self>, mut read_half: ReadHalf<R>) {
        let mut parser = MsrpStreamParser::new(&self.config);
        let mut buf = [0u8; 8192];
        loop {
            tokio::select! {
                _ = self.cancellation.cancelled() => break,
                result = read_half.read(&mut buf) => {
                    match result {
                        Ok(0) => {
                            self.set_state(ConnectionState::Closed);
                            self.sink.connection_failed(self.remote_uri(), "peer closed connection".into()).await;
                            self.cancellation.cancel();
                            break;
                        }
                        Ok(n) => {
                            for txn_bytes in parser.feed(&buf[..n]) {
                                match codec::decode(&txn_bytes) {
                                    Ok(txn) => self.handle_transaction(txn).await,
                                    Err(e) => warn!(error = %e, "dropping malformed MSRP transaction"),
                                }
                            }
                        }
                        Err(e) => {
                            if self.state() == ConnectionState::ShuttingDown || self.state() == ConnectionState::Closed {
                                break;
                            }
                            warn!(error = %e, "MSRP read error");
                            self.set_state(ConnectionState::Closed);
                            self.sink.connection_failed(self.remote_uri(), e.to_string()).await;
                            self.cancellation.cancel();
                            break;
                        }
                    }
                }
            }
        }
    }

    async fn handle_transaction(&self, txn: MsrpTransaction) {
        match txn {
            MsrpTransaction::Request(req) => self.handle_request(req).await,
            MsrpTransaction::Response(resp) => self.handle_response(resp).await,
        }
    }

    async fn handle_response(&self, resp: MsrpResponse) {
        let sender = self.pending.lock().expect("pending mutex poisoned").remove(&resp.txn_id);
        if let Some(sender) = sender {
            let _ = sender.send(resp);
        } else {
            warn!(txn_id = %resp.txn_id, "response with no matching in-flight request");
        }
    }

    async fn handle_request(&self, req: MsrpRequest) {
        if !req.method.is_known() {
            self.reply(&req, 501, Some("Not Implemented".into())).await;
            return;
        }

        match req.method {
            MsrpMethod::Send => self.handle_send(req).await,
            MsrpMethod::Report => {
                self.handle_report(&req).await;
                self.reply(&req, 200, Some("OK".into())).await;
            }
            MsrpMethod::Nickname => self.reply(&req, 200, Some("OK".into())).await,
            MsrpMethod::Extension(_) => unreachable!("handled by is_known() above"),
        }
    }

    async fn handle_send(&self, req: MsrpRequest) {
        self.reply(&req, 200, Some("OK".into())).await;

        let from = req.from_path.first().cloned();
        let Some(message_id) = req.message_id.clone() else {
            // A bodyless probe SEND has no Message-ID and nothing to
            // reassemble or deliver.
            return;
        };
        let key = (from.as_ref().map(Uri::to_string).unwrap_or_default(), message_id);

        match req.completion {
            CompletionStatus::Continuation => {
                let mut table = self.reassembly.lock().expect("reassembly mutex poisoned");
                let entry = table.entry(key).or_default();
                entry.content_type = req.content_type.clone();
                entry.chunks.push(req.body.clone());
            }
            CompletionStatus::Truncated => {
                self.reassembly.lock().expect("reassembly mutex poisoned").remove(&key);
            }
            CompletionStatus::Complete | CompletionStatus::Unknown => {
                let full = match self.reassembly.lock().expect("reassembly mutex poisoned").remove(&key) {
                    Some(mut entry) => {
                        entry.chunks.push(req.body.clone());
                        entry.chunks.concat()
                    }
                    None => req.body.clone(),
                };
                let content_type = req.content_type.clone();
                self.sink
                    .message_received(content_type, full, from.clone().unwrap_or_else(|| self.local_uri.clone()))
                    .await;

                if req.success_report == Some(true) {
                    self.send_report(&req, 200, "OK").await;
                }
                // §4.7: a failure report is owed only when no listener
                // exists; this connection always has exactly one sink
                // installed, so that branch never fires here.
            }
        }
    }

    async fn handle_report(&self, req: &MsrpRequest) {
        let total = req.byte_range.and_then(|r| r.total).unwrap_or(0);
        let (code, text) = parse_status(req.status.as_deref());
        self.sink.report_received(req.message_id.clone(), total, code, text).await;
    }

    /// Fires a REPORT back toward the sender of `original`. REPORTs are
    /// fire-and-forget per §4.7 — queued through the request channel but
    /// never awaited by the transmit task.
    async fn send_report(&self, original: &MsrpRequest, status_code: u16, status_text: &str) {
        let mut report = MsrpRequest::new(format!("r{}", &original.txn_id), MsrpMethod::Report);
        report.to_path = original.from_path.clone();
        report.from_path = vec![self.local_uri.clone()];
        report.message_id = original.message_id.clone();
        report.status = Some(format!("000 {status_code} {status_text}"));
        if let Some(range) = original.byte_range {
            report.byte_range = Some(range);
        }
        report.completion = CompletionStatus::Complete;
        let _ = self.request_tx.send(report).await;
    }

    async fn reply(&self, req: &MsrpRequest, code: u16, reason: Option<String>) {
        let mut resp = MsrpResponse::new(req.txn_id.clone(), code, reason);
        resp.to_path = req.from_path.clone();
        resp.from_path = vec![self.local_uri.clone()];
        let _ = self.response_tx.send(resp).await;
    }

    async fn run_transmit<W: AsyncWrite + Unpin>(
        self: Arc<Self>,
        mut write_half: WriteHalf<W>,
        mut request_rx: mpsc::Receiver<MsrpRequest>,
        mut response_rx: mpsc::Receiver<MsrpResponse>,
        _rng: Arc<dyn RandomSource>,
    ) {
        loop {
            // Drain the response queue without waiting — responses are
            // priority traffic (§4.7).
            while let Ok(resp) = response_rx.try_recv() {
                if write_half.write_all(&codec::encode_response(&resp)).await.is_err() {
                    return;
                }
            }

            tokio::select! {
                _ = self.cancellation.cancelled() => return,
                resp = response_rx.recv() => {
                    match resp {
                        Some(resp) => { let _ = write_half.write_all(&codec::encode_response(&resp)).await; }
                        None => return,
                    }
                }
                req = tokio::time::timeout(self.config.semaphore_poll_interval(), request_rx.recv()) => {
                    match req {
                        Ok(Some(request)) => self.transmit_one(&mut write_half, request).await,
                        Ok(None) => return,
                        Err(_elapsed) => continue,
                    }
                }
            }
        }
    }

    async fn transmit_one<W: AsyncWrite + Unpin>(&self, write_half: &mut WriteHalf<W>, request: MsrpRequest) {
        if request.method == MsrpMethod::Report {
            let _ = write_half.write_all(&codec::encode_request(&request)).await;
            return;
        }

        let bytes = codec::encode_request(&request);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let (tx, rx) = oneshot::channel();
            self.pending.lock().expect("pending mutex poisoned").insert(request.txn_id.clone(), tx);

            if write_half.write_all(&bytes).await.is_err() {
                self.pending.lock().expect("pending mutex poisoned").remove(&request.txn_id);
                self.sink.message_delivery_failed(request, delivery_failure(self, 503, "Send Failed")).await;
                return;
            }
            let sent_at = Instant::now();

            match tokio::time::timeout(self.config.transmit_timeout(), rx).await {
                Ok(Ok(resp)) if resp.code == 200 => return,
                Ok(Ok(resp)) => {
                    self.pending.lock().expect("pending mutex poisoned").remove(&request.txn_id);
                    let reason = resp.reason.unwrap_or_default();
                    self.sink
                        .message_delivery_failed(request, delivery_failure(self, resp.code, &reason))
                        .await;
                    return;
                }
                Ok(Err(_)) | Err(_) => {
                    let _ = Instant::now().duration_since(sent_at); // elapsed, per §9: Instant-based, never wall-clock
                    self.pending.lock().expect("pending mutex poisoned").remove(&request.txn_id);
                    if attempts >= self.config.retry_attempts {
                        self.sink.message_delivery_failed(request, delivery_failure(self, 481, "Timeout")).await;
                        return;
                    }
                }
            }
        }
    }

    /// Sends a message, splitting it into at-most-`chunk_size` chunks
    /// (§4.7, §8 scenario 3). Returns the Message-ID used for all chunks.
    pub async fn send_message(
        &self,
        content_type: &str,
        payload: &[u8],
        message_id: Option<String>,
        rng: &dyn RandomSource,
    ) -> Result<String> {
        let remote = self.remote_uri().ok_or_else(|| Error::Protocol("no remote endpoint set".into()))?;
        let explicit_id = message_id.is_some();
        let message_id = message_id.unwrap_or_else(|| hex_id(rng, 8));
        let total = payload.len() as u64;
        let chunk_size = self.config.chunk_size.max(1);

        let chunks: Vec<&[u8]> = if payload.is_empty() { vec![&payload[..]] } else { payload.chunks(chunk_size).collect() };
        let last = chunks.len() - 1;

        for (i, chunk) in chunks.iter().enumerate() {
            let start = (i * chunk_size) as u64 + 1;
            let end = start + chunk.len() as u64 - 1;
            let mut req = MsrpRequest::new(hex_id(rng, 4), MsrpMethod::Send);
            req.to_path = vec![remote.clone()];
            req.from_path = vec![self.local_uri.clone()];
            req.message_id = Some(message_id.clone());
            req.content_type = Some(content_type.to_string());
            req.byte_range = Some(ByteRange::new(start, end, total));
            req.body = chunk.to_vec();
            req.completion = if i == last { CompletionStatus::Complete } else { CompletionStatus::Continuation };
            if explicit_id {
                req.success_report = Some(true);
                req.failure_report = Some(true);
            }
            self.request_tx
                .send(req)
                .await
                .map_err(|_| Error::ConnectionClosed)?;
        }

        Ok(message_id)
    }

    /// Closes every socket, cancels the transmit task, and lets subsequent
    /// I/O errors be swallowed (§4.7 resource discipline).
    pub fn shutdown(&self) {
        self.set_state(ConnectionState::ShuttingDown);
        self.cancellation.cancel();
        self.set_state(ConnectionState::Closed);
    }
}

fn delivery_failure(conn: &MsrpConnection, status_code: u16, status_text: &str) -> DeliveryFailure {
    DeliveryFailure {
        message_id: None,
        remote_uri: conn.remote_uri().unwrap_or_else(|| conn.local_uri.clone()),
        status_code,
        status_text: status_text.to_string(),
    }
}

/// Parses a Status header of the form `namespace code [text]`
/// (RFC 4975 §7.1); absent or malformed status defaults to 200/OK.
fn parse_status(status: Option<&str>) -> (u16, Option<String>) {
    let Some(status) = status else { return (200, None) };
    let mut parts = status.split_whitespace();
    let _namespace = parts.next();
    let code = parts.next().and_then(|c| c.parse().ok()).unwrap_or(200);
    let text = parts.collect::<Vec<_>>().join(" ");
    (code, if text.is_empty() { None } else { Some(text) })
}

/// Performs the client-side TLS handshake for an `msrps` connection, using
/// the host-supplied [`TlsVerifier`] policy in place of the platform trust
/// store (§6.5, §9 resolved Open Question on certificate validation).
async fn upgrade_client_tls(
    tcp: TcpStream,
    remote_uri: &Uri,
    verifier: Arc<dyn TlsVerifier>,
) -> Result<TlsStream<TcpStream>> {
    let client_config = ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(verifier.server_cert_verifier())
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(client_config));

    let name = match &remote_uri.host {
        Host::Domain(d) => d.clone(),
        Host::Ipv6Literal(s) => s.trim_start_matches('[').trim_end_matches(']').to_string(),
        Host::Address(ip) => ip.to_string(),
        other => return Err(Error::Tls(format!("cannot derive a TLS server name from host: {other}"))),
    };
    let server_name = ServerName::try_from(name.clone()).map_err(|_| Error::Tls(format!("invalid TLS server name: {name}")))?;

    connector.connect(server_name, tcp).await.map_err(|e| Error::Tls(e.to_string()))
}

fn resolve_addr(uri: &Uri) -> Result<SocketAddr> {
    let port = uri.port.unwrap_or(2855);
    match &uri.host {
        Host::Address(ip) => Ok(SocketAddr::new(*ip, port)),
        Host::Ipv6Literal(s) => {
            let inner = s.trim_start_matches('[').trim_end_matches(']');
            let ip: Ipv6Addr = inner
                .parse()
                .map_err(|_| Error::InvalidUri(format!("bad IPv6 literal: {s}")))?;
            Ok(SocketAddr::new(IpAddr::V6(ip), port))
        }
        Host::Domain(domain) => (domain.as_str(), port)
            .to_socket_addrs()
            .map_err(Error::from)?
            .next()
            .ok_or_else(|| Error::Network(format!("could not resolve {domain}"))),
        other => Err(Error::InvalidUri(format!("MSRP URI needs a concrete host, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_report_status_header() {
        assert_eq!(parse_status(Some("000 200 OK")), (200, Some("OK".to_string())));
        assert_eq!(parse_status(None), (200, None));
    }

    #[test]
    fn resolves_ipv4_and_bracketed_ipv6() {
        let v4: Uri = "msrp://192.0.2.1:2855/sess;tcp".parse().unwrap();
        assert_eq!(resolve_addr(&v4).unwrap(), "192.0.2.1:2855".parse().unwrap());

        let v6: Uri = "msrp://[2001:db8::1]:2855/sess;tcp".parse().unwrap();
        assert_eq!(resolve_addr(&v6).unwrap(), "[2001:db8::1]:2855".parse().unwrap());
    }
}
