//! TLS stream upgrade policy (§6.5, §9 Open Question: certificate
//! validation). The donor source always accepts any peer certificate;
//! rather than carry that silently into this crate, the insecure behavior
//! is named explicitly (`InsecureAcceptAny`) and the host must opt into it.

use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{DigitallySignedStruct, Error as TlsError, SignatureScheme};

/// Host-injectable peer-certificate verification policy. `msrp` (plain
/// TCP) connections never construct one of these; `msrps` connections
/// require one to build their `rustls::ClientConfig`.
pub trait TlsVerifier: Send + Sync {
    fn server_cert_verifier(&self) -> Arc<dyn ServerCertVerifier>;
}

/// Accepts any peer certificate without validation. **Insecure** — intended
/// for interop testing and closed lab deployments, never for production
/// NG9-1-1 signaling paths where peer identity matters.
#[derive(Debug, Default)]
pub struct InsecureAcceptAny;

impl TlsVerifier for InsecureAcceptAny {
    fn server_cert_verifier(&self) -> Arc<dyn ServerCertVerifier> {
        Arc::new(AcceptAnyServerCert)
    }
}

#[derive(Debug)]
struct AcceptAnyServerCert;

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}
