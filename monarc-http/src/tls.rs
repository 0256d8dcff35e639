//! rustls client configuration with revoked-certificate screening.
//!
//! Standard WebPKI chain validation runs first; the end-entity
//! certificate is then screened against the embedded revocation set
//! (`monarc::blacklist`). A revoked certificate aborts the handshake, so
//! upstream it looks like any other connection failure.

use std::sync::Arc;

use rustls::client::WebPkiServerVerifier;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};

/// Builds the client TLS configuration used by
/// [`SocketTransport`](crate::socket::SocketTransport).
#[must_use]
pub fn client_config() -> Arc<ClientConfig> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let webpki = WebPkiServerVerifier::builder_with_provider(Arc::new(roots), Arc::clone(&provider))
        .build()
        .expect("web-pki verifier builds from bundled roots");

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("ring provider supports default protocol versions")
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(BlacklistVerifier { inner: webpki }))
        .with_no_client_auth();

    Arc::new(config)
}

/// Server certificate verifier layering blacklist screening on top of
/// the standard WebPKI verifier.
#[derive(Debug)]
pub struct BlacklistVerifier {
    inner: Arc<WebPkiServerVerifier>,
}

impl ServerCertVerifier for BlacklistVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let verified = self.inner.verify_server_cert(
            end_entity,
            intermediates,
            server_name,
            ocsp_response,
            now,
        )?;

        if let ServerName::DnsName(dns_name) = server_name {
            if let Err(err) = monarc::blacklist::verify(dns_name.as_ref(), end_entity.as_ref()) {
                tracing::warn!(host = dns_name.as_ref(), "rejecting revoked server certificate");
                return Err(rustls::Error::General(err.to_string()));
            }
        }

        Ok(verified)
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        self.inner.verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.inner.supported_verify_schemes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_builds_from_bundled_roots() {
        let config = client_config();
        assert!(config.alpn_protocols.is_empty());
    }
}
