//! Detection of known-revoked TLS certificates.
//!
//! Chain-of-trust validation cannot catch a fraudulently issued or
//! compromised certificate for the API's own hostnames, since such a
//! certificate validates like any other. This module keeps a small
//! embedded set of SHA-256 fingerprints for certificates known to be
//! revoked and rejects any handshake presenting one. It runs alongside
//! standard TLS validation, never instead of it.

use sha2::{Digest, Sha256};

use crate::error::ApiError;

/// A hostname together with the fingerprints of its revoked
/// certificates.
#[derive(Debug, Clone, Copy)]
pub struct CertificateRecord {
    /// Exact hostname the record applies to. No wildcard expansion.
    pub host: &'static str,
    /// Lowercase hex SHA-256 digests of revoked DER certificates.
    pub fingerprints: &'static [&'static str],
}

/// Certificates revoked for Monarc API hostnames.
///
/// Loaded once at compile time and never mutated. `revoked.monarc.io`
/// serves its revoked certificate on purpose so clients can verify this
/// check end to end.
pub const REVOKED_CERTIFICATES: &[CertificateRecord] = &[
    CertificateRecord {
        host: "api.monarc.io",
        fingerprints: &["2d9e381ac1c37f8dfb8872f7cf2db8e1f1ea37a0f0f2ba84ab4ed07cbf39d1c5"],
    },
    CertificateRecord {
        host: "revoked.monarc.io",
        fingerprints: &["9b6f2ec84f0c7b64c31d1dd20b9f3c86e5a29b0db7c4f6913d80145efc204a7d"],
    },
];

/// Lowercase hex SHA-256 digest of a DER-encoded certificate.
#[must_use]
pub fn fingerprint(certificate_der: &[u8]) -> String {
    hex::encode(Sha256::digest(certificate_der))
}

/// Checks a certificate presented by `hostname` against the embedded
/// revocation set.
///
/// Hostnames without a record, and certificates whose fingerprint does
/// not match, pass at this layer.
///
/// # Errors
///
/// Returns an [`ApiError::Api`] when the certificate is on the
/// revocation list for `hostname`.
pub fn verify(hostname: &str, certificate_der: &[u8]) -> Result<(), ApiError> {
    verify_against(REVOKED_CERTIFICATES, hostname, certificate_der)
}

/// [`verify`] against a caller-supplied record set.
///
/// # Errors
///
/// Returns an [`ApiError::Api`] when the certificate is on the
/// revocation list for `hostname`.
pub fn verify_against(
    records: &[CertificateRecord],
    hostname: &str,
    certificate_der: &[u8],
) -> Result<(), ApiError> {
    let Some(record) = records.iter().find(|record| record.host == hostname) else {
        return Ok(());
    };

    let digest = fingerprint(certificate_der);
    if record.fingerprints.iter().any(|revoked| *revoked == digest) {
        tracing::warn!(host = hostname, "server presented a revoked certificate");
        return Err(ApiError::api(
            "Invalid server certificate. You tried to connect to a server that has a \
             revoked SSL certificate, which means Monarc cannot securely send data to \
             it. Please email support@monarc.io if you need help connecting to the \
             correct API server.",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAKE_DER: &[u8] = b"-- not a real certificate --";

    /// Builds a single-host record set revoking exactly `der`.
    fn revoking(host: &'static str, der: &[u8]) -> Vec<CertificateRecord> {
        let digest: &'static str = Box::leak(fingerprint(der).into_boxed_str());
        let fingerprints: &'static [&'static str] = Box::leak(Box::new([digest]));
        vec![CertificateRecord { host, fingerprints }]
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        // SHA-256 of the empty input.
        assert_eq!(
            fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn listed_host_and_fingerprint_fails() {
        let records = revoking("revoked.monarc.io", FAKE_DER);
        let err = verify_against(&records, "revoked.monarc.io", FAKE_DER).unwrap_err();
        assert!(matches!(err, ApiError::Api { .. }));
        assert!(err.to_string().contains("revoked SSL certificate"));
    }

    #[test]
    fn same_certificate_on_unlisted_host_passes() {
        let records = revoking("revoked.monarc.io", FAKE_DER);
        assert!(verify_against(&records, "api.monarc.io", FAKE_DER).is_ok());
    }

    #[test]
    fn different_certificate_on_listed_host_passes() {
        let records = revoking("revoked.monarc.io", FAKE_DER);
        assert!(verify_against(&records, "revoked.monarc.io", b"some other certificate").is_ok());
    }

    #[test]
    fn no_wildcard_expansion() {
        let records = revoking("monarc.io", FAKE_DER);
        assert!(verify_against(&records, "revoked.monarc.io", FAKE_DER).is_ok());
    }

    #[test]
    fn embedded_set_passes_unknown_hosts() {
        assert!(verify("example.com", FAKE_DER).is_ok());
    }

    #[test]
    fn embedded_set_passes_unmatched_certificates() {
        // The listed hosts only fail for the exact revoked certificates.
        assert!(verify("revoked.monarc.io", FAKE_DER).is_ok());
    }
}
