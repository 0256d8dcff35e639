#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport backends for the Monarc payments API client.
//!
//! Every backend implements [`monarc::HttpTransport`] with identical
//! request/response semantics, so the dispatcher never cares which
//! network stack is underneath. Pick one explicitly, or let
//! [`default_transport`] choose the preferred stack among the enabled
//! features.
//!
//! # Modules
//!
//! - [`config`] — Shared backend timeouts
//! - [`pooled`] — Pooled keep-alive backend on `reqwest` (feature: `reqwest`)
//! - [`agent`] — Lightweight synchronous backend on `ureq` (feature: `ureq`)
//! - [`socket`] — Plain-socket HTTP/1.1 backend with rustls TLS and
//!   revoked-certificate screening (feature: `socket`)
//! - [`tls`] — rustls configuration shared by the socket backend
//!   (feature: `socket`)

pub mod config;

#[cfg(feature = "ureq")]
pub mod agent;
#[cfg(feature = "reqwest")]
pub mod pooled;
#[cfg(feature = "socket")]
pub mod socket;
#[cfg(feature = "socket")]
pub mod tls;

pub use config::TransportConfig;

#[cfg(feature = "ureq")]
pub use agent::UreqTransport;
#[cfg(feature = "reqwest")]
pub use pooled::ReqwestTransport;
#[cfg(feature = "socket")]
pub use socket::SocketTransport;

/// Returns the preferred transport among the enabled backend features.
///
/// The pooled reqwest client wins when available, then the ureq agent,
/// then the plain-socket backend. Applications with stricter
/// requirements construct a backend directly instead.
#[cfg(any(feature = "reqwest", feature = "ureq", feature = "socket"))]
#[must_use]
pub fn default_transport() -> std::sync::Arc<dyn monarc::HttpTransport> {
    #[cfg(feature = "reqwest")]
    {
        return std::sync::Arc::new(pooled::ReqwestTransport::default());
    }

    #[cfg(all(feature = "ureq", not(feature = "reqwest")))]
    {
        return std::sync::Arc::new(agent::UreqTransport::default());
    }

    #[cfg(all(feature = "socket", not(any(feature = "reqwest", feature = "ureq"))))]
    {
        return std::sync::Arc::new(socket::SocketTransport::default());
    }
}
