//! The HTTP transport capability and its wire-level types.
//!
//! A transport is anything that can perform one HTTP round trip:
//! `(method, url, headers, body) -> (body, status, headers)`. Concrete
//! network stacks live in the `monarc-http` crate and are selected by
//! configuration; the dispatcher only ever sees the [`HttpTransport`]
//! trait object, so backends are swappable without touching dispatch
//! logic.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use crate::error::ApiError;

/// Boxed future returned by object-safe async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The HTTP methods the Monarc API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Retrieve or list a resource; parameters travel in the query string.
    Get,
    /// Create or update a resource; parameters travel in the form body.
    Post,
    /// Delete a resource; parameters travel in the query string.
    Delete,
}

impl Method {
    /// Lowercase method name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ApiError;

    /// Parses a method name, case-insensitively.
    ///
    /// Anything outside the accepted set fails with the connection error
    /// kind before any network I/O could happen.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "delete" => Ok(Self::Delete),
            other => Err(ApiError::connection(format!(
                "Unrecognized HTTP method {other}. This may indicate a bug in the \
                 Monarc bindings. Please contact support@monarc.io for assistance."
            ))),
        }
    }
}

/// One raw HTTP response as surfaced by a transport.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response body, decoded as text.
    pub body: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers with lowercased names.
    pub headers: Vec<(String, String)>,
}

impl RawResponse {
    /// Returns the first header with the given name, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A network-level failure inside a transport.
///
/// These never carry an HTTP status; anything the server actually
/// answered is a [`RawResponse`] and gets classified downstream. The
/// dispatcher wraps every variant into the connection error kind.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// DNS resolution or TCP connect failure.
    #[error("could not connect to {host}: {detail}")]
    Connect {
        /// Host the connection was attempted to.
        host: String,
        /// Underlying failure description.
        detail: String,
    },

    /// TLS handshake failure, including revoked-certificate rejection.
    #[error("TLS handshake with {host} failed: {detail}")]
    Tls {
        /// Host the handshake was attempted with.
        host: String,
        /// Underlying failure description.
        detail: String,
    },

    /// The request exceeded the backend's configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// The request URL could not be parsed or used.
    #[error("invalid request URL {url}: {detail}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Underlying failure description.
        detail: String,
    },

    /// The exchange failed after the connection was established.
    #[error("error during request to {url}: {detail}")]
    Io {
        /// The request URL.
        url: String,
        /// Underlying failure description.
        detail: String,
    },
}

/// One-round-trip HTTP capability.
///
/// Implementations must be safe to share across concurrent in-flight
/// dispatches; pooled backends own that guarantee for their pooled
/// connections. No retries happen at this layer.
pub trait HttpTransport: Send + Sync {
    /// Performs one HTTP round trip.
    ///
    /// `headers` are sent as given; backends may add wire-level headers
    /// of their own (`Host`, `Content-Type`, `Content-Length`). `body`
    /// is `Some` only for POST, and an empty string is a real,
    /// zero-length body.
    fn request<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        headers: &'a [(String, String)],
        body: Option<&'a str>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>>;

    /// Short network-stack name, reported in the client identification
    /// header.
    fn name(&self) -> &'static str;
}
