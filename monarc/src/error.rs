//! Error taxonomy for Monarc API interactions.
//!
//! Every failure surfaced to a caller is exactly one [`ApiError`] kind,
//! and every kind carries an [`ErrorDetail`] with enough structured
//! context (status, raw body, decoded error document, request id) to
//! branch on programmatically rather than by message string.

use std::fmt;

use serde_json::Value;

use crate::transport::TransportError;

/// Structured context shared by every [`ApiError`] variant.
#[derive(Debug, Clone, Default)]
pub struct ErrorDetail {
    /// Human-readable message, from the API's `error.message` when
    /// available.
    pub message: Option<String>,
    /// HTTP status code of the response, when one was received.
    pub http_status: Option<u16>,
    /// Raw response body, when one was received.
    pub http_body: Option<String>,
    /// Decoded response document, when the body parsed as JSON.
    pub json_body: Option<Value>,
    /// Request id from the response headers, when the transport
    /// surfaced one.
    pub request_id: Option<String>,
}

impl ErrorDetail {
    /// Creates a detail carrying only a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message)?,
            None => f.write_str("unknown API error")?,
        }
        if let Some(id) = &self.request_id {
            write!(f, " (request id: {id})")?;
        }
        Ok(())
    }
}

/// A classified failure from a Monarc API dispatch.
///
/// Exactly one kind wraps every failure detected at or below the
/// transport layer; no raw transport error reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API key was missing, invalid, or revoked.
    #[error("{detail}")]
    Authentication {
        /// Structured error context.
        detail: ErrorDetail,
    },

    /// The request was malformed, referenced an unknown resource, or
    /// failed validation.
    #[error("{detail}")]
    InvalidRequest {
        /// Structured error context.
        detail: ErrorDetail,
        /// The offending parameter, when the API names one.
        param: Option<String>,
    },

    /// A payment instrument was declined.
    #[error("{detail}")]
    Card {
        /// Structured error context.
        detail: ErrorDetail,
        /// Machine-readable decline code (e.g. `expired_card`).
        code: Option<String>,
        /// The offending parameter, when the API names one.
        param: Option<String>,
    },

    /// The API rate limit was exceeded.
    #[error("{detail}")]
    RateLimit {
        /// Structured error context.
        detail: ErrorDetail,
    },

    /// A network-level failure: DNS, connect, timeout, TLS (including
    /// revoked-certificate rejection), or an unusable HTTP method.
    #[error("{detail}")]
    Connection {
        /// Structured error context.
        detail: ErrorDetail,
    },

    /// A malformed server response, a 5xx, or an otherwise unclassified
    /// failure.
    #[error("{detail}")]
    Api {
        /// Structured error context.
        detail: ErrorDetail,
    },
}

impl ApiError {
    /// Creates an [`ApiError::Authentication`] from a message.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            detail: ErrorDetail::from_message(message),
        }
    }

    /// Creates an [`ApiError::Connection`] from a message.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            detail: ErrorDetail::from_message(message),
        }
    }

    /// Creates an [`ApiError::Api`] from a message.
    #[must_use]
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            detail: ErrorDetail::from_message(message),
        }
    }

    /// Returns the structured context carried by any variant.
    #[must_use]
    pub fn detail(&self) -> &ErrorDetail {
        match self {
            Self::Authentication { detail }
            | Self::InvalidRequest { detail, .. }
            | Self::Card { detail, .. }
            | Self::RateLimit { detail }
            | Self::Connection { detail }
            | Self::Api { detail } => detail,
        }
    }

    /// HTTP status of the response that produced this error, if any.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        self.detail().http_status
    }

    /// Request id of the response that produced this error, if any.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.detail().request_id.as_deref()
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        Self::connection(format!(
            "Unexpected error communicating with the Monarc API: {err}. \
             If this problem persists, let us know at support@monarc.io."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_display_uses_message_and_request_id() {
        let detail = ErrorDetail {
            message: Some("No such charge: ch_123".to_owned()),
            request_id: Some("req_abc".to_owned()),
            ..ErrorDetail::default()
        };
        assert_eq!(
            detail.to_string(),
            "No such charge: ch_123 (request id: req_abc)"
        );
    }

    #[test]
    fn detail_display_without_message_is_generic() {
        assert_eq!(ErrorDetail::default().to_string(), "unknown API error");
    }

    #[test]
    fn transport_errors_become_connection_kind() {
        let err: ApiError = TransportError::Timeout {
            url: "https://api.monarc.io/v1/charges".to_owned(),
        }
        .into();
        assert!(matches!(err, ApiError::Connection { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn detail_accessor_reaches_every_variant() {
        let err = ApiError::Card {
            detail: ErrorDetail {
                http_status: Some(402),
                ..ErrorDetail::default()
            },
            code: Some("expired_card".to_owned()),
            param: None,
        };
        assert_eq!(err.http_status(), Some(402));
    }
}
