#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core client library for the Monarc payments API.
//!
//! This crate contains the request dispatch machinery shared by every
//! Monarc resource binding: parameter flattening into the bracketed wire
//! format, the pluggable HTTP transport capability, response
//! classification into the API error taxonomy, and screening of
//! known-revoked TLS certificates.
//!
//! Concrete network backends live in the `monarc-http` crate; this crate
//! performs no network I/O of its own.
//!
//! # Modules
//!
//! - [`blacklist`] - Revoked-certificate fingerprint screening
//! - [`config`] - API credentials and endpoint configuration
//! - [`error`] - The API error taxonomy
//! - [`params`] - Parameter flattening and form encoding
//! - [`requestor`] - The request dispatcher
//! - [`response`] - Response classification
//! - [`transport`] - The HTTP transport capability and wire types
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use monarc::{ApiRequestor, Credentials, Method, ParamValue};
//!
//! # async fn example(transport: Arc<dyn monarc::HttpTransport>) -> Result<(), monarc::ApiError> {
//! let credentials = Credentials::new("mk_test_123");
//! let requestor = ApiRequestor::new(transport);
//!
//! let mut params = BTreeMap::new();
//! params.insert("amount".to_owned(), ParamValue::from(100));
//! params.insert("currency".to_owned(), ParamValue::from("usd"));
//!
//! let (charge, _key) = requestor
//!     .request(Method::Post, "/v1/charges", &params, &credentials)
//!     .await?;
//! println!("created {}", charge["id"]);
//! # Ok(())
//! # }
//! ```

pub mod blacklist;
pub mod config;
pub mod error;
pub mod params;
pub mod requestor;
pub mod response;
pub mod transport;

pub use config::Credentials;
pub use error::{ApiError, ErrorDetail};
pub use params::{ParamValue, Params};
pub use requestor::ApiRequestor;
pub use transport::{HttpTransport, Method, RawResponse, TransportError};
