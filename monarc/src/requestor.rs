//! The request dispatcher: builds, sends, and classifies API requests.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::Credentials;
use crate::error::ApiError;
use crate::params::{self, Params};
use crate::response::interpret_response;
use crate::transport::{HttpTransport, Method};

/// Version of these bindings, reported in request headers.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const NO_KEY_HINT: &str = "No API key provided. (HINT: set your API key with \
     `Credentials::new(\"mk_...\")`. You can generate API keys from the Monarc \
     dashboard. See https://monarc.io/docs/api for details, or email \
     support@monarc.io if you have any questions.)";

/// Identification blob serialized into the `X-Monarc-Client-User-Agent`
/// header.
#[derive(Serialize)]
struct ClientUserAgent<'a> {
    bindings_version: &'static str,
    lang: &'static str,
    publisher: &'static str,
    httplib: &'a str,
    platform: String,
}

/// Dispatches requests against the Monarc API.
///
/// One dispatch is one awaited round trip: build the URL, place the
/// encoded parameters, attach the auth and identification headers, call
/// the transport once, and classify the result. No retries happen here;
/// callers own retry policy. The requestor itself is stateless apart
/// from an optional per-instance key override and is safe to share
/// across concurrent dispatches.
pub struct ApiRequestor {
    transport: Arc<dyn HttpTransport>,
    api_key: Option<String>,
}

impl fmt::Debug for ApiRequestor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequestor")
            .field("transport", &self.transport.name())
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl ApiRequestor {
    /// Creates a requestor over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_key: None,
        }
    }

    /// Overrides the API key for every dispatch through this requestor,
    /// taking precedence over the key in the passed credentials.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Performs one API dispatch.
    ///
    /// Returns the decoded response document together with the API key
    /// that was actually used, so callers layering per-call key
    /// overrides never have to mutate shared credentials.
    ///
    /// # Errors
    ///
    /// Fails with [`ApiError::Authentication`] before any network I/O
    /// when no API key is available; otherwise with whichever
    /// [`ApiError`] kind the transport failure or response classifies
    /// into.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        credentials: &Credentials,
    ) -> Result<(Value, String), ApiError> {
        let Some(api_key) = self
            .api_key
            .as_ref()
            .or(credentials.api_key.as_ref())
            .cloned()
        else {
            return Err(ApiError::authentication(NO_KEY_HINT));
        };

        let encoded = params::query_string(&params::encode_params(params));
        let mut abs_url = format!("{}{}", credentials.api_base, path);
        let body = match method {
            Method::Get | Method::Delete => {
                abs_url = append_query(abs_url, &encoded);
                None
            }
            Method::Post => Some(encoded),
        };

        let headers = self.build_headers(&api_key, credentials.api_version.as_deref());

        debug!(method = %method, url = %abs_url, "dispatching API request");
        let response = self
            .transport
            .request(method, &abs_url, &headers, body.as_deref())
            .await?;
        debug!(status = response.status, "received API response");

        let decoded = interpret_response(&response)?;
        Ok((decoded, api_key))
    }

    fn build_headers(&self, api_key: &str, api_version: Option<&str>) -> Vec<(String, String)> {
        let ua = ClientUserAgent {
            bindings_version: VERSION,
            lang: "rust",
            publisher: "monarc",
            httplib: self.transport.name(),
            platform: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        };

        let mut headers = vec![
            ("Authorization".to_owned(), format!("Bearer {api_key}")),
            (
                "User-Agent".to_owned(),
                format!("Monarc/v1 RustBindings/{VERSION}"),
            ),
            (
                "X-Monarc-Client-User-Agent".to_owned(),
                serde_json::to_string(&ua).unwrap_or_default(),
            ),
        ];
        if let Some(version) = api_version {
            headers.push(("Monarc-Version".to_owned(), version.to_owned()));
        }
        headers
    }
}

/// Appends an encoded query onto a URL.
///
/// A URL that already carries a query gets `&`; a URL ending in a bare
/// `?` gets the pairs directly; anything else starts a query with `?`.
/// Empty parameters leave the URL untouched.
fn append_query(url: String, encoded: &str) -> String {
    if encoded.is_empty() {
        url
    } else if url.ends_with('?') {
        format!("{url}{encoded}")
    } else if url.contains('?') {
        format!("{url}&{encoded}")
    } else {
        format!("{url}?{encoded}")
    }
}
