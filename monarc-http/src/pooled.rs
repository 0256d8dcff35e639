//! Pooled keep-alive backend built on `reqwest`.

use monarc::transport::{BoxFuture, HttpTransport, Method, RawResponse, TransportError};

use crate::config::TransportConfig;

/// Connection-pooling transport backed by a [`reqwest::Client`].
///
/// The preferred backend: keep-alive connections are reused across
/// dispatches, and the pool is safe for concurrent in-flight requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the given timeouts.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("failed to build reqwest::Client");
        Self { client }
    }

    /// Wraps a pre-configured client, keeping its pool and timeouts.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl HttpTransport for ReqwestTransport {
    fn request<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        headers: &'a [(String, String)],
        body: Option<&'a str>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        Box::pin(async move {
            let verb = match method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut request = self.client.request(verb, url);
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
            if let Some(body) = body {
                request = request
                    .header(
                        reqwest::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    )
                    .body(body.to_owned());
            }

            let response = request
                .send()
                .await
                .map_err(|err| classify_error(url, &err))?;

            let status = response.status().as_u16();
            let mut collected = Vec::with_capacity(response.headers().len());
            for (name, value) in response.headers() {
                if let Ok(value) = value.to_str() {
                    collected.push((name.as_str().to_owned(), value.to_owned()));
                }
            }

            let body = response.text().await.map_err(|err| TransportError::Io {
                url: url.to_owned(),
                detail: err.to_string(),
            })?;

            Ok(RawResponse {
                body,
                status,
                headers: collected,
            })
        })
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

fn classify_error(url: &str, err: &reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            url: url.to_owned(),
        }
    } else if err.is_connect() {
        TransportError::Connect {
            host: host_of(url),
            detail: err.to_string(),
        }
    } else if err.is_builder() {
        TransportError::InvalidUrl {
            url: url.to_owned(),
            detail: err.to_string(),
        }
    } else {
        TransportError::Io {
            url: url.to_owned(),
            detail: err.to_string(),
        }
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
