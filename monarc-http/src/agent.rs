//! Lightweight synchronous backend built on `ureq`.

use std::fmt;

use monarc::transport::{BoxFuture, HttpTransport, Method, RawResponse, TransportError};

use crate::config::TransportConfig;

/// Synchronous transport backed by a [`ureq::Agent`], run on tokio's
/// blocking pool.
///
/// A fallback for applications that want a small dependency surface;
/// the agent still reuses connections between sequential requests.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// Creates a transport with the given timeouts.
    ///
    /// Non-2xx statuses are returned as data, not errors; status
    /// interpretation belongs to the response classifier.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl HttpTransport for UreqTransport {
    fn request<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        headers: &'a [(String, String)],
        body: Option<&'a str>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        let agent = self.agent.clone();
        let url = url.to_owned();
        let headers = headers.to_vec();
        let body = body.map(str::to_owned);

        Box::pin(async move {
            let join_url = url.clone();
            tokio::task::spawn_blocking(move || {
                run_request(&agent, method, &url, &headers, body.as_deref())
            })
            .await
            .map_err(|err| TransportError::Io {
                url: join_url,
                detail: err.to_string(),
            })?
        })
    }

    fn name(&self) -> &'static str {
        "ureq"
    }
}

fn run_request(
    agent: &ureq::Agent,
    method: Method,
    url: &str,
    headers: &[(String, String)],
    body: Option<&str>,
) -> Result<RawResponse, TransportError> {
    let result = match method {
        Method::Get | Method::Delete => {
            let mut request = if matches!(method, Method::Get) {
                agent.get(url)
            } else {
                agent.delete(url)
            };
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
            request.call()
        }
        Method::Post => {
            let mut request = agent
                .post(url)
                .content_type("application/x-www-form-urlencoded");
            for (name, value) in headers {
                request = request.header(name.as_str(), value.as_str());
            }
            request.send(body.unwrap_or("").as_bytes())
        }
    };

    let mut response = result.map_err(|err| TransportError::Connect {
        host: host_of(url),
        detail: err.to_string(),
    })?;

    let status = response.status().as_u16();
    let mut collected = Vec::with_capacity(response.headers().len());
    for (name, value) in response.headers() {
        if let Ok(value) = value.to_str() {
            collected.push((name.as_str().to_owned(), value.to_owned()));
        }
    }

    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|err| TransportError::Io {
            url: url.to_owned(),
            detail: err.to_string(),
        })?;

    Ok(RawResponse {
        body,
        status,
        headers: collected,
    })
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
