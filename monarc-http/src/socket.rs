//! Plain-socket HTTP/1.1 backend with rustls TLS and
//! revoked-certificate screening.
//!
//! One connection per request, `Connection: close`, no pooling. This is
//! the fallback stack for environments without a pooled client, and the
//! backend that performs the explicit blacklist check during the TLS
//! handshake (see [`crate::tls`]).

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;

use monarc::transport::{BoxFuture, HttpTransport, Method, RawResponse, TransportError};
use url::Url;

use crate::config::TransportConfig;
use crate::tls;

/// Hand-written HTTP/1.1 transport over `std::net::TcpStream`, run on
/// tokio's blocking pool.
#[derive(Debug)]
pub struct SocketTransport {
    config: TransportConfig,
    tls_config: Arc<rustls::ClientConfig>,
}

impl SocketTransport {
    /// Creates a transport with the given timeouts.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            tls_config: tls::client_config(),
        }
    }
}

impl Default for SocketTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl HttpTransport for SocketTransport {
    fn request<'a>(
        &'a self,
        method: Method,
        url: &'a str,
        headers: &'a [(String, String)],
        body: Option<&'a str>,
    ) -> BoxFuture<'a, Result<RawResponse, TransportError>> {
        let config = self.config;
        let tls_config = Arc::clone(&self.tls_config);
        let url = url.to_owned();
        let headers = headers.to_vec();
        let body = body.map(str::to_owned);

        Box::pin(async move {
            let join_url = url.clone();
            tokio::task::spawn_blocking(move || {
                run_request(config, &tls_config, method, &url, &headers, body.as_deref())
            })
            .await
            .map_err(|err| TransportError::Io {
                url: join_url,
                detail: err.to_string(),
            })?
        })
    }

    fn name(&self) -> &'static str {
        "socket"
    }
}

fn run_request(
    config: TransportConfig,
    tls_config: &Arc<rustls::ClientConfig>,
    method: Method,
    url: &str,
    headers: &[(String, String)],
    body: Option<&str>,
) -> Result<RawResponse, TransportError> {
    let parsed = Url::parse(url).map_err(|err| TransportError::InvalidUrl {
        url: url.to_owned(),
        detail: err.to_string(),
    })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| TransportError::InvalidUrl {
            url: url.to_owned(),
            detail: "missing host".to_owned(),
        })?
        .to_owned();
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| TransportError::InvalidUrl {
            url: url.to_owned(),
            detail: "unknown port".to_owned(),
        })?;
    let target = match parsed.query() {
        Some(query) => format!("{}?{}", parsed.path(), query),
        None => parsed.path().to_owned(),
    };
    // Host header carries the port only when it is non-default.
    let host_header = match parsed.port() {
        Some(explicit) => format!("{host}:{explicit}"),
        None => host.clone(),
    };

    let stream = connect(&host, port, config)?;

    let raw = match parsed.scheme() {
        "http" => exchange(stream, method, &host_header, &target, headers, body, url)?,
        "https" => {
            let server_name = rustls::pki_types::ServerName::try_from(host.clone())
                .map_err(|err| TransportError::Tls {
                    host: host.clone(),
                    detail: err.to_string(),
                })?;
            let connection = rustls::ClientConnection::new(Arc::clone(tls_config), server_name)
                .map_err(|err| TransportError::Tls {
                    host: host.clone(),
                    detail: err.to_string(),
                })?;
            let tls_stream = rustls::StreamOwned::new(connection, stream);
            exchange(tls_stream, method, &host_header, &target, headers, body, url)?
        }
        other => {
            return Err(TransportError::InvalidUrl {
                url: url.to_owned(),
                detail: format!("unsupported URL scheme {other}"),
            });
        }
    };

    parse_response(&raw, url)
}

/// Resolves `host` and connects to the first reachable address.
fn connect(host: &str, port: u16, config: TransportConfig) -> Result<TcpStream, TransportError> {
    let connect_err = |detail: String| TransportError::Connect {
        host: host.to_owned(),
        detail,
    };

    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|err| connect_err(err.to_string()))?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, config.connect_timeout) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(config.timeout))
                    .map_err(|err| connect_err(err.to_string()))?;
                stream
                    .set_write_timeout(Some(config.timeout))
                    .map_err(|err| connect_err(err.to_string()))?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }

    Err(connect_err(last_err.map_or_else(
        || "no addresses resolved".to_owned(),
        |err| err.to_string(),
    )))
}

/// Writes one HTTP/1.1 request and reads the raw response bytes.
fn exchange<S: Read + Write>(
    mut stream: S,
    method: Method,
    host: &str,
    target: &str,
    headers: &[(String, String)],
    body: Option<&str>,
    url: &str,
) -> Result<Vec<u8>, TransportError> {
    let io_err = |detail: String| TransportError::Io {
        url: url.to_owned(),
        detail,
    };

    let mut request = String::new();
    request.push_str(&format!(
        "{} {} HTTP/1.1\r\n",
        method.as_str().to_ascii_uppercase(),
        target
    ));
    request.push_str(&format!("Host: {host}\r\n"));
    request.push_str("Connection: close\r\n");
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    if let Some(body) = body {
        request.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
        request.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    request.push_str("\r\n");

    stream
        .write_all(request.as_bytes())
        .map_err(|err| io_err(err.to_string()))?;
    if let Some(body) = body {
        stream
            .write_all(body.as_bytes())
            .map_err(|err| io_err(err.to_string()))?;
    }
    stream.flush().map_err(|err| io_err(err.to_string()))?;

    let mut raw = Vec::new();
    match stream.read_to_end(&mut raw) {
        Ok(_) => {}
        // Peers that drop the connection without a TLS close_notify
        // surface UnexpectedEof after the payload has already arrived.
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof && !raw.is_empty() => {}
        Err(err) => return Err(io_err(err.to_string())),
    }
    Ok(raw)
}

/// Parses a raw HTTP/1.x response into status, headers, and body.
fn parse_response(raw: &[u8], url: &str) -> Result<RawResponse, TransportError> {
    let io_err = |detail: String| TransportError::Io {
        url: url.to_owned(),
        detail,
    };

    let header_end =
        find_subslice(raw, b"\r\n\r\n").ok_or_else(|| io_err("truncated HTTP response".to_owned()))?;
    let head = String::from_utf8_lossy(&raw[..header_end]).into_owned();
    let payload = &raw[header_end + 4..];

    let mut lines = head.split("\r\n");
    let status_line = lines
        .next()
        .ok_or_else(|| io_err("missing status line".to_owned()))?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse::<u16>().ok())
        .ok_or_else(|| io_err(format!("malformed status line: {status_line}")))?;

    let mut headers = Vec::new();
    let mut content_length = None;
    let mut chunked = false;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().to_owned();
            if name == "content-length" {
                content_length = value.parse::<usize>().ok();
            }
            if name == "transfer-encoding" && value.eq_ignore_ascii_case("chunked") {
                chunked = true;
            }
            headers.push((name, value));
        }
    }

    let payload = if chunked {
        decode_chunked(payload, url)?
    } else if let Some(length) = content_length {
        payload.get(..length).unwrap_or(payload).to_vec()
    } else {
        payload.to_vec()
    };

    Ok(RawResponse {
        body: String::from_utf8_lossy(&payload).into_owned(),
        status,
        headers,
    })
}

/// Decodes a chunked transfer-encoded payload.
fn decode_chunked(mut data: &[u8], url: &str) -> Result<Vec<u8>, TransportError> {
    let io_err = |detail: &str| TransportError::Io {
        url: url.to_owned(),
        detail: detail.to_owned(),
    };

    let mut out = Vec::new();
    loop {
        let line_end =
            find_subslice(data, b"\r\n").ok_or_else(|| io_err("truncated chunked payload"))?;
        let size_line = String::from_utf8_lossy(&data[..line_end]).into_owned();
        // Chunk extensions after ';' are ignored.
        let size_text = size_line.split(';').next().unwrap_or("").trim();
        let size = usize::from_str_radix(size_text, 16)
            .map_err(|_| io_err("malformed chunk size"))?;
        data = &data[line_end + 2..];
        if size == 0 {
            break;
        }
        if data.len() < size + 2 {
            return Err(io_err("truncated chunked payload"));
        }
        out.extend_from_slice(&data[..size]);
        data = &data[size + 2..];
    }
    Ok(out)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_length_response() {
        let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\n\r\n{}";
        let response = parse_response(raw, "http://example.test/").unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "{}");
        assert_eq!(response.header("content-type"), Some("application/json"));
    }

    #[test]
    fn parses_chunked_response() {
        let raw =
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\n{\"a\"\r\n4\r\n: 1}\r\n0\r\n\r\n";
        let response = parse_response(raw, "http://example.test/").unwrap();
        assert_eq!(response.body, "{\"a\": 1}");
    }

    #[test]
    fn parses_response_without_length_to_eof() {
        let raw = b"HTTP/1.0 500 Internal Server Error\r\n\r\noops";
        let response = parse_response(raw, "http://example.test/").unwrap();
        assert_eq!(response.status, 500);
        assert_eq!(response.body, "oops");
    }

    #[test]
    fn header_names_are_lowercased() {
        let raw = b"HTTP/1.1 200 OK\r\nRequest-Id: req_9\r\nContent-Length: 0\r\n\r\n";
        let response = parse_response(raw, "http://example.test/").unwrap();
        assert_eq!(response.headers[0].0, "request-id");
    }

    #[test]
    fn truncated_response_is_io_error() {
        let err = parse_response(b"HTTP/1.1 200 OK\r\n", "http://example.test/").unwrap_err();
        assert!(matches!(err, TransportError::Io { .. }));
    }

    #[test]
    fn malformed_status_line_is_io_error() {
        let err = parse_response(b"garbage\r\n\r\n", "http://example.test/").unwrap_err();
        assert!(matches!(err, TransportError::Io { .. }));
    }
}
