//! Shared backend configuration.

use std::time::Duration;

/// Timeouts applied by every backend.
///
/// No timeout is threaded through the dispatcher itself; a dispatch runs
/// to completion or to whichever of these limits its backend hits first.
#[derive(Debug, Clone, Copy)]
pub struct TransportConfig {
    /// Total time allowed for one request/response cycle.
    pub timeout: Duration,
    /// Time allowed for establishing the TCP connection.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(80),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Sets the total request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}
