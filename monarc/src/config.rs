//! API credentials and endpoint configuration.
//!
//! Configuration is an explicit value handed to every dispatch rather
//! than ambient process state, so tests and concurrent callers can hold
//! isolated instances. Sharing one set of credentials across tasks is
//! the caller's choice of `Arc`/lock; the dispatcher reads the value
//! once at the start of each request.

/// Default production endpoint for the Monarc API.
pub const DEFAULT_API_BASE: &str = "https://api.monarc.io";

/// Credentials and endpoint selection for API dispatches.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Secret API key. `None` makes every dispatch fail fast with an
    /// authentication error before any network I/O.
    pub api_key: Option<String>,
    /// Base URL prepended to every resource path (no trailing slash).
    pub api_base: String,
    /// Pinned API version, sent in the `Monarc-Version` header when set.
    pub api_version: Option<String>,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_owned(),
            api_version: None,
        }
    }
}

impl Credentials {
    /// Creates credentials for the production endpoint with the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL (trailing slashes are stripped).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_owned();
        self
    }

    /// Pins an API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_production() {
        let credentials = Credentials::default();
        assert_eq!(credentials.api_base, DEFAULT_API_BASE);
        assert!(credentials.api_key.is_none());
        assert!(credentials.api_version.is_none());
    }

    #[test]
    fn builder_strips_trailing_slash_from_base() {
        let credentials = Credentials::new("mk_test_123").with_api_base("http://localhost:4021/");
        assert_eq!(credentials.api_base, "http://localhost:4021");
    }
}
