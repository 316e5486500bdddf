use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use chat_widget_backend::{ConfigError, SessionId};
use reqwest::Url;

/// Builder for [`HttpBackendConfig`].
#[derive(Clone, PartialEq, Eq)]
pub struct HttpBackendConfigBuilder {
    endpoint: String,
    token: Option<String>,
    session_id: Option<SessionId>,
    timeout: Option<Duration>,
}

impl HttpBackendConfigBuilder {
    /// Creates a builder with the given base endpoint, e.g.
    /// `https://chat.example.com`.
    #[inline]
    pub fn with_endpoint<S: Into<String>>(endpoint: S) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: None,
            session_id: None,
            timeout: None,
        }
    }

    /// Sets the bearer token attached to every request.
    #[inline]
    pub fn with_token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Uses an externally supplied session identifier instead of
    /// generating one.
    #[inline]
    pub fn with_session_id<S: Into<SessionId>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Bounds every request by the given duration. Requests have no
    /// timeout unless this is set.
    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<HttpBackendConfig, ConfigError> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        let url = Url::parse(endpoint)
            .map_err(|err| ConfigError::InvalidEndpoint(err.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidEndpoint(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        let token = match self.token {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(ConfigError::MissingToken),
        };

        Ok(HttpBackendConfig {
            base_url: endpoint.trim_end_matches('/').to_owned(),
            token,
            session_id: self.session_id,
            timeout: self.timeout,
        })
    }
}

impl Debug for HttpBackendConfigBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackendConfigBuilder")
            .field("endpoint", &self.endpoint)
            .field("token", &"<redacted>")
            .field("session_id", &self.session_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Configuration for [`crate::HttpBackend`].
#[derive(Clone, PartialEq, Eq)]
pub struct HttpBackendConfig {
    pub(crate) base_url: String,
    pub(crate) token: String,
    pub(crate) session_id: Option<SessionId>,
    pub(crate) timeout: Option<Duration>,
}

impl HttpBackendConfig {
    /// Returns the validated base URL, without a trailing slash.
    #[inline]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Debug for HttpBackendConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackendConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("session_id", &self.session_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
