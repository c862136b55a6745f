//! HTTP client builder with middleware.

use std::time::Duration;

use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;

use super::ProviderRetryPolicy;

/// Default timeout for provider API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries for transient failures.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            user_agent: format!("identity-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client used for provider API calls.
pub type AuthenticatedClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for the HTTP client that adapters use to reach provider APIs.
///
/// The identity path expects one attempt per call, so retries default to zero;
/// raising `max_retries` turns on the transport-level retry middleware.
pub struct AuthenticatedClientBuilder {
    config: HttpClientConfig,
}

impl AuthenticatedClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Start from an existing configuration.
    pub fn from_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<AuthenticatedClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let builder = ClientBuilder::new(client);
        let client_with_middleware = if self.config.max_retries > 0 {
            // Each attempt may use the full timeout; backoff must fit in the same total.
            let budget = self
                .config
                .timeout
                .saturating_mul(self.config.max_retries.saturating_add(1));
            let retry_policy = ProviderRetryPolicy::new(self.config.max_retries, budget);
            builder
                .with(RetryTransientMiddleware::new_with_policy(retry_policy))
                .build()
        } else {
            builder.build()
        };

        Ok(client_with_middleware)
    }
}

impl Default for AuthenticatedClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
