//! HTTP client building and authenticated provider requests.

mod client;
mod request;
mod retry;

pub use client::{AuthenticatedClient, AuthenticatedClientBuilder, HttpClientConfig, DEFAULT_TIMEOUT};
pub use request::get_json;
pub use retry::ProviderRetryPolicy;
