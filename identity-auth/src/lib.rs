//! # identity-auth
//!
//! Sign-in through external OAuth 2.0 identity providers:
//! - Authorization URL generation and authorization-code exchange
//! - Authenticated profile requests against provider APIs
//! - Normalization of provider profiles into a single identity record
//! - Provider construction by name, individually or as a registry
//!
//! ## Providers
//!
//! - `nextcloud`: self-hosted instances, always configured with a URL
//! - `gitlab`: gitlab.com or a self-managed instance
//! - `github`: github.com or GitHub Enterprise Server
//!
//! ## Usage
//!
//! ```rust,ignore
//! use identity_auth::oauth::{new_provider, ProviderConfig, ProviderKind};
//!
//! let config = ProviderConfig::new("client-id", "secret", "https://auth.example.com/callback")
//!     .with_url("https://cloud.example.com");
//! let provider = new_provider(ProviderKind::Nextcloud, &config, "")?;
//! let tokens = provider.get_oauth_token(&code).await?;
//! let identity = provider.get_user_data(&tokens).await?;
//! ```

pub mod error;
pub mod http;
pub mod identity;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
