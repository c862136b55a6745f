//! OAuth provider trait and types.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::token::Tokens;
use crate::error::{config_error, ConfigErrorKind, Error};
use crate::identity::UserProvidedData;

/// Supported external identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Nextcloud,
    Gitlab,
    Github,
}

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Nextcloud => "nextcloud",
            ProviderKind::Gitlab => "gitlab",
            ProviderKind::Github => "github",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "nextcloud" => Ok(ProviderKind::Nextcloud),
            "gitlab" => Ok(ProviderKind::Gitlab),
            "github" => Ok(ProviderKind::Github),
            other => Err(config_error(
                ConfigErrorKind::UnknownProvider,
                &format!("unsupported provider: {}", other),
            )),
        }
    }
}

/// Authorization request with URL and the state it carries.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// CSRF state parameter for validation.
    pub state: String,
}

/// Trait for external OAuth identity providers.
///
/// Implementations hold read-only configuration only, so one instance can serve
/// concurrent logins.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider kind.
    fn kind(&self) -> ProviderKind;

    /// Generate the authorization URL the end user is redirected to.
    fn authorization_url(&self, state: &str) -> AuthorizationRequest;

    /// Exchange an authorization code for tokens.
    ///
    /// Fails with `OAuthErrorKind::TokenExchangeFailed` when the code is empty,
    /// rejected by the provider, or the token endpoint cannot be reached.
    async fn get_oauth_token(&self, code: &str) -> Result<Tokens, Error>;

    /// Fetch the provider profile and emails and normalize them.
    ///
    /// Either a complete identity or an error is returned; a failed profile or
    /// email request fails with `OAuthErrorKind::ProfileFetchFailed`.
    async fn get_user_data(&self, tokens: &Tokens) -> Result<UserProvidedData, Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_provider_kind_round_trip() {
        for kind in [
            ProviderKind::Nextcloud,
            ProviderKind::Gitlab,
            ProviderKind::Github,
        ] {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_provider_kind_case_insensitive() {
        assert_eq!(
            " NextCloud ".parse::<ProviderKind>().unwrap(),
            ProviderKind::Nextcloud
        );
    }

    #[test]
    fn test_unknown_provider() {
        let err = "myspace".parse::<ProviderKind>().unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::UnknownProvider)
        );
    }
}
