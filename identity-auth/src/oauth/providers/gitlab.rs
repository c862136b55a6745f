//! GitLab OAuth provider implementation.

use async_trait::async_trait;
use tracing::info;

use super::api_v4;
use crate::error::Error;
use crate::http::AuthenticatedClient;
use crate::identity::UserProvidedData;
use crate::oauth::client::OAuthClient;
use crate::oauth::config::{choose_host, split_scopes, ProviderConfig};
use crate::oauth::token::Tokens;
use crate::oauth::{AuthorizationRequest, ProviderKind};

const DEFAULT_HOST: &str = "gitlab.com";

/// GitLab OAuth provider, gitlab.com or a self-managed instance.
pub struct Provider {
    host: String,
    oauth: OAuthClient,
    http_client: AuthenticatedClient,
}

impl Provider {
    /// Create a new GitLab provider.
    ///
    /// `read_user` is always requested; `scopes` adds comma-separated extras.
    pub fn new(
        config: &ProviderConfig,
        scopes: &str,
        http_client: AuthenticatedClient,
    ) -> Result<Self, Error> {
        config.validate()?;

        let host = choose_host(config.host_override(), DEFAULT_HOST);

        let mut oauth_scopes = vec!["read_user".to_string()];
        oauth_scopes.extend(split_scopes(scopes));

        let oauth = OAuthClient::new(
            config,
            format!("{}/oauth/authorize", host),
            format!("{}/oauth/token", host),
            oauth_scopes,
            http_client.clone(),
        )?;

        Ok(Self {
            host,
            oauth,
            http_client,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gitlab
    }

    fn authorization_url(&self, state: &str) -> AuthorizationRequest {
        self.oauth.authorization_url(state)
    }

    async fn get_oauth_token(&self, code: &str) -> Result<Tokens, Error> {
        self.oauth.exchange_code(code).await
    }

    async fn get_user_data(&self, tokens: &Tokens) -> Result<UserProvidedData, Error> {
        let data = api_v4::fetch_user_data(&self.http_client, tokens, &self.host).await?;
        info!(
            "Fetched GitLab identity {} with {} email(s)",
            data.metadata.subject,
            data.emails.len()
        );
        Ok(data)
    }
}
