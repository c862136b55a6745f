//! GitHub OAuth provider implementation.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::error::{profile_fetch_error, Error};
use crate::http::{get_json, AuthenticatedClient};
use crate::identity::{text, Claims, EmailList, UserProvidedData};
use crate::oauth::client::OAuthClient;
use crate::oauth::config::{choose_host, split_scopes, ProviderConfig};
use crate::oauth::token::Tokens;
use crate::oauth::{AuthorizationRequest, ProviderKind};

const DEFAULT_AUTH_HOST: &str = "github.com";
const DEFAULT_API_HOST: &str = "api.github.com";

#[derive(Debug, Deserialize)]
struct User {
    id: i64,
    #[serde(default)]
    login: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserEmail {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    verified: bool,
}

/// GitHub OAuth provider, github.com or GitHub Enterprise Server.
///
/// Unlike the v4 API, GitHub's email listing reports verification and the
/// primary address itself, so those flags are taken as given.
pub struct Provider {
    api_host: String,
    oauth: OAuthClient,
    http_client: AuthenticatedClient,
}

impl Provider {
    /// Create a new GitHub provider.
    ///
    /// `user:email` is always requested; `scopes` adds comma-separated extras.
    /// A host override points both the OAuth endpoints and the API (under
    /// `/api/v3`) at an Enterprise Server instance.
    pub fn new(
        config: &ProviderConfig,
        scopes: &str,
        http_client: AuthenticatedClient,
    ) -> Result<Self, Error> {
        config.validate()?;

        let auth_host = choose_host(config.host_override(), DEFAULT_AUTH_HOST);
        let mut api_host = choose_host(config.host_override(), DEFAULT_API_HOST);
        if !api_host.ends_with(DEFAULT_API_HOST) {
            api_host.push_str("/api/v3");
        }

        let mut oauth_scopes = vec!["user:email".to_string()];
        oauth_scopes.extend(split_scopes(scopes));

        let oauth = OAuthClient::new(
            config,
            format!("{}/login/oauth/authorize", auth_host),
            format!("{}/login/oauth/access_token", auth_host),
            oauth_scopes,
            http_client.clone(),
        )?;

        Ok(Self {
            api_host,
            oauth,
            http_client,
        })
    }

    fn normalize(&self, user: &User, emails: &[UserEmail]) -> UserProvidedData {
        let mut list = EmailList::new();
        for email in emails {
            list.push_listed(text(&email.email), email.verified, email.primary);
        }

        let mut metadata = Claims::new(self.api_host.as_str(), user.id.to_string())
            .with_name(text(&user.name))
            .with_picture(text(&user.avatar_url))
            .with_preferred_username(text(&user.login));
        if let Some(primary) = emails
            .iter()
            .find(|email| email.primary && !text(&email.email).is_empty())
        {
            metadata = metadata.with_email(text(&primary.email), primary.verified);
        }

        UserProvidedData {
            emails: list.into_emails(),
            metadata,
        }
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Github
    }

    fn authorization_url(&self, state: &str) -> AuthorizationRequest {
        self.oauth.authorization_url(state)
    }

    async fn get_oauth_token(&self, code: &str) -> Result<Tokens, Error> {
        self.oauth.exchange_code(code).await
    }

    async fn get_user_data(&self, tokens: &Tokens) -> Result<UserProvidedData, Error> {
        let user: User = get_json(&self.http_client, tokens, &format!("{}/user", self.api_host))
            .await
            .map_err(profile_fetch_error)?;

        let emails: Option<Vec<UserEmail>> = get_json(
            &self.http_client,
            tokens,
            &format!("{}/user/emails", self.api_host),
        )
        .await
        .map_err(profile_fetch_error)?;

        let data = self.normalize(&user, &emails.unwrap_or_default());
        info!(
            "Fetched GitHub identity {} with {} email(s)",
            data.metadata.subject,
            data.emails.len()
        );
        Ok(data)
    }
}
