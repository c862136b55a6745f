//! Nextcloud OAuth provider implementation.

use async_trait::async_trait;
use tracing::info;

use super::api_v4;
use crate::error::{config_error, ConfigErrorKind, Error};
use crate::http::AuthenticatedClient;
use crate::identity::UserProvidedData;
use crate::oauth::client::OAuthClient;
use crate::oauth::config::{choose_host, ProviderConfig};
use crate::oauth::token::Tokens;
use crate::oauth::{AuthorizationRequest, ProviderKind};

/// Nextcloud OAuth provider.
///
/// Nextcloud is always self-hosted, so the instance URL must be configured.
/// Emails from the listing carry no confirmation status and are reported as
/// unverified; the profile email is verified once `confirmed_at` is set.
pub struct Provider {
    host: String,
    oauth: OAuthClient,
    http_client: AuthenticatedClient,
}

impl Provider {
    /// Create a new Nextcloud provider.
    ///
    /// The scope list is not used by Nextcloud.
    pub fn new(
        config: &ProviderConfig,
        _scopes: &str,
        http_client: AuthenticatedClient,
    ) -> Result<Self, Error> {
        config.validate()?;

        let Some(url) = config.host_override() else {
            return Err(config_error(
                ConfigErrorKind::MissingHost,
                "missing Nextcloud instance URL",
            ));
        };
        let host = choose_host(Some(url), "");

        let oauth = OAuthClient::new(
            config,
            format!("{}/oauth/authorize", host),
            format!("{}/oauth/token", host),
            vec![],
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
        ProviderKind::Nextcloud
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
            "Fetched Nextcloud identity {} with {} email(s)",
            data.metadata.subject,
            data.emails.len()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use mockito::{Mock, Server, ServerGuard};
    use serde_json::json;

    use super::*;
    use crate::error::{ErrorKind, HttpErrorKind, OAuthErrorKind};
    use crate::http::AuthenticatedClientBuilder;
    use crate::identity::Email;
    use crate::oauth::Provider as _;

    const TOKEN: &str = "nc-access-token";

    fn provider_for(server: &ServerGuard) -> Provider {
        let config = ProviderConfig::new("nc-client", "nc-secret", "https://auth.example.com/callback")
            .with_url(&format!("{}/", server.url()));
        Provider::new(
            &config,
            "",
            AuthenticatedClientBuilder::new().build().unwrap(),
        )
        .unwrap()
    }

    async fn mock_json(server: &mut ServerGuard, path: &str, body: serde_json::Value) -> Mock {
        server
            .mock("GET", path)
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    fn email(address: &str, verified: bool, primary: bool) -> Email {
        Email {
            email: address.to_string(),
            verified,
            primary,
        }
    }

    #[tokio::test]
    async fn test_get_user_data_example_identity() {
        let mut server = Server::new_async().await;
        let user = mock_json(
            &mut server,
            "/api/v4/user",
            json!({
                "email": "a@x.com",
                "confirmed_at": "2024-01-01",
                "name": "Ann",
                "avatar_url": "https://cloud.example.com/avatar/ann.png",
                "id": 7
            }),
        )
        .await;
        let emails = mock_json(
            &mut server,
            "/api/v4/user/emails",
            json!([{"id": 1, "email": "b@x.com"}]),
        )
        .await;

        let provider = provider_for(&server);
        let data = provider
            .get_user_data(&Tokens::bearer(TOKEN))
            .await
            .unwrap();

        assert_eq!(
            data.emails,
            vec![email("b@x.com", false, false), email("a@x.com", true, true)]
        );
        assert_eq!(data.metadata.subject, "7");
        assert_eq!(data.metadata.issuer, server.url());
        assert_eq!(data.metadata.name, "Ann");
        assert_eq!(data.metadata.full_name(), "Ann");
        assert_eq!(
            data.metadata.avatar_url(),
            "https://cloud.example.com/avatar/ann.png"
        );
        assert_eq!(data.metadata.provider_id(), "7");
        user.assert_async().await;
        emails.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_user_data_without_any_email() {
        let mut server = Server::new_async().await;
        let _user = mock_json(&mut server, "/api/v4/user", json!({"email": "", "id": 9})).await;
        let _emails = mock_json(&mut server, "/api/v4/user/emails", json!([])).await;

        let data = provider_for(&server)
            .get_user_data(&Tokens::bearer(TOKEN))
            .await
            .unwrap();

        assert!(data.emails.is_empty());
        assert_eq!(data.metadata.subject, "9");
    }

    #[tokio::test]
    async fn test_get_user_data_null_email_listing() {
        let mut server = Server::new_async().await;
        let _user = mock_json(
            &mut server,
            "/api/v4/user",
            json!({"email": "a@x.com", "confirmed_at": null, "id": 4}),
        )
        .await;
        let _emails = mock_json(&mut server, "/api/v4/user/emails", json!(null)).await;

        let data = provider_for(&server)
            .get_user_data(&Tokens::bearer(TOKEN))
            .await
            .unwrap();

        assert_eq!(data.emails, vec![email("a@x.com", false, true)]);
    }

    #[tokio::test]
    async fn test_get_user_data_is_idempotent() {
        let mut server = Server::new_async().await;
        let user = server
            .mock("GET", "/api/v4/user")
            .with_status(200)
            .with_body(json!({"email": "a@x.com", "confirmed_at": "2024-01-01", "id": 7}).to_string())
            .expect(2)
            .create_async()
            .await;
        let emails = server
            .mock("GET", "/api/v4/user/emails")
            .with_status(200)
            .with_body(json!([{"id": 1, "email": "b@x.com"}]).to_string())
            .expect(2)
            .create_async()
            .await;

        let provider = provider_for(&server);
        let tokens = Tokens::bearer(TOKEN);
        let first = provider.get_user_data(&tokens).await.unwrap();
        let second = provider.get_user_data(&tokens).await.unwrap();

        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
        user.assert_async().await;
        emails.assert_async().await;
    }

    #[tokio::test]
    async fn test_profile_failure_is_fatal_and_skips_emails() {
        let mut server = Server::new_async().await;
        let _user = server
            .mock("GET", "/api/v4/user")
            .with_status(401)
            .with_body(r#"{"message":"401 Unauthorized"}"#)
            .create_async()
            .await;
        let emails = server
            .mock("GET", "/api/v4/user/emails")
            .expect(0)
            .create_async()
            .await;

        let err = provider_for(&server)
            .get_user_data(&Tokens::bearer(TOKEN))
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::ProfileFetchFailed)
        );
        assert_eq!(err.http_kind(), Some(&HttpErrorKind::Status(401)));
        emails.assert_async().await;
    }

    #[tokio::test]
    async fn test_email_listing_failure_is_fatal() {
        let mut server = Server::new_async().await;
        let _user = mock_json(
            &mut server,
            "/api/v4/user",
            json!({"email": "a@x.com", "confirmed_at": "2024-01-01", "id": 7}),
        )
        .await;
        let _emails = server
            .mock("GET", "/api/v4/user/emails")
            .with_status(500)
            .create_async()
            .await;

        let result = provider_for(&server)
            .get_user_data(&Tokens::bearer(TOKEN))
            .await;

        let err = result.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::ProfileFetchFailed)
        );
        assert_eq!(err.http_kind(), Some(&HttpErrorKind::Status(500)));
    }

    #[tokio::test]
    async fn test_malformed_profile_is_decode_failure() {
        let mut server = Server::new_async().await;
        let _user = mock_json(&mut server, "/api/v4/user", json!({"email": "a@x.com"})).await;

        let err = provider_for(&server)
            .get_user_data(&Tokens::bearer(TOKEN))
            .await
            .unwrap_err();

        assert_eq!(err.http_kind(), Some(&HttpErrorKind::Decode));
    }

    #[tokio::test]
    async fn test_get_oauth_token_against_instance() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"nc-access-token","token_type":"Bearer","expires_in":3600}"#)
            .create_async()
            .await;

        let tokens = provider_for(&server)
            .get_oauth_token("auth-code")
            .await
            .unwrap();

        assert!(!tokens.is_expired());
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_oauth_token_honours_client_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections but never answer.
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let config = ProviderConfig::new("nc-client", "nc-secret", "https://auth.example.com/callback")
            .with_url(&format!("http://{}", addr));
        let http_client = AuthenticatedClientBuilder::new()
            .with_timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();
        let provider = Provider::new(&config, "", http_client).unwrap();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(3),
            provider.get_oauth_token("auth-code"),
        )
        .await
        .expect("token exchange should give up after the client timeout");

        assert_eq!(
            result.err().map(|e| e.error_kind),
            Some(ErrorKind::OAuth(OAuthErrorKind::TokenExchangeFailed))
        );
    }

    #[test]
    fn test_authorization_url_uses_instance_host() {
        let config = ProviderConfig::new("nc-client", "nc-secret", "https://auth.example.com/callback")
            .with_url("https://cloud.example.com/");
        let provider = Provider::new(
            &config,
            "ignored,scopes",
            AuthenticatedClientBuilder::new().build().unwrap(),
        )
        .unwrap();

        let request = provider.authorization_url("abc");

        assert!(request
            .url
            .starts_with("https://cloud.example.com/oauth/authorize?"));
        assert!(!request.url.contains("scope="));
        assert_eq!(provider.kind(), ProviderKind::Nextcloud);
    }

    #[test]
    fn test_missing_instance_url() {
        let config = ProviderConfig::new("nc-client", "nc-secret", "https://auth.example.com/callback");
        let result = Provider::new(&config, "", AuthenticatedClientBuilder::new().build().unwrap());

        assert_eq!(
            result.err().map(|e| e.error_kind),
            Some(ErrorKind::Config(ConfigErrorKind::MissingHost))
        );
    }
}
