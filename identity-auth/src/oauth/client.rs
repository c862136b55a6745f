//! Authorization-code grant against a provider's fixed OAuth endpoints.

use oauth2::basic::BasicClient;
use oauth2::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, HttpRequest, HttpResponse,
    RedirectUrl, RequestTokenError, Scope, TokenUrl,
};
use tracing::{debug, info, warn};

use super::config::ProviderConfig;
use super::token::Tokens;
use super::AuthorizationRequest;
use crate::error::{
    http_error, oauth_error, ConfigErrorKind, Error, ErrorKind, HttpErrorKind, OAuthErrorKind,
};
use crate::http::AuthenticatedClient;

/// OAuth client bound to one provider's authorize/token endpoints.
///
/// The token request goes through the same HTTP client as the profile
/// requests, so it carries the configured timeout and user agent.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    inner: BasicClient,
    http_client: AuthenticatedClient,
    token_url: String,
    scopes: Vec<String>,
}

fn invalid_url(err: oauth2::url::ParseError) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::Config(ConfigErrorKind::InvalidUrl),
    }
}

/// Random URL-safe value for the `state` parameter of a new login.
pub fn random_state() -> String {
    CsrfToken::new_random().secret().to_string()
}

impl OAuthClient {
    pub fn new(
        config: &ProviderConfig,
        auth_url: String,
        token_url: String,
        scopes: Vec<String>,
        http_client: AuthenticatedClient,
    ) -> Result<Self, Error> {
        let inner = BasicClient::new(
            ClientId::new(config.client_id().to_string()),
            Some(ClientSecret::new(config.secret().to_string())),
            AuthUrl::new(auth_url).map_err(invalid_url)?,
            Some(TokenUrl::new(token_url.clone()).map_err(invalid_url)?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_uri.clone()).map_err(invalid_url)?);

        Ok(Self {
            inner,
            http_client,
            token_url,
            scopes,
        })
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// URL to send the end user to, carrying `state` for the callback.
    pub fn authorization_url(&self, state: &str) -> AuthorizationRequest {
        let state = state.to_string();
        let (url, csrf_token) = self
            .inner
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .url();

        AuthorizationRequest {
            url: url.to_string(),
            state: csrf_token.secret().to_string(),
        }
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<Tokens, Error> {
        if code.is_empty() {
            return Err(oauth_error(
                OAuthErrorKind::TokenExchangeFailed,
                "authorization code is empty",
            ));
        }

        debug!("Exchanging authorization code at {}", self.token_url);

        let response = self
            .inner
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(|request| send_token_request(&self.http_client, request))
            .await
            .map_err(|e| {
                let message = match &e {
                    RequestTokenError::ServerResponse(err) => {
                        format!("provider rejected the authorization code: {}", err)
                    }
                    RequestTokenError::Request(err) => format!("token request failed: {}", err),
                    RequestTokenError::Parse(err, body) => format!(
                        "unparsable token response ({}): {}",
                        err,
                        String::from_utf8_lossy(body)
                    ),
                    RequestTokenError::Other(message) => message.clone(),
                };
                warn!("OAuth token exchange failed: {}", message);
                oauth_error(OAuthErrorKind::TokenExchangeFailed, &message)
            })?;

        info!("Authorization code exchanged at {}", self.token_url);
        Ok(Tokens::from(response))
    }
}

/// Execute an oauth2 token request with the adapter's HTTP client.
async fn send_token_request(
    client: &AuthenticatedClient,
    request: HttpRequest,
) -> Result<HttpResponse, Error> {
    let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes()).map_err(|e| {
        http_error(
            HttpErrorKind::BuilderFailed,
            &format!("unsupported method {}: {}", request.method, e),
        )
    })?;

    let mut builder = client.request(method, request.url.as_str());
    for (name, value) in request.headers.iter() {
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let response = builder.body(request.body).send().await?;

    let status = response.status().as_u16();
    let status_code = StatusCode::from_u16(status)
        .map_err(|e| http_error(HttpErrorKind::Status(status), &e.to_string()))?;
    let mut headers = HeaderMap::new();
    for (name, value) in response.headers() {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_str().as_bytes()),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            headers.append(name, value);
        }
    }
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
