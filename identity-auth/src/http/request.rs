//! Bearer-authenticated JSON GET against provider APIs.

use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::AuthenticatedClient;
use crate::error::{http_error, Error, ErrorKind, HttpErrorKind};
use crate::oauth::token::Tokens;

/// Fetch `url` with the access token as bearer authorization and decode the
/// JSON body into `T`.
///
/// One outbound call per invocation. Failures map to `HttpErrorKind::Transport`,
/// `HttpErrorKind::Status` or `HttpErrorKind::Decode` and are returned as-is.
pub async fn get_json<T: DeserializeOwned>(
    client: &AuthenticatedClient,
    tokens: &Tokens,
    url: &str,
) -> Result<T, Error> {
    let url = Url::parse(url).map_err(|e| Error {
        source: Some(Box::new(e)),
        error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
    })?;

    debug!("GET {}", url);

    let response = client
        .get(url.clone())
        .bearer_auth(tokens.access_token.expose_secret())
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|e| {
            let err = Error::from(e);
            warn!("Request to {} failed: {}", url, err);
            err
        })?;

    let status = response.status();
    let body = response.bytes().await.map_err(|e| {
        let err = Error::from(e);
        warn!("Failed to read response body from {}: {}", url, err);
        err
    })?;

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body);
        warn!("{} responded with {}: {}", url, status, text);
        return Err(http_error(
            HttpErrorKind::Status(status.as_u16()),
            &format!("{} responded with {}: {}", url, status, text),
        ));
    }

    serde_json::from_slice(&body).map_err(|e| {
        warn!("Failed to decode response from {}: {}", url, e);
        Error::from(e)
    })
}
