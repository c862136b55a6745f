//! Per-provider OAuth client configuration.

use secrecy::{ExposeSecret, Secret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::error::{config_error, ConfigErrorKind, Error, ErrorKind};

/// Credentials and endpoints for one external identity provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    /// Whether the provider may be used at all.
    #[serde(default)]
    pub enabled: bool,
    /// OAuth client ids; the first one is used for the authorization-code flow.
    #[serde(default)]
    pub client_id: Vec<String>,
    /// OAuth client secret.
    #[serde(default)]
    pub secret: Option<SecretString>,
    /// Host override, e.g. a self-hosted instance.
    #[serde(default)]
    pub url: Option<String>,
    /// Callback URL registered with the provider.
    #[serde(default)]
    pub redirect_uri: String,
}

impl ProviderConfig {
    /// Enabled configuration with a single client id.
    pub fn new(client_id: &str, secret: &str, redirect_uri: &str) -> Self {
        Self {
            enabled: true,
            client_id: vec![client_id.to_string()],
            secret: Some(Secret::new(secret.to_string())),
            url: None,
            redirect_uri: redirect_uri.to_string(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    /// The client id used for the authorization-code flow.
    pub fn client_id(&self) -> &str {
        self.client_id.first().map(String::as_str).unwrap_or_default()
    }

    pub fn secret(&self) -> &str {
        self.secret
            .as_ref()
            .map(|secret| secret.expose_secret().as_str())
            .unwrap_or_default()
    }

    /// The configured host override, if one was given.
    pub fn host_override(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Reject configurations that cannot drive an authorization-code flow.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.enabled {
            return Err(config_error(
                ConfigErrorKind::Disabled,
                "provider is not enabled",
            ));
        }
        if self.client_id().is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingClientId,
                "missing OAuth client ID",
            ));
        }
        if self.secret().is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingSecret,
                "missing OAuth secret",
            ));
        }
        if self.redirect_uri.is_empty() {
            return Err(config_error(
                ConfigErrorKind::MissingRedirectUri,
                "missing redirect URI",
            ));
        }
        parse_url(&self.redirect_uri)?;
        if let Some(url) = self.host_override() {
            parse_url(url)?;
        }
        Ok(())
    }
}

fn parse_url(value: &str) -> Result<Url, Error> {
    Url::parse(value).map_err(|e| Error {
        source: Some(format!("invalid URL {:?}: {}", value, e).into()),
        error_kind: ErrorKind::Config(ConfigErrorKind::InvalidUrl),
    })
}

/// Resolve the base URL for a provider.
///
/// An override is used as given minus one trailing slash; without one the
/// provider's default host is reached over https.
pub fn choose_host(base: Option<&str>, default_host: &str) -> String {
    match base.filter(|base| !base.is_empty()) {
        Some(base) => base.strip_suffix('/').unwrap_or(base).to_string(),
        None => format!("https://{}", default_host),
    }
}

/// Split a comma-separated scope list, dropping blanks.
pub fn split_scopes(scopes: &str) -> Vec<String> {
    scopes
        .split(',')
        .map(str::trim)
        .filter(|scope| !scope.is_empty())
        .map(str::to_string)
        .collect()
}
