//! Provider construction by kind, and a registry of the enabled ones.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::config::ProviderConfig;
use super::provider::{Provider, ProviderKind};
use super::providers::{github, gitlab, nextcloud};
use crate::error::{config_error, ConfigErrorKind, Error};
use crate::http::{AuthenticatedClient, AuthenticatedClientBuilder};

/// Build a provider adapter with the default HTTP client.
///
/// `scopes` is a comma-separated list of extra scopes, ignored by providers
/// that do not take any.
pub fn new_provider(
    kind: ProviderKind,
    config: &ProviderConfig,
    scopes: &str,
) -> Result<Box<dyn Provider>, Error> {
    let http_client = AuthenticatedClientBuilder::new().build()?;
    new_provider_with_client(kind, config, scopes, http_client)
}

/// Build a provider adapter around an existing HTTP client.
pub fn new_provider_with_client(
    kind: ProviderKind,
    config: &ProviderConfig,
    scopes: &str,
    http_client: AuthenticatedClient,
) -> Result<Box<dyn Provider>, Error> {
    debug!("Building {} provider", kind);

    let provider: Box<dyn Provider> = match kind {
        ProviderKind::Nextcloud => Box::new(nextcloud::Provider::new(config, scopes, http_client)?),
        ProviderKind::Gitlab => Box::new(gitlab::Provider::new(config, scopes, http_client)?),
        ProviderKind::Github => Box::new(github::Provider::new(config, scopes, http_client)?),
    };
    Ok(provider)
}

/// Enabled provider adapters keyed by kind.
#[derive(Default)]
pub struct Registry {
    providers: HashMap<ProviderKind, Arc<dyn Provider>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every enabled `(kind, config, scopes)` entry.
    ///
    /// Disabled entries are skipped. Any enabled entry that fails validation
    /// fails the whole registry.
    pub fn from_configs<'a, I>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (ProviderKind, &'a ProviderConfig, &'a str)>,
    {
        let http_client = AuthenticatedClientBuilder::new().build()?;
        Self::from_configs_with_client(entries, http_client)
    }

    /// Like [`Registry::from_configs`], sharing one HTTP client between adapters.
    pub fn from_configs_with_client<'a, I>(
        entries: I,
        http_client: AuthenticatedClient,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (ProviderKind, &'a ProviderConfig, &'a str)>,
    {
        let mut registry = Self::new();
        for (kind, config, scopes) in entries {
            if !config.enabled {
                debug!("Skipping disabled provider {}", kind);
                continue;
            }
            let provider = new_provider_with_client(kind, config, scopes, http_client.clone())?;
            registry.register(Arc::from(provider));
        }

        info!("Registered {} identity provider(s)", registry.len());
        Ok(registry)
    }

    /// Add an adapter, replacing any previous one of the same kind.
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.kind(), provider);
    }

    /// Look up an adapter by its configuration name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Provider>, Error> {
        let kind: ProviderKind = name.parse()?;
        self.providers.get(&kind).cloned().ok_or_else(|| {
            config_error(
                ConfigErrorKind::UnknownProvider,
                &format!("provider {} is not enabled", kind),
            )
        })
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|kind| kind.as_str());
        kinds
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn config(url: Option<&str>) -> ProviderConfig {
        let config = ProviderConfig::new("client", "secret", "https://auth.example.com/callback");
        match url {
            Some(url) => config.with_url(url),
            None => config,
        }
    }

    #[test]
    fn test_new_provider_for_each_kind() {
        let nextcloud = config(Some("https://cloud.example.com"));
        let public = config(None);

        for (kind, config) in [
            (ProviderKind::Nextcloud, &nextcloud),
            (ProviderKind::Gitlab, &public),
            (ProviderKind::Github, &public),
        ] {
            let provider = new_provider(kind, config, "").unwrap();
            assert_eq!(provider.kind(), kind);
        }
    }

    #[test]
    fn test_missing_secret_builds_nothing() {
        let config = ProviderConfig {
            secret: None,
            ..config(Some("https://cloud.example.com"))
        };

        let err = new_provider(ProviderKind::Nextcloud, &config, "")
            .err()
            .unwrap();

        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::MissingSecret)
        );
    }

    #[test]
    fn test_invalid_host_override() {
        let err = new_provider(ProviderKind::Gitlab, &config(Some("not a url")), "")
            .err()
            .unwrap();

        assert_eq!(err.error_kind, ErrorKind::Config(ConfigErrorKind::InvalidUrl));
    }

    #[test]
    fn test_registry_skips_disabled_entries() {
        let nextcloud = config(Some("https://cloud.example.com"));
        let github = ProviderConfig {
            enabled: false,
            ..config(None)
        };

        let registry = Registry::from_configs([
            (ProviderKind::Nextcloud, &nextcloud, ""),
            (ProviderKind::Github, &github, "read:org"),
        ])
        .unwrap();

        assert_eq!(registry.kinds(), vec![ProviderKind::Nextcloud]);
        assert_eq!(
            registry.get("NEXTCLOUD").unwrap().kind(),
            ProviderKind::Nextcloud
        );

        let err = registry.get("github").err().unwrap();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::UnknownProvider)
        );
    }

    #[test]
    fn test_registry_rejects_invalid_enabled_entry() {
        let nextcloud_without_url = config(None);

        let result = Registry::from_configs([(ProviderKind::Nextcloud, &nextcloud_without_url, "")]);

        assert_eq!(
            result.err().map(|e| e.error_kind),
            Some(ErrorKind::Config(ConfigErrorKind::MissingHost))
        );
    }

    #[test]
    fn test_registry_unknown_name() {
        let registry = Registry::new();

        assert!(registry.is_empty());
        let err = registry.get("myspace").err().unwrap();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::UnknownProvider)
        );
    }
}
