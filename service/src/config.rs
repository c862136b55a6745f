use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use identity_auth::http::HttpClientConfig;
use identity_auth::oauth::ProviderConfig;
use log::LevelFilter;
use secrecy::Secret;
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The external identity provider to sign in with (nextcloud, gitlab or github).
    #[arg(short, long, env, default_value = "nextcloud")]
    pub provider: String,

    /// OAuth client IDs registered with the provider. The first one drives the
    /// authorization-code flow.
    #[arg(long, env, value_delimiter = ',', use_value_delimiter = true)]
    pub provider_client_id: Vec<String>,

    /// The OAuth client secret registered with the provider.
    #[arg(long, env, hide_env_values = true)]
    provider_secret: Option<String>,

    /// Base URL of a self-hosted provider instance. Required for Nextcloud.
    #[arg(long, env)]
    pub provider_url: Option<String>,

    /// The callback URL the provider redirects back to after sign-in.
    #[arg(long, env, default_value = "")]
    pub provider_redirect_uri: String,

    /// Whether the configured provider may be used.
    #[arg(long, env, default_value_t = true, action = clap::ArgAction::Set)]
    pub provider_enabled: bool,

    /// Extra OAuth scopes to request, comma separated.
    #[arg(long, env, default_value = "")]
    pub provider_scopes: String,

    /// Timeout in seconds for each provider API call
    #[arg(long, env, default_value_t = 10)]
    pub http_timeout_secs: u64,

    /// Number of transport-level retries for provider API calls
    #[arg(long, env, default_value_t = 0)]
    pub http_max_retries: u32,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Authorization code returned to the redirect URI. Without one, only the
    /// authorization URL is printed.
    #[arg(short, long, env = "PROVIDER_CODE")]
    pub code: Option<String>,

    /// State value to embed in the authorization URL. A random one is used when
    /// not given.
    #[arg(long, env = "PROVIDER_STATE")]
    pub state: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    /// Returns the provider configuration consumed by the identity-auth factory.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            enabled: self.provider_enabled,
            client_id: self.provider_client_id.clone(),
            secret: self.provider_secret.clone().map(Secret::new),
            url: self.provider_url.clone(),
            redirect_uri: self.provider_redirect_uri.clone(),
        }
    }

    /// Returns the HTTP client settings for provider API calls.
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.http_timeout_secs),
            max_retries: self.http_max_retries,
            ..HttpClientConfig::default()
        }
    }
}
