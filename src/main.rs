use identity_auth::http::AuthenticatedClientBuilder;
use identity_auth::oauth::{new_provider_with_client, random_state, ProviderKind};
use log::{error, info};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    if let Err(e) = run(&config).await {
        error!("Identity probe failed: {e}");
        std::process::exit(1);
    }
}

/// Print the authorization URL, or trade a code for the normalized identity.
async fn run(config: &Config) -> Result<(), identity_auth::Error> {
    let kind: ProviderKind = config.provider.parse()?;
    let http_client =
        AuthenticatedClientBuilder::from_config(config.http_client_config()).build()?;
    let provider = new_provider_with_client(
        kind,
        &config.provider_config(),
        &config.provider_scopes,
        http_client,
    )?;

    match config.code.as_deref() {
        None => {
            let state = config.state.clone().unwrap_or_else(random_state);
            let request = provider.authorization_url(&state);
            info!("Sign in with {} using state {}", kind, request.state);
            println!("{}", request.url);
        }
        Some(code) => {
            info!("Exchanging authorization code with {}...", kind);
            let tokens = provider.get_oauth_token(code).await?;
            let identity = provider.get_user_data(&tokens).await?;
            println!("{}", serde_json::to_string_pretty(&identity)?);
        }
    }

    Ok(())
}
