use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authmachine_oidc::{Config, ProviderClient};
use authmachine_oidc_axum::{AppState, app_router};

mod server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let config = Config::from_env()?;

    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={default_level},authmachine_oidc={default_level},authmachine_oidc_axum={default_level},tower_http={default_level}",
                    env!("CARGO_CRATE_NAME")
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Loaded configuration: {:?}", config);

    let port = config.port;
    let client = ProviderClient::discover(config).await?;
    tracing::info!("Discovered provider {}", client.metadata().issuer);

    let state = AppState::new(client)?;
    server::serve(port, app_router(state)).await?;

    Ok(())
}
