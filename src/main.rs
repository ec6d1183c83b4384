use anyhow::Context;
use api::core::server_config::ServerConfig;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment is used as-is.
    let _ = dotenvy::dotenv();

    llm_provider::telemetry::init("info", Level::INFO).context("failed to install tracing")?;

    let config = ServerConfig::from_env().context("invalid listener configuration")?;
    api::start(config).await.context("relay server failed")?;

    Ok(())
}
