use std::error::Error;

use apiary_common::config::MarketConfig;
use apiary_market::db::connect_and_migrate;
use apiary_market::routes::build_router;
use apiary_market::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = MarketConfig::from_env()?;
    let pool = connect_and_migrate(&config.database_url).await?;

    let git_sha = std::env::var("GIT_SHA").ok();
    let boot_id = std::env::var("MARKET_BOOT_ID")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| format!("market-{}", std::process::id()));

    let state = AppState::new(boot_id, git_sha, pool, config.fees);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "market listening");
    axum::serve(listener, app).await?;

    Ok(())
}
