//! Catalog server: loads config from the environment, opens the store (Postgres when
//! `DATABASE_URL` is set, otherwise in memory) and serves the API.

use catalog_api::{app, connect, load_from_env, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("catalog_api=info".parse()?))
        .init();

    let config = load_from_env()?;
    let repos = connect(&config).await?;
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config, repos);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
