//! Create the superuser named by `DJANGO_SUPERUSER_USERNAME` / `_EMAIL` / `_PASSWORD`
//! unless it already exists. Requires `DATABASE_URL`.

use catalog_api::bootstrap::{connect_persistent, create_superuser, SuperuserSpec};
use catalog_api::load_from_env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("catalog_api=info".parse()?))
        .init();

    let config = load_from_env()?;
    let repos = connect_persistent(&config).await?;
    let outcome = create_superuser(repos.users.as_ref(), SuperuserSpec::from_env().as_ref()).await?;
    tracing::info!(?outcome, "bootstrap finished");
    Ok(())
}
