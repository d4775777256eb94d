use anyhow::Context;
use madr::{config::Config, database, handlers, observability, server::Server, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    observability::init_tracing(&config)?;
    config.warn_insecure_defaults();

    let pool = database::connect(&config.database)
        .await
        .context("failed to open the catalog database")?;
    let state = AppState::new(config.clone(), pool)?;

    Server::new(config).serve(handlers::router(state)).await?;

    Ok(())
}
