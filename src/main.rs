use anyhow::Context;

use deskmate::agent::RouterAgent;
use deskmate::{config, repl};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deskmate::init_tracing();

    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    let config_path = config::find_config_path(&cwd)?;
    tracing::info!(config = %config_path.display(), "configuration loaded");

    let config = config::load_config(&config_path)?;
    let mut agent = RouterAgent::new(config)?;

    repl::run(&mut agent).await
}
