pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod seeding;

use std::sync::Arc;

use anyhow::{Context, Result};

pub use tacktrack_core as core;
pub use tacktrack_core::calendar;
pub use tacktrack_core::capture;
pub use tacktrack_core::model;
pub use tacktrack_core::parser;
pub use tacktrack_core::views;

pub use tacktrack_core::AppConfig;

use crate::cli::{Cli, CliCommand};
use crate::core::{HttpGateway, MemoryGateway, TaskGateway, TaskStore};

/// Build the session store, pointing at the REST API unless `--demo` was given.
pub async fn build_store(cli: &Cli) -> Result<TaskStore> {
    if cli.demo {
        let store = TaskStore::new(Arc::new(MemoryGateway::new()));
        seeding::seed_sample_tasks(&store).await?;
        return Ok(store);
    }

    let config = config::from_cli(cli)?;
    tracing::debug!(
        api = config.api_base_url(),
        timeout_secs = config.request_timeout().as_secs(),
        "using task API"
    );
    let gateway: Arc<dyn TaskGateway> =
        Arc::new(HttpGateway::new(&config).context("failed to initialise HTTP client")?);
    Ok(TaskStore::new(gateway))
}

pub async fn run(cli: Cli) -> Result<()> {
    logging::init_tracing(&cli.log_filter)?;
    let store = build_store(&cli).await?;
    let command = cli.command.unwrap_or(CliCommand::Dashboard);
    commands::execute(&store, command, std::io::stdout()).await
}

/// Run a command on an internal Tokio runtime.
pub fn run_blocking(cli: Cli) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(run(cli))
}
