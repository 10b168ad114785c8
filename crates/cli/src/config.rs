pub use tacktrack_core::config::*;

use crate::cli::Cli;

pub fn from_cli(cli: &Cli) -> anyhow::Result<AppConfig> {
    AppConfig::discover(ConfigOverrides {
        api_url: cli.api_url.clone(),
        timeout_secs: cli.timeout,
    })
}
