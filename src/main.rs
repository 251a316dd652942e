//! Pagelift - publish a prebuilt static site to a git branch.

mod check;
mod cli;
mod config;
mod credentials;
mod deploy;
mod init;
mod logger;
mod stage;
mod utils;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::PagesConfig;
use deploy::deploy_site;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match &cli.command {
        Commands::Init { path } => init::write_starter_config(path.as_deref()),
        Commands::Check => {
            let config = load_config(cli)?;
            check::check_environment(&config)
        }
        Commands::Deploy { .. } => {
            let config: &'static PagesConfig = Box::leak(Box::new(load_config(cli)?));
            deploy_site(config).map(|_| ())
        }
    }
}

/// Load configuration, starting from defaults when no file is present.
///
/// Everything has a default or an environment fallback, so running
/// without a config file is supported (the CI case).
fn load_config(cli: &'static Cli) -> Result<PagesConfig> {
    let mut config = if cli.config.exists() {
        PagesConfig::from_path(&cli.config)?
    } else {
        PagesConfig::default()
    };
    config.update_with_cli(cli);

    if cli.is_deploy() {
        config.validate()?;
    }

    Ok(config)
}
