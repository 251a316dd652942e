//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pagelift static site publisher CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Config file name (default: pagelift.toml)
    #[arg(short = 'C', long, default_value = "pagelift.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Deploy overrides; anything set here wins over the config file
#[derive(clap::Args, Debug, Clone)]
pub struct DeployArgs {
    /// Directory holding the built site
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,

    /// Branch the site is published to
    #[arg(long)]
    pub branch: Option<String>,

    /// Target repository as OWNER/NAME
    #[arg(long)]
    pub repo: Option<String>,

    /// Commit message
    #[arg(short, long)]
    pub message: Option<String>,

    /// Keep the existing branch history instead of rewriting it
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub keep_history: Option<bool>,

    /// Share the branch with sites deployed from other projects
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub multiple_sites: Option<bool>,

    /// Commit even when nothing changed
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub allow_empty_commit: Option<bool>,

    /// Copy symlink targets instead of recreating the links
    #[arg(long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub follow_symlinks: Option<bool>,

    /// Stop after committing, do not push
    #[arg(short = 'n', long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub dry_run: Option<bool>,

    /// Log every copied file
    #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
    pub verbose: Option<bool>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a starter pagelift.toml
    Init {
        /// the directory for the config file, defaults to the current one
        path: Option<PathBuf>,
    },

    /// Verify the environment is ready to deploy
    Check,

    /// Publish the build directory to the remote branch
    Deploy {
        #[command(flatten)]
        deploy_args: DeployArgs,
    },
}

#[allow(unused)]
impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
    pub const fn is_check(&self) -> bool {
        matches!(self.command, Commands::Check)
    }
    pub const fn is_deploy(&self) -> bool {
        matches!(self.command, Commands::Deploy { .. })
    }

    pub fn deploy_args(&self) -> Option<&DeployArgs> {
        match &self.command {
            Commands::Deploy { deploy_args } => Some(deploy_args),
            _ => None,
        }
    }
}
