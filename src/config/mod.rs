//! Deployment configuration management for `pagelift.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                        |
//! |-------------|------------------------------------------------|
//! | `[remote]`  | Target repository (domain, repo, branch)       |
//! | `[site]`    | Build output and pages metadata (CNAME, jekyll)|
//! | `[publish]` | Mode switches (history, multi-site, dry run)   |
//! | `[commit]`  | Commit identities and message                  |
//!
//! # Example
//!
//! ```toml
//! [remote]
//! repo = "alice/alice.github.io"
//! branch = "gh-pages"
//!
//! [site]
//! build_dir = "public"
//! fqdn = "www.example.com"
//! jekyll = false
//!
//! [publish]
//! keep_history = true
//!
//! [commit]
//! message = "Deploy to GitHub pages"
//! ```

mod commit;
pub mod defaults;
mod error;
mod publish;
mod remote;
mod site;

// Internal imports used in this module
use commit::CommitConfig;
use error::ConfigError;
use publish::PublishConfig;
use remote::RemoteConfig;
use site::SiteConfig;

use crate::cli::Cli;
use crate::utils::mailbox::Mailbox;
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing pagelift.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PagesConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Target repository
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Build output and pages metadata
    #[serde(default)]
    pub site: SiteConfig,

    /// Publishing mode switches
    #[serde(default)]
    pub publish: PublishConfig,

    /// Commit identities and message
    #[serde(default)]
    pub commit: CommitConfig,
}

impl PagesConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: PagesConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);
        self.config_path = Self::normalize_path(&cli.config);

        if let Some(args) = cli.deploy_args() {
            Self::update_option(&mut self.site.build_dir, args.build_dir.as_ref());
            Self::update_option(&mut self.remote.branch, args.branch.as_ref());
            Self::update_option(&mut self.remote.repo, args.repo.as_ref());
            Self::update_option(&mut self.commit.message, args.message.as_ref());
            Self::update_option(&mut self.publish.keep_history, args.keep_history.as_ref());
            Self::update_option(
                &mut self.publish.multiple_sites,
                args.multiple_sites.as_ref(),
            );
            Self::update_option(
                &mut self.publish.allow_empty_commit,
                args.allow_empty_commit.as_ref(),
            );
            Self::update_option(
                &mut self.site.follow_symlinks,
                args.follow_symlinks.as_ref(),
            );
            Self::update_option(&mut self.publish.dry_run, args.dry_run.as_ref());
            Self::update_option(&mut self.publish.verbose, args.verbose.as_ref());
        }

        self.resolve_build_dir();
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Expand `~` and anchor the build directory.
    ///
    /// With `absolute_build_dir` the path is taken as given; otherwise it
    /// resolves against the invocation directory.
    fn resolve_build_dir(&mut self) {
        let raw = self.site.build_dir.to_string_lossy().into_owned();
        let expanded = PathBuf::from(shellexpand::tilde(&raw).into_owned());
        self.site.build_dir = if self.site.absolute_build_dir {
            expanded
        } else {
            Self::normalize_path(&expanded)
        };
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration before deploying
    pub fn validate(&self) -> Result<()> {
        Self::check_command_installed("git")?;

        if self.remote.domain.trim().is_empty() {
            bail!(ConfigError::Validation(
                "[remote] domain must not be empty".into()
            ));
        }

        let repo = self.remote.repo.trim();
        if repo.is_empty() {
            bail!(
                "[remote] repo is not set. Add it to pagelift.toml, pass --repo, \
                 or export GITHUB_REPOSITORY."
            );
        }
        if !Self::is_repo_slug(repo) {
            bail!(ConfigError::Validation(format!(
                "[remote] repo must be `OWNER/NAME`, got `{repo}`"
            )));
        }

        if self.remote.branch.trim().is_empty() {
            bail!(ConfigError::Validation(
                "[remote] branch must not be empty".into()
            ));
        }

        if self.site.absolute_build_dir && !self.site.build_dir.is_absolute() {
            bail!(ConfigError::Validation(
                "[site] absolute_build_dir is set but build_dir is not an absolute path".into()
            ));
        }

        self.commit
            .committer
            .parse::<Mailbox>()
            .context("[commit] committer is invalid")?;
        self.commit
            .author
            .parse::<Mailbox>()
            .context("[commit] author is invalid")?;

        if self.commit.message.trim().is_empty() {
            bail!(ConfigError::Validation(
                "[commit] message must not be empty".into()
            ));
        }

        Ok(())
    }

    /// `OWNER/NAME`: exactly one slash, both sides non-empty
    fn is_repo_slug(repo: &str) -> bool {
        let mut parts = repo.split('/');
        matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        )
    }

    /// Check if a command is installed and available
    fn check_command_installed(cmd: &str) -> Result<()> {
        which::which(cmd).with_context(|| format!("`{cmd}` not found. Please install it first."))?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
