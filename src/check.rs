//! Pre-deployment environment checks.
//!
//! `pagelift check` walks through everything a deploy needs and reports
//! each finding. Missing credentials and a missing build directory only
//! warn, since both typically appear later in a CI pipeline; a missing
//! git binary or an invalid configuration fails the check.

use crate::config::PagesConfig;
use crate::credentials::RemoteCredentials;
use crate::log;
use anyhow::{Result, bail};

/// Verify the environment is ready to deploy
pub fn check_environment(config: &PagesConfig) -> Result<()> {
    let mut problems = 0;

    match which::which("git") {
        Ok(path) => log!("check"; "git: {}", path.display()),
        Err(_) => {
            log!("error"; "git: not found in PATH");
            problems += 1;
        }
    }

    match config.validate() {
        Ok(()) if config.config_path.is_file() => {
            log!("check"; "config: {}", config.config_path.display());
        }
        Ok(()) => log!("check"; "config: defaults (no config file)"),
        Err(err) => {
            log!("error"; "config: {err:#}");
            problems += 1;
        }
    }

    let build_dir = &config.site.build_dir;
    if build_dir.is_dir() {
        log!("check"; "build dir: {}", build_dir.display());
    } else {
        log!("warn"; "build dir: {} not found, build the site first", build_dir.display());
    }

    match RemoteCredentials::from_env(true)? {
        RemoteCredentials::Anonymous => {
            log!("warn"; "credentials: none, set GH_PAT or GITHUB_TOKEN to push");
        }
        creds => log!("check"; "credentials: {}", creds.source_name()),
    }

    if problems > 0 {
        bail!("Environment is not ready ({problems} problem(s) above)");
    }
    log!("check"; "ready to deploy");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_fails_on_invalid_config() {
        let config = PagesConfig::from_str(r#"
            [remote]
            repo = "not-a-slug"
        "#)
        .unwrap();
        assert!(check_environment(&config).is_err());
    }

    #[test]
    fn test_check_passes_with_valid_config() {
        // Build dir may be absent; that is a warning, not a failure
        let config = PagesConfig::from_str(r#"
            [remote]
            repo = "alice/blog"
        "#)
        .unwrap();
        assert!(check_environment(&config).is_ok());
    }
}
