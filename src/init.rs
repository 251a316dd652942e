//! Project initialization module.
//!
//! Writes a starter configuration file with the default settings.

use crate::{config::PagesConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Default config filename
const CONFIG_FILE: &str = "pagelift.toml";

/// Write a starter config into `path` (or the current directory)
pub fn write_starter_config(path: Option<&Path>) -> Result<()> {
    let dir = path.unwrap_or(Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let target = dir.join(CONFIG_FILE);
    if target.exists() {
        bail!(
            "`{}` already exists. Remove it manually or init in a different path.",
            target.display()
        );
    }

    let content = toml::to_string_pretty(&PagesConfig::default())?;
    fs::write(&target, content)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    log!("init"; "wrote {}", target.display());

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn with_temp_dir<F>(f: F)
    where
        F: FnOnce(&Path),
    {
        let temp_dir = tempfile::tempdir().unwrap();
        f(temp_dir.path());
    }

    #[test]
    fn test_starter_config_is_written_and_parses() {
        with_temp_dir(|dir| {
            write_starter_config(Some(dir)).unwrap();

            let target = dir.join(CONFIG_FILE);
            let config = PagesConfig::from_path(&target).unwrap();
            assert_eq!(config.remote.branch, "gh-pages");
            assert_eq!(config.site.build_dir, Path::new("public"));
        });
    }

    #[test]
    fn test_starter_config_has_all_sections() {
        with_temp_dir(|dir| {
            write_starter_config(Some(dir)).unwrap();

            let content = fs::read_to_string(dir.join(CONFIG_FILE)).unwrap();
            for section in ["[remote]", "[site]", "[publish]", "[commit]"] {
                assert!(content.contains(section), "missing {section}");
            }
        });
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        with_temp_dir(|dir| {
            write_starter_config(Some(dir)).unwrap();
            assert!(write_starter_config(Some(dir)).is_err());
        });
    }

    #[test]
    fn test_init_creates_missing_directories() {
        with_temp_dir(|dir| {
            let nested = dir.join("sites/blog");
            write_starter_config(Some(&nested)).unwrap();
            assert!(nested.join(CONFIG_FILE).exists());
        });
    }
}
