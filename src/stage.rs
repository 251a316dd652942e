//! Copy the built site into the publishing worktree.

use crate::log;
use crate::logger::Dots;
use anyhow::{Context, Result};
use std::{
    fs, io,
    path::{Component, Path},
};
use walkdir::WalkDir;

// ============================================================================
// Copy Summary
// ============================================================================

/// Per-entry copy results for one staging pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopySummary {
    /// Files and links placed in the worktree
    pub copied: usize,
    /// Entries that could not be copied
    pub failed: usize,
}

// ============================================================================
// Staging
// ============================================================================

/// Empty the worktree directories this deployment owns.
///
/// On a shared branch every top-level name in the build output belongs to
/// this site. A same-named directory on the branch is emptied so deleted
/// files actually disappear, even when the new build ships that name as a
/// plain file; a same-named non-directory is left for the copy pass to
/// overwrite. Sibling entries from other sites are never touched. Returns
/// the number of directories cleared.
pub fn isolate_site_dirs(worktree: &Path, build_dir: &Path) -> Result<usize> {
    let mut cleared = 0;

    let entries = fs::read_dir(build_dir)
        .with_context(|| format!("Failed to read build directory {}", build_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        if name == ".git" {
            continue;
        }

        let owned = worktree.join(&name);
        if owned.is_dir() {
            clear_dir(&owned)
                .with_context(|| format!("Failed to clear {}", owned.display()))?;
            cleared += 1;
        } else if owned.symlink_metadata().is_ok() {
            log!("warn"; "{}: on the branch but not a directory, leaving it to the copy",
                name.to_string_lossy());
        }
    }

    Ok(cleared)
}

/// Remove everything inside `dir`, keeping the directory itself
fn clear_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Copy the build output into the worktree.
///
/// Directory entries are created as needed; file and symlink entries count
/// toward the summary. A failed entry is recorded and skipped rather than
/// aborting the whole pass, so one unreadable file cannot sink a deploy.
/// With `follow_symlinks` links are dereferenced during the walk; otherwise
/// they are recreated as links in the worktree.
pub fn materialize(
    build_dir: &Path,
    worktree: &Path,
    follow_symlinks: bool,
    verbose: bool,
) -> Result<CopySummary> {
    let mut summary = CopySummary::default();
    let mut failures: Vec<String> = Vec::new();
    let mut dots = Dots::new();

    for entry in WalkDir::new(build_dir).follow_links(follow_symlinks) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => match err.path() {
                Some(path) => {
                    summary.failed += 1;
                    failures.push(format!("{}: {err}", path.display()));
                    continue;
                }
                None => return Err(err).context("Failed to walk the build directory"),
            },
        };

        let rel = entry
            .path()
            .strip_prefix(build_dir)
            .context("Walked entry is outside the build directory")?;
        if rel.as_os_str().is_empty() {
            continue;
        }
        // A .git of the built site must never reach the publishing tree
        if rel.components().next() == Some(Component::Normal(".git".as_ref())) {
            continue;
        }

        let target = worktree.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if let Err(err) = fs::create_dir_all(&target) {
                summary.failed += 1;
                failures.push(format!("{}: {err}", rel.display()));
            }
            continue;
        }

        let result = if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)
        } else {
            copy_file(entry.path(), &target)
        };

        match result {
            Ok(()) => {
                summary.copied += 1;
                if verbose {
                    log!("copy"; "{}", rel.display());
                } else {
                    dots.tick();
                }
            }
            Err(err) => {
                summary.failed += 1;
                failures.push(format!("{}: {err}", rel.display()));
            }
        }
    }

    dots.finish();
    for failure in &failures {
        log!("error"; "{failure}");
    }

    Ok(summary)
}

fn copy_file(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

/// Recreate `src` as a symlink at `dst`, replacing whatever sits there
#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let link_target = fs::read_link(src)?;
    match fs::symlink_metadata(dst) {
        Ok(_) => fs::remove_file(dst)?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    std::os::unix::fs::symlink(link_target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(_src: &Path, _dst: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlink entries are only supported with follow_symlinks on this platform",
    ))
}

/// Write pages metadata files at the worktree root.
///
/// A non-empty `fqdn` becomes the `CNAME` file; `jekyll = false` drops a
/// `.nojekyll` marker so the host serves the tree as-is.
pub fn write_metadata(worktree: &Path, fqdn: Option<&str>, jekyll: bool) -> Result<()> {
    if let Some(fqdn) = fqdn.map(str::trim).filter(|fqdn| !fqdn.is_empty()) {
        fs::write(worktree.join("CNAME"), fqdn).context("Failed to write CNAME")?;
        log!("pages"; "CNAME: {fqdn}");
    }

    if !jekyll {
        fs::write(worktree.join(".nojekyll"), "").context("Failed to write .nojekyll")?;
        log!("pages"; "Jekyll processing disabled (.nojekyll)");
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn with_temp_dir<F>(f: F)
    where
        F: FnOnce(&Path),
    {
        let temp_dir = tempfile::tempdir().unwrap();
        f(temp_dir.path());
    }

    /// Build a small site tree under `dir/public`
    fn make_build_dir(dir: &Path) -> PathBuf {
        let build = dir.join("public");
        fs::create_dir_all(build.join("assets")).unwrap();
        fs::write(build.join("index.html"), "<html>home</html>").unwrap();
        fs::write(build.join("assets/site.css"), "body {}").unwrap();
        build
    }

    #[test]
    fn test_materialize_copies_tree() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();

            let summary = materialize(&build, &worktree, false, false).unwrap();

            assert_eq!(summary.copied, 2);
            assert_eq!(summary.failed, 0);
            assert_eq!(
                fs::read_to_string(worktree.join("index.html")).unwrap(),
                "<html>home</html>"
            );
            assert_eq!(
                fs::read_to_string(worktree.join("assets/site.css")).unwrap(),
                "body {}"
            );
        });
    }

    #[test]
    fn test_materialize_overwrites_existing_files() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();
            fs::write(worktree.join("index.html"), "stale").unwrap();

            materialize(&build, &worktree, false, false).unwrap();

            assert_eq!(
                fs::read_to_string(worktree.join("index.html")).unwrap(),
                "<html>home</html>"
            );
        });
    }

    #[test]
    fn test_materialize_skips_git_dir() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            fs::create_dir_all(build.join(".git")).unwrap();
            fs::write(build.join(".git/config"), "[core]").unwrap();
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();

            let summary = materialize(&build, &worktree, false, false).unwrap();

            assert_eq!(summary.copied, 2);
            assert!(!worktree.join(".git").exists());
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_materialize_recreates_symlinks() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            std::os::unix::fs::symlink("index.html", build.join("home.html")).unwrap();
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();

            let summary = materialize(&build, &worktree, false, false).unwrap();

            assert_eq!(summary.copied, 3);
            let copied_link = worktree.join("home.html");
            assert!(copied_link.symlink_metadata().unwrap().file_type().is_symlink());
            assert_eq!(
                fs::read_link(copied_link).unwrap(),
                PathBuf::from("index.html")
            );
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_materialize_dereferences_symlinks_when_following() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            std::os::unix::fs::symlink("index.html", build.join("home.html")).unwrap();
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();

            materialize(&build, &worktree, true, false).unwrap();

            let copied = worktree.join("home.html");
            assert!(!copied.symlink_metadata().unwrap().file_type().is_symlink());
            assert_eq!(
                fs::read_to_string(copied).unwrap(),
                "<html>home</html>"
            );
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_materialize_replaces_stale_file_with_symlink() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            std::os::unix::fs::symlink("index.html", build.join("home.html")).unwrap();
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();
            fs::write(worktree.join("home.html"), "plain file from last deploy").unwrap();

            materialize(&build, &worktree, false, false).unwrap();

            let replaced = worktree.join("home.html");
            assert!(replaced.symlink_metadata().unwrap().file_type().is_symlink());
        });
    }

    #[cfg(unix)]
    #[test]
    fn test_materialize_counts_broken_link_when_following() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            std::os::unix::fs::symlink("missing.html", build.join("ghost.html")).unwrap();
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();

            let summary = materialize(&build, &worktree, true, false).unwrap();

            assert_eq!(summary.copied, 2);
            assert_eq!(summary.failed, 1);
            assert!(!worktree.join("ghost.html").exists());
        });
    }

    #[test]
    fn test_isolate_clears_only_owned_dirs() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            let worktree = dir.join("worktree");
            fs::create_dir_all(worktree.join("assets")).unwrap();
            fs::create_dir_all(worktree.join("other-site")).unwrap();
            fs::write(worktree.join("assets/old.css"), "old").unwrap();
            fs::write(worktree.join("other-site/keep.html"), "keep").unwrap();
            fs::write(worktree.join("root.txt"), "keep").unwrap();

            let cleared = isolate_site_dirs(&worktree, &build).unwrap();

            assert_eq!(cleared, 1);
            assert!(worktree.join("assets").is_dir());
            assert!(!worktree.join("assets/old.css").exists());
            assert_eq!(
                fs::read_to_string(worktree.join("other-site/keep.html")).unwrap(),
                "keep"
            );
            assert!(worktree.join("root.txt").exists());
        });
    }

    #[test]
    fn test_isolate_ignores_absent_dirs() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            let worktree = dir.join("worktree");
            fs::create_dir_all(&worktree).unwrap();

            assert_eq!(isolate_site_dirs(&worktree, &build).unwrap(), 0);
        });
    }

    #[test]
    fn test_isolate_clears_dir_replaced_by_file() {
        with_temp_dir(|dir| {
            let build = make_build_dir(dir);
            fs::write(build.join("news"), "<html>news index</html>").unwrap();
            let worktree = dir.join("worktree");
            fs::create_dir_all(worktree.join("news")).unwrap();
            fs::write(worktree.join("news/stale.html"), "old article").unwrap();
            fs::write(worktree.join("index.html"), "old home").unwrap();

            let cleared = isolate_site_dirs(&worktree, &build).unwrap();

            // `news` became a plain file in the new build; the old directory
            // still gets emptied. A same-named file stays as it is.
            assert_eq!(cleared, 1);
            assert!(worktree.join("news").is_dir());
            assert!(!worktree.join("news/stale.html").exists());
            assert_eq!(
                fs::read_to_string(worktree.join("index.html")).unwrap(),
                "old home"
            );
        });
    }

    #[test]
    fn test_write_metadata_cname() {
        with_temp_dir(|dir| {
            write_metadata(dir, Some(" www.example.com "), true).unwrap();

            assert_eq!(
                fs::read_to_string(dir.join("CNAME")).unwrap(),
                "www.example.com"
            );
            assert!(!dir.join(".nojekyll").exists());
        });
    }

    #[test]
    fn test_write_metadata_nojekyll() {
        with_temp_dir(|dir| {
            write_metadata(dir, None, false).unwrap();

            assert!(!dir.join("CNAME").exists());
            assert_eq!(fs::read_to_string(dir.join(".nojekyll")).unwrap(), "");
        });
    }

    #[test]
    fn test_write_metadata_blank_fqdn_skipped() {
        with_temp_dir(|dir| {
            write_metadata(dir, Some("   "), true).unwrap();

            assert!(!dir.join("CNAME").exists());
        });
    }
}
