//! Version control operations for publishing.
//!
//! Every operation the publisher needs is one method on the `Git` trait,
//! so the engine never talks to the git binary directly. `GitCli` drives
//! the installed `git` through the `exec!` macros; tests substitute an
//! in-memory fake.

use crate::utils::mailbox::Mailbox;
use crate::{exec, exec_quiet};
use anyhow::{Context, Result, bail};
use std::path::Path;

// ============================================================================
// Capability Trait
// ============================================================================

/// Version-control operations used by the deployment engine.
///
/// All methods take the working tree root explicitly; implementations
/// must never rely on the process working directory.
pub trait Git {
    /// Check whether `branch` exists on the remote at `url`.
    fn branch_exists(&self, url: &str, branch: &str) -> Result<bool>;

    /// Clone only `branch` from `url` into `dst`, shallow.
    fn clone_branch(&self, url: &str, branch: &str, dst: &Path) -> Result<()>;

    /// Initialize a fresh repository at `root` on an orphan `branch`.
    fn init_branch(&self, root: &Path, branch: &str) -> Result<()>;

    /// Set the committer identity for the repository at `root`.
    fn set_identity(&self, root: &Path, identity: &Mailbox) -> Result<()>;

    /// Check whether the working tree at `root` has any changes.
    fn is_dirty(&self, root: &Path) -> Result<bool>;

    /// Stage every change in the working tree, deletions included.
    fn stage_all(&self, root: &Path) -> Result<()>;

    /// Check whether anything is staged for commit.
    fn has_staged_changes(&self, root: &Path) -> Result<bool>;

    /// Record a commit with the given message and author.
    fn commit(&self, root: &Path, message: &str, author: &Mailbox, allow_empty: bool)
    -> Result<()>;

    /// Summarize the latest commit (message plus short diffstat).
    fn show_latest(&self, root: &Path) -> Result<String>;

    /// Push `branch` to `url`, overwriting remote history when `force`.
    fn push(&self, root: &Path, url: &str, branch: &str, force: bool) -> Result<()>;

    /// Short id of the commit at HEAD.
    fn head_commit(&self, root: &Path) -> Result<String>;
}

// ============================================================================
// CLI Implementation
// ============================================================================

/// `Git` implementation backed by the installed `git` binary.
pub struct GitCli;

impl Git for GitCli {
    fn branch_exists(&self, url: &str, branch: &str) -> Result<bool> {
        let output = exec_quiet!(["git"]; "ls-remote", "--heads", url, branch)
            .context("Failed to probe remote branch")?;
        Ok(!output.stdout.is_empty())
    }

    fn clone_branch(&self, url: &str, branch: &str, dst: &Path) -> Result<()> {
        exec!(["git"]; "clone", "--depth=1", "--single-branch", "--branch", branch, url, dst)?;
        Ok(())
    }

    fn init_branch(&self, root: &Path, branch: &str) -> Result<()> {
        exec!(root; ["git"]; "init")?;
        exec!(root; ["git"]; "checkout", "--orphan", branch)?;
        Ok(())
    }

    fn set_identity(&self, root: &Path, identity: &Mailbox) -> Result<()> {
        exec!(root; ["git"]; "config", "user.name", &identity.name)?;
        exec!(root; ["git"]; "config", "user.email", &identity.address)?;
        Ok(())
    }

    fn is_dirty(&self, root: &Path) -> Result<bool> {
        let output = exec_quiet!(root; ["git"]; "status", "--porcelain")?;
        Ok(!output.stdout.is_empty())
    }

    fn stage_all(&self, root: &Path) -> Result<()> {
        exec!(root; ["git"]; "add", "--all")?;
        Ok(())
    }

    fn has_staged_changes(&self, root: &Path) -> Result<bool> {
        let output = exec_quiet!(root; ["git"]; "diff", "--cached", "--name-only")?;
        Ok(!output.stdout.is_empty())
    }

    fn commit(
        &self,
        root: &Path,
        message: &str,
        author: &Mailbox,
        allow_empty: bool,
    ) -> Result<()> {
        if message.trim().is_empty() {
            bail!("Commit message cannot be empty");
        }

        let author_arg = format!("--author={author}");
        exec!(root; ["git"];
            "commit",
            if allow_empty { "--allow-empty" } else { "" },
            "-m", message,
            &author_arg,
        )?;
        Ok(())
    }

    fn show_latest(&self, root: &Path) -> Result<String> {
        let output = exec_quiet!(root; ["git"]; "show", "--stat-count=10", "HEAD")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned())
    }

    fn push(&self, root: &Path, url: &str, branch: &str, force: bool) -> Result<()> {
        exec!(root; ["git"]; "push", if force { "--force" } else { "" }, url, branch)?;
        Ok(())
    }

    fn head_commit(&self, root: &Path) -> Result<String> {
        let repo = gix::open(root).context("Failed to open repository")?;
        let id = repo.head_id().context("Failed to resolve HEAD")?;
        Ok(id.shorten_or_id().to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
