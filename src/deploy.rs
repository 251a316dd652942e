//! Deployment engine: publish a built site to a remote branch.
//!
//! The engine stages everything in a throwaway worktree, never in the
//! project checkout: probe the remote, clone or init per the tree plan,
//! copy the build output in, commit, push. All git access goes through
//! the [`Git`] trait so the whole flow is testable without a network.

use crate::config::PagesConfig;
use crate::credentials::{self, RemoteCredentials};
use crate::log;
use crate::stage;
use crate::utils::git::{Git, GitCli};
use crate::utils::mailbox::Mailbox;
use anyhow::{Context, Result, bail};

// ============================================================================
// Outcome
// ============================================================================

/// How a deployment run ended (errors are reported through `Result`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployOutcome {
    /// The branch was updated on the remote
    Pushed,
    /// Nothing differed from the published state, no commit was made
    SkippedNoChanges,
    /// A commit was prepared but the push was withheld
    SkippedDryRun,
}

// ============================================================================
// Tree Plan
// ============================================================================

/// Where the publishing worktree starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TreeSource {
    /// Shallow clone of the existing remote branch
    CloneExisting,
    /// Fresh repository on an orphan branch
    InitOrphan,
}

/// Resolved strategy for preparing the worktree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TreePlan {
    source: TreeSource,
    /// Clear the worktree directories this site owns before copying
    isolate: bool,
}

impl TreePlan {
    /// Pick the tree strategy for one deployment.
    ///
    /// | keep_history | multiple_sites | branch exists | source        | isolate |
    /// |--------------|----------------|---------------|---------------|---------|
    /// | true         | true           | true          | CloneExisting | no      |
    /// | true         | false          | true          | CloneExisting | no      |
    /// | false        | true           | true          | CloneExisting | yes     |
    /// | false        | false          | true          | InitOrphan    | no      |
    /// | *            | *              | false         | InitOrphan    | no      |
    ///
    /// Keeping history always builds on the existing branch. Without it,
    /// the branch is rebuilt from scratch, except on a shared branch where
    /// the other sites' files must survive: there the branch is cloned and
    /// only the directories owned by this site are cleared.
    fn resolve(keep_history: bool, multiple_sites: bool, branch_exists: bool) -> Self {
        let (source, isolate) = match (keep_history, multiple_sites, branch_exists) {
            (true, true, true) => (TreeSource::CloneExisting, false),
            (true, false, true) => (TreeSource::CloneExisting, false),
            (false, true, true) => (TreeSource::CloneExisting, true),
            (false, false, true) => (TreeSource::InitOrphan, false),
            (true, true, false) => (TreeSource::InitOrphan, false),
            (true, false, false) => (TreeSource::InitOrphan, false),
            (false, true, false) => (TreeSource::InitOrphan, false),
            (false, false, false) => (TreeSource::InitOrphan, false),
        };
        Self { source, isolate }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Deploy the configured build directory to the remote branch.
pub fn deploy_site(config: &'static PagesConfig) -> Result<DeployOutcome> {
    let creds = RemoteCredentials::from_env(config.publish.dry_run)?;
    creds.mask();
    run(config, &GitCli, &creds)
}

fn run(config: &PagesConfig, git: &dyn Git, creds: &RemoteCredentials) -> Result<DeployOutcome> {
    let build_dir = &config.site.build_dir;
    if !build_dir.is_dir() {
        bail!(
            "Build directory {} does not exist. Build the site first.",
            build_dir.display()
        );
    }

    // Fail on a bad identity before touching the remote
    let committer: Mailbox = config
        .commit
        .committer
        .parse()
        .context("[commit] committer is invalid")?;
    let author: Mailbox = config
        .commit
        .author
        .parse()
        .context("[commit] author is invalid")?;

    let push_url = creds.remote_url(&config.remote.domain, &config.remote.repo);
    let public_url = credentials::public_url(&config.remote.domain, &config.remote.repo);
    let branch = &config.remote.branch;

    log!("deploy"; "{} -> {public_url} ({branch})", build_dir.display());

    let worktree = tempfile::Builder::new()
        .prefix("pagelift-")
        .tempdir()
        .context("Failed to create a temporary worktree")?;
    let root = worktree.path();

    let branch_exists = git.branch_exists(&push_url, branch)?;
    let plan = TreePlan::resolve(
        config.publish.keep_history,
        config.publish.multiple_sites,
        branch_exists,
    );

    match plan.source {
        TreeSource::CloneExisting => {
            log!("git"; "fetching existing {branch}");
            git.clone_branch(&push_url, branch, root)?;
        }
        TreeSource::InitOrphan => {
            log!("git"; "starting {branch} from scratch");
            git.init_branch(root, branch)?;
        }
    }

    if plan.isolate {
        let cleared = stage::isolate_site_dirs(root, build_dir)?;
        if cleared > 0 {
            log!("deploy"; "cleared {cleared} previously deployed directories");
        }
    }

    let summary = stage::materialize(
        build_dir,
        root,
        config.site.follow_symlinks,
        config.publish.verbose,
    )?;
    log!("deploy"; "copied {} entries", summary.copied);
    if summary.failed > 0 {
        log!("warn"; "{} entries could not be copied", summary.failed);
    }

    stage::write_metadata(root, config.site.fqdn.as_deref(), config.site.jekyll)?;

    let allow_empty = config.publish.allow_empty_commit;

    // On a cloned branch an unchanged tree means there is nothing to do
    if matches!(plan.source, TreeSource::CloneExisting) && !allow_empty && !git.is_dirty(root)? {
        log!("deploy"; "nothing changed since the last deploy, skipping");
        return Ok(DeployOutcome::SkippedNoChanges);
    }

    git.set_identity(root, &committer)?;
    git.stage_all(root)?;

    if !allow_empty && !git.has_staged_changes(root)? {
        log!("deploy"; "nothing to commit, skipping");
        return Ok(DeployOutcome::SkippedNoChanges);
    }

    git.commit(root, &config.commit.message, &author, allow_empty)?;
    log!("git"; "created commit {}", git.head_commit(root)?);
    log!("git"; "{}", git.show_latest(root)?);

    if config.publish.dry_run {
        log!("warn"; "dry run: not pushing to {public_url}");
        return Ok(DeployOutcome::SkippedDryRun);
    }

    let force = !config.publish.keep_history;
    git.push(root, &push_url, branch, force)?;
    log!("deploy"; "pushed {branch} to {public_url}");

    Ok(DeployOutcome::Pushed)
}

// ============================================================================
// Tests
// ============================================================================
