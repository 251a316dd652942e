//! `[commit]` section configuration.
//!
//! Identities and message for the published commit.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[commit]` section in pagelift.toml - how the commit is recorded.
///
/// Identities use git's `Name <user@host>` form; a bare address works too.
///
/// # Example
/// ```toml
/// [commit]
/// committer = "GitHub <noreply@github.com>"
/// author = "Alice <alice@example.com>"
/// message = "Deploy to GitHub pages"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct CommitConfig {
    /// Recorded committer identity.
    #[serde(default = "defaults::commit::committer")]
    #[educe(Default = defaults::commit::committer())]
    pub committer: String,

    /// Recorded author identity. Defaults to the CI actor when available.
    #[serde(default = "defaults::commit::author")]
    #[educe(Default = defaults::commit::author())]
    pub author: String,

    /// Commit message.
    #[serde(default = "defaults::commit::message")]
    #[educe(Default = defaults::commit::message())]
    pub message: String,
}
