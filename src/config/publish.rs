//! `[publish]` section configuration.
//!
//! The mode switches that shape what lands on the target branch.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[publish]` section in pagelift.toml - how the branch is written.
///
/// # Example
/// ```toml
/// [publish]
/// keep_history = true
/// multiple_sites = false
/// allow_empty_commit = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// Layer new content on top of existing branch history instead of
    /// replacing it wholesale.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub keep_history: bool,

    /// Several sites share the branch in sibling directories; only the
    /// directories this site owns are replaced.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub multiple_sites: bool,

    /// Record a commit even when nothing changed.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub allow_empty_commit: bool,

    /// Go through the motions locally but never push.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub dry_run: bool,

    /// Log every copied file instead of a progress stream.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub verbose: bool,
}
