//! `[remote]` section configuration.
//!
//! Identifies the repository and branch the site is published to.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[remote]` section in pagelift.toml - where the site is published.
///
/// # Example
/// ```toml
/// [remote]
/// domain = "github.com"
/// repo = "alice/alice.github.io"
/// branch = "gh-pages"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Host the repository lives on (GitHub Enterprise uses its own).
    #[serde(default = "defaults::remote::domain")]
    #[educe(Default = defaults::remote::domain())]
    pub domain: String,

    /// Repository slug, `OWNER/NAME`. Defaults to `$GITHUB_REPOSITORY`.
    #[serde(default = "defaults::remote::repo")]
    #[educe(Default = defaults::remote::repo())]
    pub repo: String,

    /// Branch the site is published to.
    #[serde(default = "defaults::remote::branch")]
    #[educe(Default = defaults::remote::branch())]
    pub branch: String,
}
