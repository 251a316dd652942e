//! `[site]` section configuration.
//!
//! Describes the built site on disk and the pages metadata written
//! alongside it.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[site]` section in pagelift.toml - the build output to publish.
///
/// # Example
/// ```toml
/// [site]
/// build_dir = "public"
/// follow_symlinks = false
/// fqdn = "www.example.com"
/// jekyll = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the prebuilt site.
    #[serde(default = "defaults::site::build_dir")]
    #[educe(Default = defaults::site::build_dir())]
    pub build_dir: PathBuf,

    /// Treat `build_dir` as an absolute path instead of resolving it
    /// against the invocation directory.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub absolute_build_dir: bool,

    /// Copy symlink targets instead of recreating the links.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = defaults::r#false())]
    pub follow_symlinks: bool,

    /// Custom domain; written to a `CNAME` file on the branch when set.
    #[serde(default = "defaults::site::fqdn")]
    #[educe(Default = defaults::site::fqdn())]
    pub fqdn: Option<String>,

    /// Whether the pages host may run Jekyll over the branch.
    /// `false` writes a `.nojekyll` marker.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = defaults::r#true())]
    pub jekyll: bool,
}
