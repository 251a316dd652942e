//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [remote] Section Defaults
// ============================================================================

pub mod remote {
    pub fn domain() -> String {
        "github.com".into()
    }

    /// Repository slug, `OWNER/NAME`. Falls back to the slug CI provides.
    pub fn repo() -> String {
        std::env::var("GITHUB_REPOSITORY").unwrap_or_default()
    }

    pub fn branch() -> String {
        "gh-pages".into()
    }
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    use std::path::PathBuf;

    pub fn build_dir() -> PathBuf {
        "public".into()
    }

    pub fn fqdn() -> Option<String> {
        None
    }
}

// ============================================================================
// [commit] Section Defaults
// ============================================================================

pub mod commit {
    pub fn committer() -> String {
        "GitHub <noreply@github.com>".into()
    }

    /// Author derives from the CI actor when available, else the committer.
    pub fn author() -> String {
        match std::env::var("GITHUB_ACTOR") {
            Ok(actor) if !actor.is_empty() => {
                format!("{actor} <{actor}@users.noreply.github.com>")
            }
            _ => committer(),
        }
    }

    pub fn message() -> String {
        "Deploy to GitHub pages".into()
    }
}
