//! Commit identity parsing.
//!
//! Git wants identities in `Name <user@host>` form; config files and
//! environment variables deliver them as free-form strings.

use anyhow::{Result, bail};
use regex::Regex;
use std::{fmt, str::FromStr, sync::LazyLock};

/// A parsed commit identity: display name plus e-mail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mailbox {
    pub name: String,
    pub address: String,
}

// Accepted forms: "Jane Doe <jane@example.com>", "<jane@example.com>",
// "jane@example.com"
static RE_FULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^<>]*?)\s*<([^<>\s]+@[^<>\s]+)>$").unwrap());
static RE_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^<>\s]+@[^<>\s]+$").unwrap());

impl FromStr for Mailbox {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Identity is empty");
        }

        if let Some(caps) = RE_FULL.captures(s) {
            let address = caps[2].to_owned();
            let name = caps[1].trim();
            // An address-only identity keeps the address as its display name
            let name = if name.is_empty() {
                address.clone()
            } else {
                name.to_owned()
            };
            return Ok(Self { name, address });
        }

        if RE_BARE.is_match(s) {
            return Ok(Self {
                name: s.to_owned(),
                address: s.to_owned(),
            });
        }

        bail!("Invalid identity `{s}`. Expected `Name <user@host>` or `user@host`.");
    }
}

impl fmt::Display for Mailbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.address)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_form() {
        let mailbox: Mailbox = "Jane Doe <jane@example.com>".parse().unwrap();
        assert_eq!(mailbox.name, "Jane Doe");
        assert_eq!(mailbox.address, "jane@example.com");
    }

    #[test]
    fn test_bare_address() {
        let mailbox: Mailbox = "jane@example.com".parse().unwrap();
        assert_eq!(mailbox.name, "jane@example.com");
        assert_eq!(mailbox.address, "jane@example.com");
    }

    #[test]
    fn test_angle_only_falls_back_to_address() {
        let mailbox: Mailbox = "<jane@example.com>".parse().unwrap();
        assert_eq!(mailbox.name, "jane@example.com");
        assert_eq!(mailbox.address, "jane@example.com");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let mailbox: Mailbox = "  GitHub   <noreply@github.com>  ".parse().unwrap();
        assert_eq!(mailbox.name, "GitHub");
        assert_eq!(mailbox.address, "noreply@github.com");
    }

    #[test]
    fn test_empty_rejected() {
        assert!("".parse::<Mailbox>().is_err());
        assert!("   ".parse::<Mailbox>().is_err());
    }

    #[test]
    fn test_missing_address_rejected() {
        assert!("Jane Doe".parse::<Mailbox>().is_err());
        assert!("Jane Doe <>".parse::<Mailbox>().is_err());
        assert!("Jane Doe <jane>".parse::<Mailbox>().is_err());
    }

    #[test]
    fn test_unclosed_bracket_rejected() {
        assert!("Jane <jane@example.com".parse::<Mailbox>().is_err());
        assert!("Jane jane@example.com>".parse::<Mailbox>().is_err());
    }

    #[test]
    fn test_display_matches_git_author_format() {
        let mailbox: Mailbox = "GitHub <noreply@github.com>".parse().unwrap();
        assert_eq!(mailbox.to_string(), "GitHub <noreply@github.com>");

        let bare: Mailbox = "octocat@github.com".parse().unwrap();
        assert_eq!(bare.to_string(), "octocat@github.com <octocat@github.com>");
    }
}
