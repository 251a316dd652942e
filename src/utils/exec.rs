//! External command execution utilities.
//!
//! Provides macros and functions for running git with proper output
//! handling and error reporting. Everything printed here passes through
//! the logger's secret scrubbing, so credentialed URLs never reach the
//! terminal.

use crate::log;
use anyhow::{Context, Result};
use regex::Regex;
use std::{
    ffi::OsString,
    path::Path,
    process::{Command, Output},
    sync::OnceLock,
};

// ============================================================================
// Macros
// ============================================================================

/// Run an external command with arguments, logging its filtered output.
///
/// Empty arguments are dropped, which keeps optional flags simple:
/// `exec!(root; ["git"]; "push", if force { "--force" } else { "" }, url)`.
///
/// # Examples
/// ```ignore
/// // Without working directory
/// exec!(["git"]; "clone", "--depth=1", url, dst)?;
///
/// // With working directory
/// exec!(root; ["git"]; "checkout", "--orphan", branch)?;
/// ```
#[macro_export]
macro_rules! exec {
    ($cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            None,
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
        )
    }};
    ($root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec(
            Some($root),
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
        )
    }};
}

/// Run an external command and capture its output without logging it.
///
/// Used for commands whose output is parsed rather than shown
/// (`ls-remote`, `status --porcelain`, `diff --cached`).
#[macro_export]
macro_rules! exec_quiet {
    ($cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec_quiet(
            None,
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
        )
    }};
    ($root:expr; $cmd:expr; $($arg:expr),* $(,)?) => {{
        $crate::utils::exec::exec_quiet(
            Some($root),
            &$crate::utils::exec::to_cmd_vec($cmd),
            &$crate::utils::exec::filter_args(&[$($crate::utils::exec::to_os($arg)),*]),
        )
    }};
}

// ============================================================================
// Argument Conversion
// ============================================================================

/// Convert to `OsString`.
#[inline]
pub fn to_os<S: Into<OsString>>(s: S) -> OsString {
    s.into()
}

/// Trait for converting to command vector.
pub trait ToCmd {
    fn to_cmd(self) -> Vec<OsString>;
}

impl<const N: usize> ToCmd for [&str; N] {
    #[inline]
    fn to_cmd(self) -> Vec<OsString> {
        self.into_iter().map(OsString::from).collect()
    }
}

impl ToCmd for &[String] {
    #[inline]
    fn to_cmd(self) -> Vec<OsString> {
        self.iter().map(OsString::from).collect()
    }
}

impl ToCmd for &Vec<String> {
    #[inline]
    fn to_cmd(self) -> Vec<OsString> {
        self.iter().map(OsString::from).collect()
    }
}

/// Convert command to Vec<OsString>.
#[inline]
pub fn to_cmd_vec<C: ToCmd>(cmd: C) -> Vec<OsString> {
    cmd.to_cmd()
}

/// Filter out empty args.
#[inline]
pub fn filter_args(args: &[OsString]) -> Vec<OsString> {
    args.iter().filter(|a| !a.is_empty()).cloned().collect()
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a command, log its filtered output, and return it.
///
/// # Errors
/// Returns error if command fails to execute or returns non-zero exit code.
pub fn exec(root: Option<&Path>, cmd: &[OsString], args: &[OsString]) -> Result<Output> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    log_output(&name, &output)?;
    Ok(output)
}

/// Execute a command and capture its output without logging on success.
///
/// # Errors
/// Returns error if command fails to execute or returns non-zero exit code;
/// the error carries the first meaningful stderr lines, secrets scrubbed.
pub fn exec_quiet(root: Option<&Path>, cmd: &[OsString], args: &[OsString]) -> Result<Output> {
    let (name, mut command) = prepare(root, cmd, args)?;

    let output = command
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let error_msg = OutputFilter::STDERR.extract_error(stderr.trim());
        anyhow::bail!(
            "Command `{name}` failed with {}: {}",
            output.status,
            crate::logger::redact(error_msg)
        );
    }

    Ok(output)
}

/// Prepare a Command from components.
fn prepare(root: Option<&Path>, cmd: &[OsString], args: &[OsString]) -> Result<(String, Command)> {
    let name = cmd
        .first()
        .and_then(|s| s.to_str())
        .context("Empty command")?
        .to_owned();

    let mut command = Command::new(&cmd[0]);
    command.args(&cmd[1..]).args(args);

    if let Some(dir) = root {
        command.current_dir(dir);
    }

    Ok((name, command))
}

// ============================================================================
// Output Filtering
// ============================================================================

fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Filter rule for CLI output noise.
///
/// Matches lines that start with a prefix AND contain all required keywords.
/// This is more precise than keyword-only matching to avoid filtering user errors.
struct FilterRule {
    /// Line must start with one of these (case-insensitive, after trim).
    starts_with: &'static [&'static str],
    /// Line must also contain ALL of these keywords (case-insensitive).
    contains: &'static [&'static str],
}

impl FilterRule {
    const fn new(starts_with: &'static [&'static str], contains: &'static [&'static str]) -> Self {
        Self {
            starts_with,
            contains,
        }
    }

    fn matches(&self, line: &str) -> bool {
        let lower = strip_ansi(line).trim().to_ascii_lowercase();
        // Must start with one of the prefixes
        let has_prefix = self.starts_with.is_empty()
            || self.starts_with.iter().any(|p| lower.starts_with(p));
        // Must contain all keywords
        let has_keywords = self.contains.iter().all(|kw| lower.contains(kw));
        has_prefix && has_keywords
    }
}

/// Output filter configuration.
struct OutputFilter {
    /// Lines matching any rule are filtered out.
    line_rules: &'static [FilterRule],
}

impl OutputFilter {
    const STDOUT: Self = Self { line_rules: &[] };

    // Git chatter examples:
    //   hint: Using 'master' as the name for the initial branch. ...
    //   Cloning into '/tmp/pagelift-x1y2'...
    //   Switched to a new branch 'gh-pages'
    //   Initialized empty Git repository in /tmp/pagelift-x1y2/.git/
    const STDERR: Self = Self {
        line_rules: &[
            // Default-branch advice printed by `git init`
            FilterRule::new(&["hint:"], &[]),
            // Setup banners with no information content
            FilterRule::new(&["cloning into"], &[]),
            FilterRule::new(&["initialized empty git repository"], &[]),
            FilterRule::new(&["switched to a new branch"], &[]),
            // Local-protocol clones ignore --depth and say so
            FilterRule::new(&["warning:"], &["--depth is ignored in local clones"]),
        ],
    };

    /// Check if a line should be filtered.
    fn should_filter_line(&self, line: &str) -> bool {
        self.line_rules.iter().any(|r| r.matches(line))
    }

    /// Log non-filtered lines.
    fn log(&self, name: &str, output: &str) {
        if output.is_empty() {
            return;
        }
        for line in output.lines() {
            if !line.trim().is_empty() && !self.should_filter_line(line) {
                log!(name; "{line}");
            }
        }
    }

    /// Extract error message, skipping filtered lines at start.
    fn extract_error<'a>(&self, stderr: &'a str) -> &'a str {
        stderr
            .lines()
            .find(|line| !line.trim().is_empty() && !self.should_filter_line(line))
            .map(|first| {
                let offset = first.as_ptr() as usize - stderr.as_ptr() as usize;
                &stderr[offset..]
            })
            .unwrap_or(stderr)
            .trim()
    }
}

/// Log command output, filtering known noise.
fn log_output(name: &str, output: &Output) -> Result<()> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stdout = stdout.trim();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();

    if !output.status.success() {
        let error_msg = OutputFilter::STDERR.extract_error(stderr);
        if !error_msg.is_empty() {
            eprintln!("{}", crate::logger::redact(error_msg));
        }
        anyhow::bail!("Command `{name}` failed with {}", output.status);
    }

    OutputFilter::STDOUT.log(name, stdout);
    OutputFilter::STDERR.log(name, stderr);

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
