//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for formatted terminal output with colored prefixes
//! - `Dots` for a compact per-file progress stream
//! - secret masking so credentials never reach the terminal
//!
//! # Example
//!
//! ```ignore
//! // Simple logging
//! log!("deploy"; "publishing {} files", count);
//!
//! // Register a secret once; every later message is scrubbed
//! logger::mask_secret("ghp_abc123");
//!
//! // Compact progress for long copy loops
//! let mut dots = Dots::new();
//! dots.tick();
//! dots.finish();
//! ```

use colored::{ColoredString, Colorize};
use crossterm::terminal::size;
use std::{
    io::{Write, stdout},
    sync::{Mutex, OnceLock},
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Secrets to scrub from every logged message
static SECRETS: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// Replacement text for masked secrets
const MASK: &str = "***";

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Log Macro
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Secret Masking
// ============================================================================

/// Register a secret value to be scrubbed from all log output.
///
/// Empty values are ignored.
pub fn mask_secret(value: &str) {
    if value.is_empty() {
        return;
    }
    if let Ok(mut secrets) = SECRETS.lock() {
        secrets.push(value.to_owned());
    }
}

/// Replace every registered secret in `text` with `***`.
pub fn redact(text: &str) -> String {
    let Ok(secrets) = SECRETS.lock() else {
        return text.to_owned();
    };
    let mut result = text.to_owned();
    for secret in secrets.iter() {
        if result.contains(secret.as_str()) {
            result = result.replace(secret.as_str(), MASK);
        }
    }
    result
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Scrubs registered secrets and truncates long single-line messages
/// to fit terminal width.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);
    let width = get_terminal_width() as usize;
    let message = redact(message);

    let mut stdout = stdout().lock();

    // Check for multiline
    if message.contains('\n') {
        // For multiline, we print the prefix with the first line,
        // and then the rest of the lines. We don't truncate.
        writeln!(stdout, "{prefix} {message}").ok();
    } else {
        // Truncate message if it exceeds available width
        let prefix_len = calc_prefix_len(module.len());
        let max_msg_len = width.saturating_sub(prefix_len);

        let message = if message.len() > max_msg_len {
            truncate_str(&message, max_msg_len)
        } else {
            &message
        };

        writeln!(stdout, "{prefix} {message}").ok();
    }

    stdout.flush().ok();
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "deploy" => prefix.bright_blue().bold(),
        "git" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    // Find the last valid UTF-8 boundary within max_len
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Progress Dots
// ============================================================================

/// Compact progress stream: one dot per processed item.
///
/// Used by long copy loops when per-file logging is off. Call `tick()`
/// per item and `finish()` once done to terminate the line.
pub struct Dots {
    count: usize,
}

impl Dots {
    pub const fn new() -> Self {
        Self { count: 0 }
    }

    /// Print one progress dot.
    pub fn tick(&mut self) {
        self.count += 1;
        let mut stdout = stdout().lock();
        write!(stdout, ".").ok();
        stdout.flush().ok();
    }

    /// Terminate the dot line. No-op if nothing was ticked.
    pub fn finish(self) {
        if self.count > 0 {
            let mut stdout = stdout().lock();
            writeln!(stdout).ok();
            stdout.flush().ok();
        }
    }

    pub const fn count(&self) -> usize {
        self.count
    }
}

// ============================================================================
// Tests
// ============================================================================
