//! CLI command definitions and argument parsing.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

use colored::Colorize;

/// Print a one-line status message to stderr.
///
/// Kept off stdout so rendered output can be piped.
pub fn status(message: &str) {
    use std::io::Write;
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle, "  {} {}", "›".cyan(), message.dimmed());
    let _ = handle.flush();
}
