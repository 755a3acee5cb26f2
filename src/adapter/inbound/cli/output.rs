//! Terminal output formatting.
//!
//! Every handler prints through this module so that `--json`, `--quiet` and
//! `--color` behave the same across commands. Human output goes to stdout
//! with colored symbols; in JSON mode each call emits one
//! `{"type": ..., "payload": ...}` line instead.

use std::fmt::Display;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use parking_lot::{const_rwlock, RwLock};
use serde_json::{json, Value};

use super::command::ColorChoice;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress informational lines; warnings and errors still print.
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }

    /// Whether a regular (non-warning) human line should be printed.
    const fn prints_regular(self) -> bool {
        !self.json && !self.quiet
    }
}

/// Process-wide settings applied by [`configure`].
static OUTPUT: RwLock<OutputConfig> = const_rwlock(OutputConfig::new(false, false));

fn current() -> OutputConfig {
    *OUTPUT.read()
}

/// Print `render` in human mode or a typed JSON line in JSON mode.
///
/// With `always`, the human line survives `--quiet`.
fn emit(kind: &str, payload: impl FnOnce() -> Value, always: bool, render: impl FnOnce()) {
    let config = current();
    if config.json {
        println!("{}", json!({ "type": kind, "payload": payload() }));
    } else if always || config.prints_regular() {
        render();
    }
}

/// Apply output settings from global CLI flags.
pub fn configure(config: OutputConfig) {
    *OUTPUT.write() = config;
}

/// Force or detect terminal colors.
pub fn set_color(choice: &ColorChoice) {
    match choice {
        ColorChoice::Auto => owo_colors::unset_override(),
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
    }
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    current().json
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    emit(
        "header",
        || json!({ "app": env!("CARGO_PKG_NAME"), "version": version }),
        false,
        || {
            println!("{} {}", env!("CARGO_PKG_NAME").bold(), version.dimmed());
            println!();
        },
    );
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        || json!({ "label": label, "value": value }),
        false,
        || println!("  {:<16} {}", label.dimmed(), value),
    );
}

/// Print a success line.
pub fn success(message: &str) {
    emit(
        "success",
        || json!({ "message": message }),
        false,
        || println!("  {} {}", "✓".green(), message),
    );
}

/// Print a warning line. Shown even in quiet mode.
pub fn warning(message: &str) {
    emit(
        "warning",
        || json!({ "message": message }),
        true,
        || println!("  {} {}", "⚠".yellow(), message),
    );
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

/// Print a section header.
pub fn section(title: &str) {
    emit(
        "section",
        || json!({ "title": title }),
        false,
        || {
            println!();
            println!("{}", title.bold());
        },
    );
}

/// Print a dimmed note.
pub fn note(message: &str) {
    emit(
        "note",
        || json!({ "message": message }),
        false,
        || println!("  {}", message.dimmed()),
    );
}

/// Print a hint with a "hint:" prefix.
pub fn hint(message: &str) {
    emit(
        "hint",
        || json!({ "message": message }),
        false,
        || println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed()),
    );
}

/// Print multiple lines of content (a rendered table), each indented.
pub fn lines(content: &str) {
    emit(
        "lines",
        || json!({ "content": content }),
        false,
        || {
            for line in content.lines() {
                println!("  {line}");
            }
        },
    );
}

/// Emit a JSON value directly (for commands with a single structured result).
pub fn json_output(value: Value) {
    println!("{value}");
}

/// Create a bounded progress bar of `len` steps labeled with a stage name.
///
/// Returns a hidden bar in JSON or quiet mode.
pub fn progress_bar(len: u64, stage: &str) -> ProgressBar {
    if !current().prints_regular() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::with_template("  {msg:<12} [{bar:30.cyan/blue}] {pos}/{len} ({percent}%)")
    {
        pb.set_style(style.progress_chars("━╸ "));
    }
    pb.set_message(stage.to_string());
    pb
}

fn paint(value: impl Display, style: fn(&str) -> String) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    style(&value)
}

/// Format a good outcome (time saved, enabled) in green.
pub fn positive(value: impl Display) -> String {
    paint(value, |v| v.green().to_string())
}

/// Format a bad outcome in red.
pub fn negative(value: impl Display) -> String {
    paint(value, |v| v.red().to_string())
}

/// Format secondary detail (endpoints, run ids) dimmed.
pub fn muted(value: impl Display) -> String {
    paint(value, |v| v.dimmed().to_string())
}

/// Format seconds for display, e.g. `1.25s` or `2m 05.0s`.
#[must_use]
pub fn seconds(secs: f64) -> String {
    if secs >= 60.0 {
        let minutes = (secs / 60.0).floor();
        return format!("{minutes:.0}m {:04.1}s", secs - minutes * 60.0);
    }
    format!("{secs:.2}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_formats_short_and_long_durations() {
        assert_eq!(seconds(1.25), "1.25s");
        assert_eq!(seconds(0.0), "0.00s");
        assert_eq!(seconds(125.0), "2m 05.0s");
    }

    #[test]
    fn regular_lines_need_human_non_quiet_mode() {
        assert!(OutputConfig::new(false, false).prints_regular());
        assert!(!OutputConfig::new(false, true).prints_regular());
        assert!(!OutputConfig::new(true, false).prints_regular());
        assert_eq!(OutputConfig::default(), OutputConfig::new(false, false));
    }
}
