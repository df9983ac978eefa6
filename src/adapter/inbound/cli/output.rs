//! Terminal output for CLI commands.
//!
//! Human-readable lines with colored markers, or one JSON object per line
//! when `--json` is set. `--quiet` suppresses everything except warnings
//! and errors.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::{OwoColorize, Stream};
use serde_json::{json, Value};

/// Output flags shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// One JSON object per line instead of styled text.
    pub json: bool,
    /// Only warnings and errors.
    pub quiet: bool,
    /// `-v` count.
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn current() -> OutputConfig {
    match cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Apply the global CLI flags. Call once, before any output.
pub fn configure(config: OutputConfig) {
    match cell().write() {
        Ok(mut slot) => *slot = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn is_quiet() -> bool {
    current().quiet
}

#[must_use]
pub fn verbosity() -> u8 {
    current().verbose
}

fn json_line(kind: &str, payload: Value) -> String {
    json!({ "type": kind, "payload": payload }).to_string()
}

/// Route one event: JSON to stdout, otherwise run `human` unless quiet.
fn emit(kind: &str, payload: Value, human: impl FnOnce()) {
    let config = current();
    if config.json {
        println!("{}", json_line(kind, payload));
    } else if !config.quiet {
        human();
    }
}

/// Application name and version.
pub fn header(version: &str) {
    emit(
        "header",
        json!({ "app": env!("CARGO_PKG_NAME"), "version": version }),
        || {
            println!(
                "{} {}",
                env!("CARGO_PKG_NAME").if_supports_color(Stream::Stdout, |t| t.bold()),
                version.if_supports_color(Stream::Stdout, |t| t.dimmed())
            );
            println!();
        },
    );
}

pub fn section(title: &str) {
    emit("section", json!({ "title": title }), || {
        println!();
        println!("{}", title.if_supports_color(Stream::Stdout, |t| t.bold()));
    });
}

/// A labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        "field",
        json!({ "label": label, "value": value }),
        || {
            let label = format!("{label:<20}");
            println!(
                "  {} {}",
                label.if_supports_color(Stream::Stdout, |t| t.dimmed()),
                value
            );
        },
    );
}

pub fn success(message: &str) {
    emit("success", json!({ "message": message }), || {
        let mark = "✓".if_supports_color(Stream::Stdout, |t| t.green());
        println!("  {mark} {message}");
    });
}

pub fn note(message: &str) {
    emit("note", json!({ "message": message }), || {
        println!("  {}", message.if_supports_color(Stream::Stdout, |t| t.dimmed()));
    });
}

pub fn hint(message: &str) {
    emit("hint", json!({ "message": message }), || {
        println!(
            "  {}: {}",
            "hint".if_supports_color(Stream::Stdout, |t| t.cyan()),
            message.if_supports_color(Stream::Stdout, |t| t.dimmed())
        );
    });
}

/// Shown even in quiet mode.
pub fn warning(message: &str) {
    if is_json() {
        println!("{}", json_line("warning", json!({ "message": message })));
    } else {
        let mark = "⚠".if_supports_color(Stream::Stdout, |t| t.yellow());
        println!("  {mark} {message}");
    }
}

/// Shown even in quiet mode, on stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", json_line("error", json!({ "message": message })));
    } else {
        let mark = "×".if_supports_color(Stream::Stderr, |t| t.red());
        eprintln!("  {mark} {message}");
    }
}

/// Cyan when the terminal supports it; plain in JSON mode.
#[must_use]
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        value
    } else {
        value
            .if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_lines_wrap_payload_with_type() {
        let line = json_line("field", json!({ "label": "Port", "value": "5000" }));
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["type"], "field");
        assert_eq!(parsed["payload"]["value"], "5000");
    }

    #[test]
    fn output_config_new_sets_flags() {
        let config = OutputConfig::new(true, false, 2);
        assert!(config.json);
        assert!(!config.quiet);
        assert_eq!(config.verbose, 2);
    }
}
