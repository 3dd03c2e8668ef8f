//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::OwoColorize;

/// Checkmark glyph
pub const CHECK: &str = "\u{2713}";

/// Warning glyph
pub const WARN: &str = "\u{26a0}";

/// Green checkmark
#[must_use]
pub fn check() -> String {
    CHECK.green().to_string()
}

/// Yellow warning sign
#[must_use]
pub fn warn_sign() -> String {
    WARN.yellow().to_string()
}

/// Styling shorthands used across command output
pub trait Stylize {
    /// De-emphasized secondary text
    fn muted(&self) -> String;
    /// Highlighted value (branch names, numbers)
    fn accent(&self) -> String;
    /// Section/phase emphasis
    fn emphasis(&self) -> String;
    /// Success text
    fn success(&self) -> String;
    /// Warning text
    fn warn(&self) -> String;
}

impl<T: std::fmt::Display> Stylize for T {
    fn muted(&self) -> String {
        self.dimmed().to_string()
    }

    fn accent(&self) -> String {
        self.cyan().to_string()
    }

    fn emphasis(&self) -> String {
        self.bold().to_string()
    }

    fn success(&self) -> String {
        self.green().to_string()
    }

    fn warn(&self) -> String {
        self.yellow().to_string()
    }
}

/// Spinner style used while waiting on the network
#[must_use]
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}").expect("valid template")
}

/// Render a clickable link when the terminal supports hyperlinks, otherwise
/// text with the URL in parentheses.
#[must_use]
pub fn link(text: &str, url: &str) -> String {
    if supports_hyperlinks::supports_hyperlinks() {
        terminal_link::Link::new(text, url).to_string()
    } else {
        format!("{text} ({url})")
    }
}
