//! Styled terminal output utilities.
//!
//! Reports go to stdout unstyled so they can be parsed; only diagnostics are colored.

use owo_colors::OwoColorize;

/// Print a report line verbatim.
pub fn report(text: &str) {
    println!("{}", text);
}

/// Print a success message
pub fn success(text: &str) {
    println!("{} {}", "✔".green().bold(), text.green());
}

/// Print a warning message
pub fn warn(text: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), text.yellow());
}

/// Print an error message
pub fn error(text: &str) {
    eprintln!("{} {}", "✖".red().bold(), text.red());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print dimmed text
pub fn dim(text: &str) {
    println!("{}", text.dimmed());
}
