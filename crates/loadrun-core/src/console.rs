//! Prefixed, colored console messages.
//!
//! INFO and SUCCESS go to stdout; WARN and ERROR go to stderr.

use colored::Colorize;
use tracing::debug;

pub fn info(message: impl AsRef<str>) {
    let message = message.as_ref();
    debug!(target: "loadrun::console", kind = "info", "{message}");
    println!("{} {message}", "[INFO]".blue().bold());
}

pub fn success(message: impl AsRef<str>) {
    let message = message.as_ref();
    debug!(target: "loadrun::console", kind = "success", "{message}");
    println!("{} {message}", "[SUCCESS]".green().bold());
}

pub fn warn(message: impl AsRef<str>) {
    let message = message.as_ref();
    debug!(target: "loadrun::console", kind = "warn", "{message}");
    eprintln!("{} {message}", "[WARN]".yellow().bold());
}

pub fn error(message: impl AsRef<str>) {
    let message = message.as_ref();
    debug!(target: "loadrun::console", kind = "error", "{message}");
    eprintln!("{} {message}", "[ERROR]".red().bold());
}
