//! Tracing bootstrap for the command line.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

const CONSOLE_FILTER: &str = "warn";

/// Install the global subscriber.
///
/// Warnings and errors always go to stderr. When `log_file` is given, records
/// at `level` and above are appended to it as well. `RUST_LOG` overrides
/// both filters.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<()> {
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(filter_or(CONSOLE_FILTER));

    let file = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let handle = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(handle))
                    .with_ansi(false)
                    .with_target(true)
                    .with_filter(filter_or(&normalize_level(level))),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install the tracing subscriber")
}

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Map configured level names onto tracing levels.
fn normalize_level(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "critical" | "error" => "error".to_string(),
        "warning" | "warn" => "warn".to_string(),
        "notset" | "trace" => "trace".to_string(),
        "debug" => "debug".to_string(),
        _ => "info".to_string(),
    }
}
