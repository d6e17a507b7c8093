//! Logging and tracing setup for the provider.
//!
//! All logs are written to **stderr** so they never interfere with the
//! handshake line on stdout.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: full `EnvFilter` directives (e.g. `sweet_provider=debug,reqwest=info`)
//! - `TF_LOG_PROVIDER`, then `TF_LOG`: a host log level (`TRACE`, `DEBUG`,
//!   `INFO`, `WARN`, `ERROR`) applied to this crate when `RUST_LOG` is unset
//!
//! # Examples
//!
//! ```bash
//! # Debug logs from the provider only
//! TF_LOG_PROVIDER=DEBUG terraform apply
//!
//! # Debug logs from everything, including the HTTP stack
//! RUST_LOG=debug terraform apply
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CRATE_TARGET: &str = "sweet_provider";
const HOST_LOG_VARS: [&str; 2] = ["TF_LOG_PROVIDER", "TF_LOG"];

/// Build the filter directives from the environment.
///
/// `RUST_LOG` is returned untouched. Otherwise the first recognised host log
/// level is scoped to this crate, and `default_level` applies when neither is set.
fn filter_directives(
    rust_log: Option<&str>,
    host_levels: &[Option<&str>],
    default_level: &str,
) -> String {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        return directives.to_string();
    }

    host_levels
        .iter()
        .flatten()
        .find_map(|level| host_level(level))
        .map(|level| format!("{}={}", CRATE_TARGET, level))
        .unwrap_or_else(|| default_level.to_string())
}

fn host_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let host: Vec<Option<String>> = HOST_LOG_VARS
        .iter()
        .map(|name| std::env::var(name).ok())
        .collect();
    let host: Vec<Option<&str>> = host.iter().map(Option::as_deref).collect();

    let directives = filter_directives(rust_log.as_deref(), &host, default_level);
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn try_init_with(default_level: &str) -> bool {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
        .is_ok()
}

/// Initialize the default logging subscriber at `info` level.
///
/// A subscriber installed earlier is left in place.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level, used when neither
/// `RUST_LOG` nor a host log level is set.
pub fn init_logging_with_default(default_level: &str) {
    if !try_init_with(default_level) {
        tracing::debug!("Logging already initialized");
    }
}

/// Try to initialize logging, returning false if already initialized.
pub fn try_init_logging() -> bool {
    try_init_with("info")
}
