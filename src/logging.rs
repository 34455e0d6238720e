//! Logging and tracing setup.
//!
//! All logs are written to **stderr** so that stdout carries nothing but
//! generated configuration and can be redirected straight into a file.
//!
//! # Environment Variables
//!
//! - `HEMMER_SCAFFOLD_LOG`: log filter for this tool (e.g. `debug`,
//!   `hemmer_scaffold::render=trace`)
//! - `RUST_LOG`: consulted when `HEMMER_SCAFFOLD_LOG` is not set
//!
//! # Examples
//!
//! ```bash
//! # Show why a provider or schema was chosen
//! HEMMER_SCAFFOLD_LOG=debug hemmer-scaffold aws_instance.web
//!
//! # Trace every inclusion decision the renderer makes
//! HEMMER_SCAFFOLD_LOG=hemmer_scaffold::render=trace hemmer-scaffold aws_instance.web
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding this tool's log filter.
pub const LOG_ENV: &str = "HEMMER_SCAFFOLD_LOG";

/// Initialize logging, defaulting to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level, used when neither
/// `HEMMER_SCAFFOLD_LOG` nor `RUST_LOG` is set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
///
/// # Example
///
/// ```ignore
/// use hemmer_scaffold::init_logging_with_default;
///
/// init_logging_with_default("warn");
/// ```
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Unlike [`init_logging`], this does not panic when a subscriber has
/// already been set, which makes it safe to call from tests.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

/// Build the filter from `HEMMER_SCAFFOLD_LOG`, then `RUST_LOG`, then
/// `default_level`. Unparseable directives fall through to the next source.
fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}
