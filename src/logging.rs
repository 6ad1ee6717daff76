//! Tracing subscriber setup for the relay binary.

use std::env;

use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` selects the filter (default `info`); `LOG_FORMAT=json` switches
/// to JSON lines. Calling this twice is not an error.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` is not a valid filter directive.
pub fn configure_logging() -> Result<(), tracing_subscriber::filter::ParseError> {
    let filter = EnvFilter::try_new(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stdout);

    let installed = if env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    if let Err(err) = installed {
        warn!("logging already initialized: {err}");
    }

    Ok(())
}
