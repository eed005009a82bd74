//! Diagnostic logging setup.
//!
//! The library only emits `tracing` events; the binary installs a subscriber
//! that writes them to stderr so they never mix with command output.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset, by `-v` count
#[must_use]
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "treescout=warn",
        1 => "treescout=debug",
        _ => "treescout=trace",
    }
}

/// Installs the global subscriber. `RUST_LOG` takes precedence over
/// `verbosity`.
pub fn init_tracing(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    // A subscriber may already be installed, e.g. by an embedding program
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
