//! Tracing subscriber setup

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "riff=info";

/// Install the global subscriber with [`DEFAULT_FILTER`].
///
/// Returns `false` if a subscriber was already installed.
pub fn init() -> bool {
    init_with(DEFAULT_FILTER)
}

/// Install the global subscriber, falling back to `default_filter` when
/// `RUST_LOG` is unset or invalid.
pub fn init_with(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}
