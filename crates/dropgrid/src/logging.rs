//! Tracing setup for binaries.
//!
//! Libraries in this workspace only emit events; installing a subscriber
//! is left to whoever owns `main`.

use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `RUST_LOG`, defaulting to
/// `info`. Does nothing if a subscriber is already installed.
pub fn init() {
    init_with_default("info");
}

/// Like [`init`], with `directives` used when `RUST_LOG` is unset or
/// invalid (e.g. `"dropgrid=debug,info"`).
pub fn init_with_default(directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
