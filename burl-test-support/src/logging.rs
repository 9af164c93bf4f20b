//! Test logging bootstrap.
//!
//! Installs a compact `tracing` subscriber writing through the test
//! harness's capture so `RUST_LOG`-filtered diagnostics show up on
//! failures. Safe to call from every test; only the first call installs.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Installs the test subscriber once per process.
pub fn init_test_logging() {
    INITIALISED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
