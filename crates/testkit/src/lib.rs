#![warn(missing_docs)]
//! Test support: temporary asset libraries and JSON golden files.

mod fixture;
mod snapshot;

pub use fixture::*;
pub use snapshot::*;

use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness. Safe to call repeatedly.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
