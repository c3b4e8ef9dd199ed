//! Shared setup for integration tests.
//!
//! `RUST_LOG` filters the output, e.g. `RUST_LOG=cmpset=trace`. Engine events are only emitted
//! when the crate is built with the `tracing` feature.

#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Installs a test-writer `fmt` subscriber. Safe to call from every test.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
