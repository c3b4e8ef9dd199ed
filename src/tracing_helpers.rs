//! Zero-cost logging helpers.
//!
//! With the `tracing` feature enabled these macros forward to the `tracing` crate; without it
//! they expand to nothing.
//!
//! ```bash
//! cargo test --features tracing
//! RUST_LOG=cmpset=trace cargo test --features tracing merge
//! ```
//!
//! Events carry arena handles and counts only. Elements are opaque to the set and are never
//! formatted.

#![allow(unused_macros)]

/// Trace-level event: splits, rotations, merges.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level event: the tree grew or shrank by a level.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
