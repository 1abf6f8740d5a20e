//! Stand-ins used when the `profiling` feature is off.
//!
//! The macros expand to nothing in this configuration, so only the session
//! lifecycle calls made from main() need a body.

/// Does nothing without the `profiling` feature.
#[inline(always)]
pub fn init() {}

/// Does nothing without the `profiling` feature.
#[inline(always)]
pub fn shutdown() {}
