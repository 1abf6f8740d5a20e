//! Study-round profiling.
//!
//! Built with the `profiling` feature, round selection, card assessments and
//! handler entry points are appended as JSON lines to a per-run file in the
//! data directory. Without the feature the macros below expand to nothing
//! and `init`/`shutdown` are empty.

#[cfg(feature = "profiling")]
mod event;
#[cfg(feature = "profiling")]
mod logger;

#[cfg(feature = "profiling")]
pub use event::*;
#[cfg(feature = "profiling")]
pub use logger::*;

#[cfg(not(feature = "profiling"))]
mod noop;
#[cfg(not(feature = "profiling"))]
pub use noop::*;

/// Record a round event, optionally with a JSON metadata value.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_log {
    ($event:expr) => {
        $crate::profiling::log_event($event)
    };
    ($event:expr, $meta:expr) => {
        $crate::profiling::log_event_with_meta($event, $meta)
    };
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_log {
    ($($ignored:tt)*) => {};
}

/// Evaluate `$body` and record how long it took under `$name`.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {{
        let started = std::time::Instant::now();
        let value = $body;
        $crate::profiling::log_timed($name, started.elapsed());
        value
    }};
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {
        $body
    };
}
