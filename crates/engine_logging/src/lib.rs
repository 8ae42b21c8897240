#![deny(missing_docs)]
//! Shared logging utilities for the fabric workspace.
//!
//! This crate provides the `engine_*` logging macros used across the codebase,
//! explicit elapsed-time wrappers, and a minimal test initializer for the
//! global logger.

use std::future::Future;
use std::time::{Duration, Instant};

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Runs `f`, logging how long it took under `label`.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let started = Instant::now();
    let value = f();
    log_elapsed(label, started.elapsed());
    value
}

/// Awaits `future`, logging how long it took under `label`.
///
/// The clock starts when this wrapper is first polled, not when the future
/// was created.
pub async fn timed_async<F>(label: &str, future: F) -> F::Output
where
    F: Future,
{
    let started = Instant::now();
    let value = future.await;
    log_elapsed(label, started.elapsed());
    value
}

fn log_elapsed(label: &str, elapsed: Duration) {
    log::debug!("{} took {} ms", label, elapsed.as_millis());
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
