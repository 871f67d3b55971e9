#![deny(missing_docs)]
//! Shared logging utilities for the launcher workspace.
//!
//! This crate provides the `launcher_*` logging macros used across the
//! codebase, a per-thread job tag that prefixes records emitted by a worker,
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

#[doc(hidden)]
pub use log;

thread_local! {
    /// Job id tagged onto the current thread, if it is running a job.
    static CURRENT_JOB: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Tags the current thread with the job it is executing.
///
/// Worker threads call this once on entry; `None` clears the tag.
pub fn set_current_job(job_id: Option<u64>) {
    CURRENT_JOB.with(|v| v.set(job_id));
}

/// Returns the job tagged onto the current thread, if any.
pub fn current_job() -> Option<u64> {
    CURRENT_JOB.with(|v| v.get())
}

/// Prefix prepended to every record by the `launcher_*` macros.
#[doc(hidden)]
pub fn job_prefix() -> String {
    match current_job() {
        Some(job_id) => format!("[job {job_id}] "),
        None => String::new(),
    }
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! launcher_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! launcher_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! launcher_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! launcher_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! launcher_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("{}{}", $crate::job_prefix(), format_args!($($arg)*));
    }};
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
