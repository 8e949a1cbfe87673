#![deny(missing_docs)]
//! Shared logging utilities for the podgrab workspace.
//!
//! This crate provides the `podgrab_*` logging macros used across the codebase
//! and a minimal test initializer for the global logger. Every line is tagged
//! with the page view it belongs to, so interleaved output from a superseded
//! view can be told apart after a client-side navigation.

use std::sync::atomic::{AtomicU64, Ordering};

#[doc(hidden)]
pub use log;

/// Page view currently armed by the content script. 0 means "not armed yet".
static PAGE_VIEW: AtomicU64 = AtomicU64::new(0);

/// Records the page view (arm id) that subsequent log lines belong to.
/// The content script calls this once per arm.
pub fn set_page_view(view: u64) {
    PAGE_VIEW.store(view, Ordering::Relaxed);
}

/// Returns the page view recorded by [`set_page_view`], or 0 if none was set.
pub fn current_page_view() -> u64 {
    PAGE_VIEW.load(Ordering::Relaxed)
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! podgrab_trace {
    ($($arg:tt)*) => {{
        $crate::log::trace!("[view {}] {}", $crate::current_page_view(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! podgrab_info {
    ($($arg:tt)*) => {{
        $crate::log::info!("[view {}] {}", $crate::current_page_view(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! podgrab_debug {
    ($($arg:tt)*) => {{
        $crate::log::debug!("[view {}] {}", $crate::current_page_view(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! podgrab_warn {
    ($($arg:tt)*) => {{
        $crate::log::warn!("[view {}] {}", $crate::current_page_view(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! podgrab_error {
    ($($arg:tt)*) => {{
        $crate::log::error!("[view {}] {}", $crate::current_page_view(), format_args!($($arg)*));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_view_round_trips() {
        set_page_view(7);
        assert_eq!(current_page_view(), 7);
        podgrab_info!("armed with {} attempts", 10);
        set_page_view(0);
    }
}
