#![deny(missing_docs)]
//! Shared logging utilities for the braintrace workspace.
//!
//! This crate provides the `bt_*` logging macros used across the codebase,
//! a thread-local conversation scope that prefixes every line, and a minimal
//! test initializer for the global logger.

use std::cell::RefCell;

thread_local! {
    /// Conversation the current thread is working on, if any.
    static SCOPE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Tags log lines emitted on this thread with `conversation`.
///
/// The app calls this whenever the active conversation changes.
pub fn set_scope(conversation: impl Into<String>) {
    let conversation = conversation.into();
    SCOPE.with(|scope| *scope.borrow_mut() = Some(conversation));
}

/// Removes the conversation tag for this thread.
pub fn clear_scope() {
    SCOPE.with(|scope| *scope.borrow_mut() = None);
}

/// Returns the prefix used by the `bt_*` macros, e.g. `"[conv 42] "`.
/// Empty when no scope is set.
pub fn scope_prefix() -> String {
    SCOPE.with(|scope| match scope.borrow().as_deref() {
        Some(conversation) => format!("[conv {conversation}] "),
        None => String::new(),
    })
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! bt_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! bt_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! bt_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! bt_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! bt_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::scope_prefix(), format_args!($($arg)*));
    }};
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
