//! Logging macros gated by a per-module `ENABLE_LOGS` flag.
//!
//! The workflow controller and the simulated diagnoser log on every capture
//! and completion, which gets noisy in tests and in the interactive driver.
//! Each of those modules declares its own switch:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info};
//!
//! log_info!("capture {} started", generation);
//! ```
//!
//! Modules that always log call the `log` facade directly.

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Errors are worth keeping even with a module's logs switched off, so this
/// one only downgrades to `debug` when the flag is false.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        } else {
            log::debug!($($arg)*);
        }
    };
}
