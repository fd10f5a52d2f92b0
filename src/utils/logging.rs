//! Logging macros gated by a module-level `ENABLE_LOGS` const.
//!
//! The monitor loop logs on every tick, which gets noisy at short tick
//! periods. Modules that opt in declare the flag and import the macros:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("Reminder ({}): {}", language, message);
//! ```

/// `log::info!` when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` when the calling module's `ENABLE_LOGS` is true.
/// Alerts and inactivity notices go through here.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Failures are never silenced: `ENABLE_LOGS` only downgrades them
/// from `error` to `debug`.
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

#[cfg(test)]
mod tests {
    #[test]
    fn macros_expand_with_flag_in_scope() {
        const ENABLE_LOGS: bool = false;
        let tick = 3;
        crate::log_info!("tick {tick}");
        crate::log_warn!("tick {}", tick);
        crate::log_error!("tick {tick} failed");
    }
}
