//! Severity for the plugin's own debug messages.
//!
//! `debug_log_level` in the config does not filter anything. It picks the
//! level `ptz_debug!` messages are emitted at, so raising it to "info" makes
//! them visible under a host logger that hides debug output.

use std::sync::atomic::{AtomicUsize, Ordering};

static PTZ_DEBUG_LEVEL: AtomicUsize = AtomicUsize::new(log::Level::Info as usize);

pub fn set_debug_level(level: log::Level) {
    PTZ_DEBUG_LEVEL.store(level as usize, Ordering::Relaxed);
}

pub fn debug_level() -> log::Level {
    match PTZ_DEBUG_LEVEL.load(Ordering::Relaxed) {
        1 => log::Level::Error,
        2 => log::Level::Warn,
        3 => log::Level::Info,
        4 => log::Level::Debug,
        _ => log::Level::Trace,
    }
}

/// Log at the configured plugin debug level.
#[macro_export]
macro_rules! ptz_debug {
    ($($arg:tt)+) => {
        log::log!($crate::logging::debug_level(), $($arg)+)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn level_discriminants_match_decoding() {
        assert_eq!(log::Level::Error as usize, 1);
        assert_eq!(log::Level::Warn as usize, 2);
        assert_eq!(log::Level::Info as usize, 3);
        assert_eq!(log::Level::Debug as usize, 4);
        assert_eq!(log::Level::Trace as usize, 5);
    }
}
