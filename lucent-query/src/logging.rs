//! Logging setup for Lucent.
//!
//! The library itself only emits `tracing` events. This module offers an
//! opt-in subscriber controlled by environment variables.
//!
//! # Environment Variables
//!
//! - `LUCENT_DEBUG=true|1|yes` - Enable debug logging
//! - `LUCENT_LOG_LEVEL=trace|debug|info|warn|error` - Set the log level
//! - `LUCENT_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! ```rust,no_run
//! use lucent_query::logging;
//!
//! // Once, at startup
//! logging::init();
//! ```
//!
//! Events emitted by Lucent:
//!
//! - `info`: registry builds, suggestion cache creation
//! - `debug`: lookup resolution, predicate construction, cache hits and misses
//! - `warn`: unresolved aliases, lenient-mode fallbacks, failed value fetches

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if `LUCENT_DEBUG` is set to "true", "1" or "yes" (case-insensitive).
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("LUCENT_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// The log level from `LUCENT_LOG_LEVEL`.
///
/// Defaults to "debug" when `LUCENT_DEBUG` is on, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    match env::var("LUCENT_LOG_LEVEL") {
        Ok(level) => match level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "info" => "info",
            "warn" => "warn",
            "error" => "error",
            _ => fallback,
        },
        Err(_) => fallback,
    }
}

/// The log format from `LUCENT_LOG_FORMAT`, defaulting to "json".
pub fn get_log_format() -> &'static str {
    env::var("LUCENT_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize the Lucent subscriber. Subsequent calls are no-ops.
///
/// Does nothing unless `LUCENT_DEBUG` or `LUCENT_LOG_LEVEL` is set, or
/// when built without the `tracing-subscriber` feature.
pub fn init() {
    INIT.call_once(|| {
        if !is_debug_enabled() && env::var("LUCENT_LOG_LEVEL").is_err() {
            return;
        }

        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let level = get_log_level();
            let filter = EnvFilter::try_new(format!(
                "lucent={level},lucent_query={level},lucent_parser={level},lucent_sql={level},lucent_mongodb={level}"
            ))
            .unwrap_or_else(|_| EnvFilter::new("warn"));

            let registry = tracing_subscriber::registry().with(filter);
            let installed = match get_log_format() {
                "json" => registry.with(fmt::layer().json()).try_init(),
                "compact" => registry.with(fmt::layer().compact()).try_init(),
                _ => registry.with(fmt::layer().pretty()).try_init(),
            };

            if installed.is_ok() {
                tracing::info!(
                    level = level,
                    format = get_log_format(),
                    "Lucent logging initialized"
                );
            }
        }
    });
}

/// Initialize logging at a specific level.
///
/// # Safety
///
/// Sets `LUCENT_LOG_LEVEL`. Call before spawning threads.
pub fn init_with_level(level: &str) {
    // SAFETY: documented as startup-only
    unsafe {
        env::set_var("LUCENT_LOG_LEVEL", level);
    }
    init();
}

/// Initialize debug logging. Equivalent to `LUCENT_DEBUG=true` plus [`init`].
///
/// # Safety
///
/// Sets `LUCENT_DEBUG`. Call before spawning threads.
pub fn init_debug() {
    // SAFETY: documented as startup-only
    unsafe {
        env::set_var("LUCENT_DEBUG", "true");
    }
    init();
}

/// Debug-level event emitted only when `LUCENT_DEBUG` is on.
#[macro_export]
macro_rules! lucent_debug {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            $crate::tracing::debug!($($arg)*);
        }
    };
}

/// Trace-level event emitted only when `LUCENT_DEBUG` is on.
#[macro_export]
macro_rules! lucent_trace {
    ($($arg:tt)*) => {
        if $crate::logging::is_debug_enabled() {
            $crate::tracing::trace!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_disabled_by_default() {
        // SAFETY: no other test touches this variable
        unsafe {
            env::remove_var("LUCENT_DEBUG");
        }
        assert!(!is_debug_enabled());
    }

    #[test]
    fn test_log_format_default() {
        // SAFETY: no other test touches this variable
        unsafe {
            env::remove_var("LUCENT_LOG_FORMAT");
        }
        assert_eq!(get_log_format(), "json");
    }
}
