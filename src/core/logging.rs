//! Logging abstraction
//!
//! Provides unified logging macros that work across different targets:
//! - Embedded (`embedded` feature): Uses defmt
//! - Host tests: Uses println!
//! - Host non-test: No-op (arguments are still type-checked)
//!
//! Arguments must be `defmt::Format` as well as `Display` so the same call
//! site builds for both targets. Stick to integers, floats and `&str`.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        println!("[INFO] {}", format!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        println!("[WARN] {}", format!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "embedded")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "embedded"), test))]
        println!("[DEBUG] {}", format!($($arg)*));

        #[cfg(all(not(feature = "embedded"), not(test)))]
        let _ = format_args!($($arg)*);
    }};
}
