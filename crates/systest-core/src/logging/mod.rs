//! Logging setup
//!
//! The library emits `tracing` events and never installs a subscriber on
//! its own. Test suites that want to see them call [`init`] (or
//! [`init_for_tests`], which routes output through the test harness
//! capture) once, typically from their fixture setup.
//!
//! The filter is read from `SYSTEST_LOG` using `EnvFilter` syntax, e.g.
//! `SYSTEST_LOG=systest_core=debug`. The default is `info`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive
pub const LOG_ENV: &str = "SYSTEST_LOG";

const DEFAULT_FILTER: &str = "info";

/// Build the filter from `SYSTEST_LOG`, falling back to `info`
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a global fmt subscriber writing to stderr
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// Install a global fmt subscriber whose output is captured per test
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_for_tests() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_init_is_idempotent() {
        // Whichever call wins, the second one must not panic
        let first = init_for_tests();
        let second = init_for_tests();
        assert!(!second || !first);
        tracing::info!("logging initialised");
    }
}
