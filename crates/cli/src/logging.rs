//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the configured filter.
pub const LOG_ENV: &str = "PLUGBAY_LOG";

const VERBOSE_FILTER: &str =
    "warn,plugbay=debug,plugbay_core=debug,plugbay_engine=debug,plugbay_github=debug";

/// Installs a stderr subscriber so command output on stdout stays clean.
///
/// `PLUGBAY_LOG` wins over `--verbose`, which wins over the config filter.
pub fn init(config_filter: &str, verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(VERBOSE_FILTER)
        } else {
            EnvFilter::try_new(config_filter).unwrap_or_else(|_| EnvFilter::new("warn"))
        }
    });

    // A subscriber may already be installed when running under a test harness.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
