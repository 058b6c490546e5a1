//! Logging setup for Kyodo binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events are shown at the default level.
const LOGGED_CRATES: [&str; 3] = ["kyodo_server", "kyodo_shared", "tower_http"];

/// Build the default filter directive, e.g.
/// `kyodo_server=debug,kyodo_shared=debug,tower_http=debug`.
fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut targets: Vec<String> = LOGGED_CRATES.iter().map(|t| t.to_string()).collect();
    if !targets.contains(&binary_target) {
        targets.push(binary_target);
    }

    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "kyodo-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use kyodo_shared::logger::setup_logger;
///
/// setup_logger("kyodo-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::debug!("Logger initialized for {}", binary_name);
}
