//! Log setup shared by the monitor and the operator commands.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Crates whose events pass the configured level.
const LOG_TARGETS: &[&str] = &["alertbridge", "alertbridge_core", "alertbridge_daemon"];

/// Filter directive applying `level` to every alertbridge crate,
/// e.g. `"alertbridge=debug,alertbridge_core=debug,alertbridge_daemon=debug"`.
pub fn default_directives(level: &str) -> String {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber at `level`, unless `RUST_LOG` is set.
///
/// Events go to stderr so command output on stdout stays parseable.
pub fn init_tracing(level: &str, log_json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
