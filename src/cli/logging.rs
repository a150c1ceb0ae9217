//! Diagnostic logging setup

use std::io;

use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directive for the given verbosity
pub fn default_directive(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "warn" };
    format!("task_graph={level}")
}

/// Installs a stderr subscriber. `RUST_LOG` takes precedence over the
/// verbosity flag. Calling this more than once keeps the first subscriber.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = fmt::layer()
        .compact()
        .with_writer(io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
