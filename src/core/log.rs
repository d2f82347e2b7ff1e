use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber. Progress of a run is logged at INFO, so a
/// scheduled invocation leaves a trail even without `--verbose`.
pub fn init_logging(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(log_filter(verbose, rust_log.as_deref()))
        .init();
}

/// A non-empty, valid `RUST_LOG` replaces the default filter entirely.
/// Otherwise the crate logs at INFO (DEBUG when verbose) and dependencies at
/// WARN.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    if let Some(filter) = rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
    {
        return filter;
    }

    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(format!("warn,premtrack={level}"))
}
