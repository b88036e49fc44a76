//! Logging setup for the `import-graph` binary.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for command
//! output so JSON can be piped.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialise the global subscriber. Call once, before anything logs.
///
/// Level, in order of precedence:
/// 1. `--verbose`: debug for this crate
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`, if set
/// 4. info for this crate
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("import_graph=debug")
    } else if quiet {
        EnvFilter::new("import_graph=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("import_graph=info"))
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
