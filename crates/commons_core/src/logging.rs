//! Logging utilities.
//!
//! Every crate in the workspace logs through `tracing`. A service calls [`init`] once
//! at startup to install the process-wide subscriber; the toolkit itself never
//! installs one.

use std::fmt::Display;
use tracing::{error, info, Level};
use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at `INFO`.
///
/// ```
/// use commons_core::logging;
///
/// logging::init();
/// // later calls are no-ops
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber for `commons*` targets at `level`.
///
/// `RUST_LOG` directives are honoured for everything else. If a global subscriber is
/// already installed the call does nothing.
pub fn init_with_level(level: Level) {
    let mut filter = EnvFilter::from_default_env();
    match format!("commons={level}").parse::<Directive>() {
        Ok(directive) => filter = filter.add_directive(directive),
        Err(err) => eprintln!("invalid log directive for level {level}: {err}"),
    }

    let result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .with(filter)
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log an error with context at the ERROR level.
pub fn log_error<E: Display>(error: E, context: &str) {
    error!(error = %error, "{}", context);
}

/// Log a result: `success_message` at INFO on `Ok`, the error with `error_context` at
/// ERROR on `Err`. The result is handed back unchanged.
pub fn log_result<T, E: Display>(
    result: Result<T, E>,
    success_message: &str,
    error_context: &str,
) -> Result<T, E> {
    match &result {
        Ok(_) => info!("{}", success_message),
        Err(e) => log_error(e, error_context),
    }
    result
}
